use serde::{Deserialize, Serialize};

use crate::SemanticBinding;

// ── Record & Store Identity ─────────────────────────────────────────────────

/// Integer handle of a record in the backing store.
///
/// `RecordId::NONE` (0) is the canonical "no node" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub const NONE: RecordId = RecordId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::NONE
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one store instance. Compared by value, never by address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(uuid::Uuid);

impl StoreId {
    /// Generate a fresh store id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreId {
    type Err = crate::CxindexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| crate::CxindexError::Storage(format!("invalid store id {s}: {e}")))
    }
}

/// Identity carried by a binding that already lives in some store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistedRef {
    pub store: StoreId,
    pub record: RecordId,
    pub node_type: NodeType,
}

// ── Node Types ──────────────────────────────────────────────────────────────

/// Node-type tag stored in every record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeType(pub u16);

impl NodeType {
    /// Not a searchable node type.
    pub const NONE: NodeType = NodeType(0);
    /// A linkage record.
    pub const LINKAGE: NodeType = NodeType(1);
    /// The root record of a linkage's name index.
    pub const INDEX_ROOT: NodeType = NodeType(2);
    /// Last tag of the range reserved for the generic store.
    pub const LAST_GENERIC: u16 = 15;
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contiguous block of node-type tags owned by a single linkage.
///
/// Blocks are laid out back to back above the generic range, so tags of
/// different linkages never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTypeBlock {
    first: u16,
    len: u16,
}

impl NodeTypeBlock {
    pub const SIZE: u16 = 32;

    /// Block for the linkage occupying `slot`.
    pub const fn for_slot(slot: u16) -> Self {
        Self {
            first: NodeType::LAST_GENERIC + 1 + slot * Self::SIZE,
            len: Self::SIZE,
        }
    }

    /// Tag at `offset` within the block. Offset 0 is never handed out so that
    /// the block base stays distinguishable from a real kind.
    pub const fn tag(&self, offset: u16) -> NodeType {
        NodeType(self.first + offset)
    }

    pub const fn contains(&self, node_type: NodeType) -> bool {
        node_type.0 > self.first && node_type.0 < self.first + self.len
    }
}

// ── Binding Kinds ───────────────────────────────────────────────────────────

/// Closed set of binding kinds known to the symbol database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Variable,
    Function,
    Field,
    Composite,
    Enumeration,
    Enumerator,
    Typedef,
    Parameter,
    BasicType,
    Unknown,
}

impl BindingKind {
    /// Classify a live binding.
    ///
    /// This is the only place kind precedence is decided. Parameters and fields
    /// are structurally variables, so both are tested before `Variable`, and
    /// `Field` always wins over `Variable`.
    pub fn classify(binding: &dyn SemanticBinding) -> Self {
        if binding.is_parameter() {
            Self::Parameter
        } else if binding.is_field() {
            Self::Field
        } else if binding.is_variable() {
            Self::Variable
        } else if binding.is_function() {
            Self::Function
        } else if binding.is_composite() {
            Self::Composite
        } else if binding.is_enumeration() {
            Self::Enumeration
        } else if binding.is_enumerator() {
            Self::Enumerator
        } else if binding.is_typedef() {
            Self::Typedef
        } else if binding.is_basic_type() {
            Self::BasicType
        } else {
            Self::Unknown
        }
    }

    /// Kinds that hold an ordered list of member records.
    pub fn is_member_owner(self) -> bool {
        matches!(self, Self::Composite | Self::Enumeration)
    }
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable => write!(f, "variable"),
            Self::Function => write!(f, "function"),
            Self::Field => write!(f, "field"),
            Self::Composite => write!(f, "composite"),
            Self::Enumeration => write!(f, "enumeration"),
            Self::Enumerator => write!(f, "enumerator"),
            Self::Typedef => write!(f, "typedef"),
            Self::Parameter => write!(f, "parameter"),
            Self::BasicType => write!(f, "basic_type"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Storage-class and signature flags kept in a record header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingFlags(pub u32);

impl BindingFlags {
    pub const EMPTY: BindingFlags = BindingFlags(0);
    /// `static` at file scope: visible only inside its translation unit.
    pub const INTERNAL_LINKAGE: BindingFlags = BindingFlags(1);
    pub const EXTERN: BindingFlags = BindingFlags(1 << 1);
    pub const INLINE: BindingFlags = BindingFlags(1 << 2);
    pub const VARARGS: BindingFlags = BindingFlags(1 << 3);

    pub fn contains(self, other: BindingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: BindingFlags, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | other.0)
        } else {
            self
        }
    }

    /// Flags a live binding carries.
    pub fn of(binding: &dyn SemanticBinding) -> Self {
        Self::EMPTY
            .with(Self::INTERNAL_LINKAGE, binding.has_internal_linkage())
            .with(Self::EXTERN, binding.is_extern())
            .with(Self::INLINE, binding.is_inline())
            .with(Self::VARARGS, binding.takes_varargs())
    }
}

// ── Type Descriptions ───────────────────────────────────────────────────────

/// `struct` or `union`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKey {
    #[default]
    Struct,
    Union,
}

/// Built-in C type specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Void,
    Char,
    Int,
    Float,
    Double,
    Bool,
    Unspecified,
}

/// A basic type together with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicTypeSpec {
    pub kind: BasicKind,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub short: bool,
    #[serde(default)]
    pub long: bool,
    #[serde(default)]
    pub long_long: bool,
    #[serde(default)]
    pub complex: bool,
    #[serde(default)]
    pub imaginary: bool,
}

impl BasicTypeSpec {
    pub fn new(kind: BasicKind) -> Self {
        Self {
            kind,
            signed: false,
            unsigned: false,
            short: false,
            long: false,
            long_long: false,
            complex: false,
            imaginary: false,
        }
    }

    /// Source spelling, e.g. `unsigned long int`.
    pub fn spelling(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.signed {
            parts.push("signed");
        }
        if self.unsigned {
            parts.push("unsigned");
        }
        if self.short {
            parts.push("short");
        }
        if self.long_long {
            parts.push("long long");
        } else if self.long {
            parts.push("long");
        }
        if self.complex {
            parts.push("_Complex");
        }
        if self.imaginary {
            parts.push("_Imaginary");
        }
        match self.kind {
            BasicKind::Void => parts.push("void"),
            BasicKind::Char => parts.push("char"),
            BasicKind::Int => parts.push("int"),
            BasicKind::Float => parts.push("float"),
            BasicKind::Double => parts.push("double"),
            BasicKind::Bool => parts.push("_Bool"),
            BasicKind::Unspecified => {
                if parts.is_empty() {
                    parts.push("int");
                }
            }
        }
        parts.join(" ")
    }
}

/// Position of a declaration in its file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub offset: u32,
}

// ── Linkage Ids ─────────────────────────────────────────────────────────────

pub const C_LINKAGE_ID: &str = "C";
pub const CPP_LINKAGE_ID: &str = "C++";
