//! The linkage abstraction shared by every language dialect.
//!
//! A linkage owns one linkage record, one name-index root, and a block of
//! node-type tags. Dialects implement the kind dispatch; the scope resolution
//! and registration helpers here are common to all of them.

use crate::find;
use crate::{Binding, Node};
use cxindex_core::{
    AstName, BindingKind, CxindexError, IndexComparator, LiveType, NodeType, NodeTypeBlock,
    RecordId, Resolution, Scope, SemanticBinding,
};
use cxindex_storage::{RecordHeader, RecordReader, WriteSection};

/// Owning scope of a binding.
#[derive(Debug, Clone)]
pub enum Parent {
    /// File scope: registered in the linkage's name index.
    Linkage,
    /// Member scope: registered in the owner's ordered child list.
    Owner(Binding),
}

impl Parent {
    pub fn record<L: Linkage + ?Sized>(&self, linkage: &L) -> RecordId {
        match self {
            Self::Linkage => linkage.record(),
            Self::Owner(owner) => owner.record(),
        }
    }

    pub fn owner(&self) -> Option<&Binding> {
        match self {
            Self::Linkage => None,
            Self::Owner(owner) => Some(owner),
        }
    }
}

/// One language dialect's view of the symbol database.
///
/// Every operation takes the store handle explicitly: lookups a
/// [`RecordReader`], mutations the [`WriteSection`] they belong to. Misses are
/// `Ok(None)` or empty; only storage faults are errors.
pub trait Linkage: Send + Sync {
    /// Stable linkage id, e.g. `"C"`.
    fn id(&self) -> &str;

    /// The linkage record.
    fn record(&self) -> RecordId;

    /// Root record of the linkage's name index.
    fn index_root(&self) -> RecordId;

    fn node_types(&self) -> NodeTypeBlock;

    /// Tag this linkage stores `kind` under.
    fn node_type_of(&self, kind: BindingKind) -> NodeType;

    /// Kind stored under `node_type`, if the tag belongs to this linkage.
    fn kind_of(&self, node_type: NodeType) -> Option<BindingKind>;

    fn index_comparator(&self) -> &dyn IndexComparator;

    /// Find or create the persisted counterpart of `binding`.
    fn add_binding(
        &self,
        section: &WriteSection<'_>,
        binding: &dyn SemanticBinding,
    ) -> Result<Option<Binding>, CxindexError>;

    /// Find the persisted counterpart of `binding` without creating anything.
    fn adapt_binding(
        &self,
        reader: &RecordReader<'_>,
        binding: &dyn SemanticBinding,
    ) -> Result<Option<Binding>, CxindexError>;

    /// Candidate bindings for a name reference, in comparator order.
    fn resolve_binding(
        &self,
        reader: &RecordReader<'_>,
        name: &dyn AstName,
    ) -> Result<Vec<Binding>, CxindexError>;

    fn get_node(
        &self,
        reader: &RecordReader<'_>,
        record: RecordId,
    ) -> Result<Option<Node>, CxindexError>;

    /// Persist a type reference held by `parent`. Returns the type's record.
    fn add_type(
        &self,
        section: &WriteSection<'_>,
        parent: RecordId,
        ty: LiveType<'_>,
    ) -> Result<Option<RecordId>, CxindexError>;

    /// Whether `binding` is visible only inside its translation unit.
    fn is_file_local_binding(&self, binding: &dyn SemanticBinding) -> bool;

    /// Rewrite the non-key attributes of `binding` from `live`.
    fn refresh_binding(
        &self,
        section: &WriteSection<'_>,
        binding: &Binding,
        live: &dyn SemanticBinding,
    ) -> Result<(), CxindexError>;

    /// Searchable tag of a live binding, or [`NodeType::NONE`].
    fn get_binding_type(&self, binding: &dyn SemanticBinding) -> NodeType {
        match BindingKind::classify(binding) {
            BindingKind::Parameter | BindingKind::BasicType | BindingKind::Unknown => {
                NodeType::NONE
            }
            kind => self.node_type_of(kind),
        }
    }

    /// Add the binding an AST name resolves to.
    fn add_binding_for_name(
        &self,
        section: &WriteSection<'_>,
        name: &dyn AstName,
    ) -> Result<Option<Binding>, CxindexError> {
        if name.name().is_empty() {
            return Ok(None);
        }
        match name.resolve() {
            Resolution::Binding(binding)
                if BindingKind::classify(binding) != BindingKind::Parameter =>
            {
                self.add_binding(section, binding)
            }
            _ => Ok(None),
        }
    }

    /// File-scope bindings of the given kinds whose name starts with `prefix`.
    fn find_bindings_with_prefix(
        &self,
        reader: &RecordReader<'_>,
        prefix: &[u8],
        kinds: &[BindingKind],
    ) -> Result<Vec<Binding>, CxindexError> {
        let node_types: Vec<NodeType> = kinds
            .iter()
            .map(|kind| self.node_type_of(*kind))
            .filter(|tag| *tag != NodeType::NONE)
            .collect();
        find::find_with_prefix(reader, self, prefix, &node_types)
    }
}

/// Scope `binding` is registered under.
///
/// Enumerators share the scope of their enumeration; a parser reporting the
/// enumeration itself as the scope does not move them out of the name index.
fn declared_scope(binding: &dyn SemanticBinding) -> Scope<'_> {
    match binding.scope() {
        Scope::Owner(owner) if binding.is_enumerator() && owner.is_enumeration() => {
            owner.scope()
        }
        scope => scope,
    }
}

/// Resolve the owning scope of `binding` without creating anything.
pub(crate) fn adapted_parent<L: Linkage + ?Sized>(
    linkage: &L,
    reader: &RecordReader<'_>,
    binding: &dyn SemanticBinding,
) -> Result<Option<Parent>, CxindexError> {
    match declared_scope(binding) {
        Scope::TranslationUnit => Ok(Some(Parent::Linkage)),
        Scope::Local => Ok(None),
        Scope::Owner(owner) => Ok(linkage
            .adapt_binding(reader, owner)?
            .filter(|owner| owner.kind().is_member_owner())
            .map(Parent::Owner)),
    }
}

/// Resolve the owning scope of `binding`, persisting an owner that is not yet
/// in the store.
pub(crate) fn added_parent<L: Linkage + ?Sized>(
    linkage: &L,
    section: &WriteSection<'_>,
    binding: &dyn SemanticBinding,
) -> Result<Option<Parent>, CxindexError> {
    match declared_scope(binding) {
        Scope::TranslationUnit => Ok(Some(Parent::Linkage)),
        Scope::Local => Ok(None),
        Scope::Owner(owner) => Ok(linkage
            .add_binding(section, owner)?
            .filter(|owner| owner.kind().is_member_owner())
            .map(Parent::Owner)),
    }
}

/// Link a freshly created binding into its parent.
pub(crate) fn register_child<L: Linkage + ?Sized>(
    linkage: &L,
    section: &WriteSection<'_>,
    parent: &Parent,
    binding: &Binding,
) -> Result<(), CxindexError> {
    match parent {
        Parent::Linkage => section.index_insert(
            linkage.index_root(),
            binding.name(),
            binding.node_type(),
            binding.record(),
        ),
        Parent::Owner(owner) => section.add_child(owner.record(), binding.record()),
    }
}

/// Nodes every store understands regardless of linkage.
pub(crate) fn base_node(header: &RecordHeader) -> Result<Option<Node>, CxindexError> {
    match header.node_type {
        NodeType::LINKAGE => Ok(Some(Node::Linkage(header.id))),
        NodeType::INDEX_ROOT => Ok(Some(Node::IndexRoot(header.id))),
        node_type => Err(CxindexError::CorruptNodeType {
            record: header.id,
            node_type,
        }),
    }
}
