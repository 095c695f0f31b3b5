//! Persisted bindings.

use crate::bindings::enumerator::EnumeratorPayload;
use crate::Linkage;
use cxindex_core::{
    BindingFlags, BindingKind, CxindexError, NodeType, PersistedRef, RecordId, Scope,
    SemanticBinding, StoreId,
};
use cxindex_storage::{RecordHeader, RecordReader};

/// A binding that lives in a record store.
///
/// Holds only the record header plus the owner chain needed to re-derive its
/// scope. Kind-specific attributes are read on demand through a
/// [`RecordReader`] (see the `read_*` accessors in [`crate::bindings`]).
#[derive(Debug, Clone)]
pub struct Binding {
    pub(crate) persisted: PersistedRef,
    pub(crate) kind: BindingKind,
    pub(crate) name: Vec<u8>,
    pub(crate) parent: RecordId,
    pub(crate) flags: BindingFlags,
    pub(crate) owner: Option<Box<Binding>>,
    pub(crate) enumeration: Option<Box<Binding>>,
}

impl Binding {
    /// Load the binding stored at `record`.
    pub fn load<L: Linkage + ?Sized>(
        reader: &RecordReader<'_>,
        linkage: &L,
        record: RecordId,
    ) -> Result<Self, CxindexError> {
        let header = reader.require_header(record)?;
        Self::from_header(reader, linkage, header)
    }

    pub(crate) fn from_header<L: Linkage + ?Sized>(
        reader: &RecordReader<'_>,
        linkage: &L,
        header: RecordHeader,
    ) -> Result<Self, CxindexError> {
        let kind = match linkage.kind_of(header.node_type) {
            Some(BindingKind::Parameter | BindingKind::BasicType | BindingKind::Unknown) | None => {
                return Err(CxindexError::CorruptNodeType {
                    record: header.id,
                    node_type: header.node_type,
                })
            }
            Some(kind) => kind,
        };

        let owner = if header.parent.is_none() || header.parent == linkage.record() {
            None
        } else {
            Some(Box::new(Self::load(reader, linkage, header.parent)?))
        };

        let enumeration = if kind == BindingKind::Enumerator {
            let payload: EnumeratorPayload = reader.payload(header.id)?;
            Some(Box::new(Self::load(reader, linkage, payload.enumeration)?))
        } else {
            None
        };

        Ok(Self {
            persisted: PersistedRef {
                store: reader.store_id().clone(),
                record: header.id,
                node_type: header.node_type,
            },
            kind,
            name: header.name,
            parent: header.parent,
            flags: header.flags,
            owner,
            enumeration,
        })
    }

    pub fn record(&self) -> RecordId {
        self.persisted.record
    }

    pub fn node_type(&self) -> NodeType {
        self.persisted.node_type
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Store this binding was read from.
    pub fn store(&self) -> &StoreId {
        &self.persisted.store
    }

    /// Record of the owning scope: the linkage, or a composite/enumeration.
    pub fn parent(&self) -> RecordId {
        self.parent
    }

    /// Flags as of the time this binding was loaded.
    pub fn flags(&self) -> BindingFlags {
        self.flags
    }

    /// Owning composite or enumeration, for members.
    pub fn owner(&self) -> Option<&Binding> {
        self.owner.as_deref()
    }

    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.persisted == other.persisted
    }
}

impl Eq for Binding {}

impl SemanticBinding for Binding {
    fn name(&self) -> &[u8] {
        &self.name
    }

    // A field is structurally a variable too.
    fn is_variable(&self) -> bool {
        matches!(self.kind, BindingKind::Variable | BindingKind::Field)
    }

    fn is_function(&self) -> bool {
        self.kind == BindingKind::Function
    }

    fn is_field(&self) -> bool {
        self.kind == BindingKind::Field
    }

    fn is_composite(&self) -> bool {
        self.kind == BindingKind::Composite
    }

    fn is_enumeration(&self) -> bool {
        self.kind == BindingKind::Enumeration
    }

    fn is_enumerator(&self) -> bool {
        self.kind == BindingKind::Enumerator
    }

    fn is_typedef(&self) -> bool {
        self.kind == BindingKind::Typedef
    }

    fn scope(&self) -> Scope<'_> {
        match &self.owner {
            Some(owner) => Scope::Owner(owner.as_ref()),
            None => Scope::TranslationUnit,
        }
    }

    fn has_internal_linkage(&self) -> bool {
        self.flags.contains(BindingFlags::INTERNAL_LINKAGE)
    }

    fn is_extern(&self) -> bool {
        self.flags.contains(BindingFlags::EXTERN)
    }

    fn is_inline(&self) -> bool {
        self.flags.contains(BindingFlags::INLINE)
    }

    fn takes_varargs(&self) -> bool {
        self.flags.contains(BindingFlags::VARARGS)
    }

    fn enumeration(&self) -> Option<&dyn SemanticBinding> {
        self.enumeration
            .as_deref()
            .map(|e| e as &dyn SemanticBinding)
    }

    fn persisted(&self) -> Option<&PersistedRef> {
        Some(&self.persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(kind: BindingKind, flags: BindingFlags) -> Binding {
        Binding {
            persisted: PersistedRef {
                store: StoreId::generate(),
                record: RecordId(10),
                node_type: NodeType(17),
            },
            kind,
            name: b"x".to_vec(),
            parent: RecordId(1),
            flags,
            owner: None,
            enumeration: None,
        }
    }

    #[test]
    fn persisted_field_classifies_as_field() {
        let field = binding(BindingKind::Field, BindingFlags::EMPTY);
        assert!(field.is_field());
        assert!(field.is_variable());
        assert_eq!(BindingKind::classify(&field), BindingKind::Field);
    }

    #[test]
    fn flags_surface_through_live_view() {
        let var = binding(
            BindingKind::Variable,
            BindingFlags::INTERNAL_LINKAGE.with(BindingFlags::EXTERN, true),
        );
        assert!(var.has_internal_linkage());
        assert!(var.is_extern());
        assert!(!var.is_inline());
        assert!(var.persisted().is_some());
    }

    #[test]
    fn owner_defines_scope() {
        let mut field = binding(BindingKind::Field, BindingFlags::EMPTY);
        assert!(matches!(field.scope(), Scope::TranslationUnit));
        field.owner = Some(Box::new(binding(BindingKind::Composite, BindingFlags::EMPTY)));
        match field.scope() {
            Scope::Owner(owner) => assert!(owner.is_composite()),
            _ => panic!("expected owner scope"),
        }
    }
}
