//! Built-in types referenced by declarations.

use crate::bindings::expect_node_type;
use crate::Linkage;
use cxindex_core::{BasicTypeSpec, BindingKind, CxindexError, RecordId};
use cxindex_storage::{NewRecord, RecordHeader, RecordReader, WriteSection};

/// A basic type record, owned by the declaration that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicType {
    record: RecordId,
    parent: RecordId,
    spec: BasicTypeSpec,
}

impl BasicType {
    pub(crate) fn create<L: Linkage + ?Sized>(
        section: &WriteSection<'_>,
        linkage: &L,
        parent: RecordId,
        spec: BasicTypeSpec,
    ) -> Result<Self, CxindexError> {
        let spelling = spec.spelling();
        let record = section.allocate(
            &NewRecord::new(
                linkage.node_type_of(BindingKind::BasicType),
                parent,
                spelling.as_bytes(),
            )
            .with_payload(&spec)?,
        )?;
        Ok(Self {
            record,
            parent,
            spec,
        })
    }

    pub(crate) fn load<L: Linkage + ?Sized>(
        reader: &RecordReader<'_>,
        linkage: &L,
        header: RecordHeader,
    ) -> Result<Self, CxindexError> {
        expect_node_type(
            header.id,
            header.node_type,
            linkage.node_type_of(BindingKind::BasicType),
        )?;
        Ok(Self {
            record: header.id,
            parent: header.parent,
            spec: reader.payload(header.id)?,
        })
    }

    pub fn record(&self) -> RecordId {
        self.record
    }

    /// The declaration holding this type.
    pub fn parent(&self) -> RecordId {
        self.parent
    }

    pub fn spec(&self) -> &BasicTypeSpec {
        &self.spec
    }
}
