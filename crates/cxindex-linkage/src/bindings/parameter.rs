//! Function parameters.
//!
//! Parameters are never bindings in their own right: they cannot be added,
//! adapted, or found through the name index. They exist only as records
//! owned by their function, in declaration order.

use crate::bindings::{self, expect_node_type};
use crate::Linkage;
use cxindex_core::{BindingKind, CxindexError, NodeType, RecordId, SemanticBinding};
use cxindex_storage::{NewRecord, RecordHeader, RecordReader, WriteSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct ParameterPayload {
    #[serde(default)]
    pub type_record: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    record: RecordId,
    function: RecordId,
    name: Vec<u8>,
}

impl Parameter {
    /// Append a parameter record to `function`.
    pub(crate) fn create<L: Linkage + ?Sized>(
        section: &WriteSection<'_>,
        linkage: &L,
        function: RecordId,
        live: &dyn SemanticBinding,
    ) -> Result<Self, CxindexError> {
        let record = section.allocate(&NewRecord::new(
            linkage.node_type_of(BindingKind::Parameter),
            function,
            live.name(),
        ))?;
        section.add_child(function, record)?;

        let type_record =
            bindings::replace_type(section, linkage, record, RecordId::NONE, live.declared_type())?;
        section.write_payload(record, &ParameterPayload { type_record })?;

        Ok(Self {
            record,
            function,
            name: live.name().to_vec(),
        })
    }

    pub(crate) fn from_header(
        header: RecordHeader,
        expected: NodeType,
    ) -> Result<Self, CxindexError> {
        expect_node_type(header.id, header.node_type, expected)?;
        Ok(Self {
            record: header.id,
            function: header.parent,
            name: header.name,
        })
    }

    /// Free this parameter and the basic type it owns.
    pub(crate) fn free<L: Linkage + ?Sized>(
        &self,
        section: &WriteSection<'_>,
        linkage: &L,
    ) -> Result<(), CxindexError> {
        let payload: ParameterPayload = section.reader().payload(self.record)?;
        bindings::replace_type(section, linkage, self.record, payload.type_record, None)?;
        section.free(self.record)?;
        Ok(())
    }

    pub fn record(&self) -> RecordId {
        self.record
    }

    /// The owning function's record.
    pub fn function(&self) -> RecordId {
        self.function
    }

    /// Raw name; empty for unnamed parameters.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn read_type(&self, reader: &RecordReader<'_>) -> Result<Option<RecordId>, CxindexError> {
        let payload: ParameterPayload = reader.payload(self.record)?;
        Ok((!payload.type_record.is_none()).then_some(payload.type_record))
    }
}
