//! Members of structs and unions.

use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError, RecordId, SemanticBinding};
use cxindex_storage::{RecordReader, WriteSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct FieldPayload {
    #[serde(default)]
    pub type_record: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_width: Option<u32>,
}

/// Create a field. Only a member owner can hold fields; a file-scope parent
/// yields `None`.
pub(crate) fn create<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    parent: &Parent,
    name: &[u8],
) -> Result<Option<Binding>, CxindexError> {
    if !matches!(parent, Parent::Owner(owner) if owner.kind().is_member_owner()) {
        return Ok(None);
    }
    bindings::allocate(
        section,
        linkage,
        parent,
        name,
        BindingKind::Field,
        BindingFlags::EMPTY,
        &FieldPayload::default(),
    )
    .map(Some)
}

pub(crate) fn populate<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    let previous: FieldPayload = section.reader().payload(binding.record())?;
    let type_record = bindings::replace_type(
        section,
        linkage,
        binding.record(),
        previous.type_record,
        live.declared_type(),
    )?;
    section.write_payload(
        binding.record(),
        &FieldPayload {
            type_record,
            bit_width: live.bit_field_width(),
        },
    )
}

impl Binding {
    /// Declared width of a bit-field member.
    pub fn read_bit_width(&self, reader: &RecordReader<'_>) -> Result<Option<u32>, CxindexError> {
        if self.kind != BindingKind::Field {
            return Ok(None);
        }
        Ok(reader.payload::<FieldPayload>(self.record())?.bit_width)
    }
}
