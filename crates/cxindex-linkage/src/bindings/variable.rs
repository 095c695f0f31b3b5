use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError, RecordId, SemanticBinding};
use cxindex_storage::WriteSection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct VariablePayload {
    #[serde(default)]
    pub type_record: RecordId,
}

pub(crate) fn create<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    parent: &Parent,
    name: &[u8],
    live: &dyn SemanticBinding,
) -> Result<Binding, CxindexError> {
    bindings::allocate(
        section,
        linkage,
        parent,
        name,
        BindingKind::Variable,
        BindingFlags::of(live),
        &VariablePayload::default(),
    )
}

pub(crate) fn populate<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    let previous: VariablePayload = section.reader().payload(binding.record())?;
    let type_record = bindings::replace_type(
        section,
        linkage,
        binding.record(),
        previous.type_record,
        live.declared_type(),
    )?;
    section.write_payload(binding.record(), &VariablePayload { type_record })
}
