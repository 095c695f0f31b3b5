use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError, RecordId, SemanticBinding};
use cxindex_storage::WriteSection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct TypedefPayload {
    #[serde(default)]
    pub target: RecordId,
}

pub(crate) fn create<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    parent: &Parent,
    name: &[u8],
) -> Result<Binding, CxindexError> {
    bindings::allocate(
        section,
        linkage,
        parent,
        name,
        BindingKind::Typedef,
        BindingFlags::EMPTY,
        &TypedefPayload::default(),
    )
}

/// Point the typedef at its current target type.
pub(crate) fn populate<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    let previous: TypedefPayload = section.reader().payload(binding.record())?;
    let target = bindings::replace_type(
        section,
        linkage,
        binding.record(),
        previous.target,
        live.declared_type(),
    )?;
    section.write_payload(binding.record(), &TypedefPayload { target })
}
