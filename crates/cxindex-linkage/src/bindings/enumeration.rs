use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError};
use cxindex_storage::WriteSection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct EnumerationPayload {}

/// Create an enumeration. Its enumerators are appended to its child list as
/// they are added.
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
        BindingKind::Enumeration,
        BindingFlags::EMPTY,
        &EnumerationPayload::default(),
    )
}
