//! Structs and unions.

use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CompositeKey, CxindexError, SemanticBinding};
use cxindex_storage::{RecordReader, WriteSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct CompositePayload {
    #[serde(default)]
    pub key: CompositeKey,
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
        BindingKind::Composite,
        BindingFlags::EMPTY,
        &CompositePayload {
            key: live.composite_key(),
        },
    )
}

impl Binding {
    /// `struct` or `union`. `None` for other kinds.
    pub fn read_key(
        &self,
        reader: &RecordReader<'_>,
    ) -> Result<Option<CompositeKey>, CxindexError> {
        if self.kind != BindingKind::Composite {
            return Ok(None);
        }
        Ok(Some(reader.payload::<CompositePayload>(self.record())?.key))
    }
}
