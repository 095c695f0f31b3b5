use crate::bindings;
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError, RecordId, SemanticBinding};
use cxindex_storage::{RecordReader, WriteSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EnumeratorPayload {
    pub enumeration: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// Create an enumerator of an already persisted `enumeration`.
///
/// The enumerator is scoped by `parent` like any other binding and is also
/// appended to the enumeration's ordered child list.
pub(crate) fn create<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    parent: &Parent,
    name: &[u8],
    enumeration: Binding,
) -> Result<Binding, CxindexError> {
    let mut binding = bindings::allocate(
        section,
        linkage,
        parent,
        name,
        BindingKind::Enumerator,
        BindingFlags::EMPTY,
        &EnumeratorPayload {
            enumeration: enumeration.record(),
            value: None,
        },
    )?;
    section.add_child(enumeration.record(), binding.record())?;
    binding.enumeration = Some(Box::new(enumeration));
    Ok(binding)
}

pub(crate) fn populate(
    section: &WriteSection<'_>,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    let mut payload: EnumeratorPayload = section.reader().payload(binding.record())?;
    payload.value = live.enumerator_value();
    section.write_payload(binding.record(), &payload)
}

impl Binding {
    /// Constant value of an enumerator, when known.
    pub fn read_value(&self, reader: &RecordReader<'_>) -> Result<Option<i64>, CxindexError> {
        if self.kind != BindingKind::Enumerator {
            return Ok(None);
        }
        Ok(reader.payload::<EnumeratorPayload>(self.record())?.value)
    }

    /// Owning enumeration of an enumerator.
    pub fn enumeration_binding(&self) -> Option<&Binding> {
        self.enumeration.as_deref()
    }
}
