//! The binding family.
//!
//! One module per persisted kind. Each kind has a `create` constructor that
//! allocates the record and copies immutable attributes, a `populate` step
//! that writes the refreshable attributes (type references, enumerator
//! values, parameters), and lazy `read_*` accessors on [`Binding`].

pub mod basic_type;
pub mod composite;
pub mod enumeration;
pub mod enumerator;
pub mod field;
pub mod function;
pub mod parameter;
pub mod typedef;
pub mod variable;

use crate::{Binding, Linkage, Parent};
use cxindex_core::{
    BindingFlags, BindingKind, CxindexError, LiveType, NodeType, PersistedRef, RecordId,
    SemanticBinding,
};
use cxindex_storage::{NewRecord, RecordReader, WriteSection};
use serde::Serialize;

/// Allocate the record of a new binding under `parent`.
pub(crate) fn allocate<L: Linkage + ?Sized, P: Serialize>(
    section: &WriteSection<'_>,
    linkage: &L,
    parent: &Parent,
    name: &[u8],
    kind: BindingKind,
    flags: BindingFlags,
    payload: &P,
) -> Result<Binding, CxindexError> {
    let node_type = linkage.node_type_of(kind);
    let parent_record = parent.record(linkage);
    let record = section.allocate(
        &NewRecord::new(node_type, parent_record, name)
            .with_flags(flags)
            .with_payload(payload)?,
    )?;
    tracing::debug!(
        "Created {} {} at record {}",
        kind,
        String::from_utf8_lossy(name),
        record
    );

    Ok(Binding {
        persisted: PersistedRef {
            store: section.reader().store_id().clone(),
            record,
            node_type,
        },
        kind,
        name: name.to_vec(),
        parent: parent_record,
        flags,
        owner: parent.owner().cloned().map(Box::new),
        enumeration: None,
    })
}

/// Write the refreshable attributes of `binding` from `live`.
pub(crate) fn populate<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    match binding.kind() {
        BindingKind::Variable => variable::populate(section, linkage, binding, live),
        BindingKind::Field => field::populate(section, linkage, binding, live),
        BindingKind::Function => function::populate(section, linkage, binding, live),
        BindingKind::Typedef => typedef::populate(section, linkage, binding, live),
        BindingKind::Enumerator => enumerator::populate(section, binding, live),
        _ => Ok(()),
    }
}

/// Persist `ty` as the type held by `holder`.
///
/// A basic-type record the holder owned from an earlier run is freed first;
/// type bindings are shared and never freed here.
pub(crate) fn replace_type<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    holder: RecordId,
    previous: RecordId,
    ty: Option<LiveType<'_>>,
) -> Result<RecordId, CxindexError> {
    if !previous.is_none() {
        if let Some(header) = section.reader().header(previous)? {
            if header.node_type == linkage.node_type_of(BindingKind::BasicType)
                && header.parent == holder
            {
                section.free(previous)?;
            }
        }
    }
    match ty {
        Some(ty) => Ok(linkage
            .add_type(section, holder, ty)?
            .unwrap_or(RecordId::NONE)),
        None => Ok(RecordId::NONE),
    }
}

fn some_record(record: RecordId) -> Option<RecordId> {
    (!record.is_none()).then_some(record)
}

impl Binding {
    /// Record of the declared type: variable and field type, typedef target,
    /// or function return type.
    pub fn read_type(&self, reader: &RecordReader<'_>) -> Result<Option<RecordId>, CxindexError> {
        let record = match self.kind {
            BindingKind::Variable => {
                reader
                    .payload::<variable::VariablePayload>(self.record())?
                    .type_record
            }
            BindingKind::Field => reader.payload::<field::FieldPayload>(self.record())?.type_record,
            BindingKind::Typedef => {
                reader
                    .payload::<typedef::TypedefPayload>(self.record())?
                    .target
            }
            BindingKind::Function => {
                reader
                    .payload::<function::FunctionPayload>(self.record())?
                    .return_type
            }
            _ => RecordId::NONE,
        };
        Ok(some_record(record))
    }

    /// Members of a composite or enumeration, in declaration order.
    pub fn read_members<L: Linkage + ?Sized>(
        &self,
        reader: &RecordReader<'_>,
        linkage: &L,
    ) -> Result<Vec<Binding>, CxindexError> {
        if !self.kind.is_member_owner() {
            return Ok(Vec::new());
        }
        reader
            .children(self.record())?
            .into_iter()
            .map(|record| Binding::load(reader, linkage, record))
            .collect()
    }
}

/// Tag check shared by the kind modules' loaders.
pub(crate) fn expect_node_type(
    record: RecordId,
    actual: NodeType,
    expected: NodeType,
) -> Result<(), CxindexError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CxindexError::CorruptNodeType {
            record,
            node_type: actual,
        })
    }
}
