use crate::bindings::{self, parameter::Parameter};
use crate::{Binding, Linkage, Parent};
use cxindex_core::{BindingFlags, BindingKind, CxindexError, RecordId, SemanticBinding};
use cxindex_storage::{RecordReader, WriteSection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct FunctionPayload {
    #[serde(default)]
    pub return_type: RecordId,
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
        BindingKind::Function,
        BindingFlags::of(live),
        &FunctionPayload::default(),
    )
}

/// Write the return type and rebuild the parameter list.
pub(crate) fn populate<L: Linkage + ?Sized>(
    section: &WriteSection<'_>,
    linkage: &L,
    binding: &Binding,
    live: &dyn SemanticBinding,
) -> Result<(), CxindexError> {
    let previous: FunctionPayload = section.reader().payload(binding.record())?;
    let return_type = bindings::replace_type(
        section,
        linkage,
        binding.record(),
        previous.return_type,
        live.declared_type(),
    )?;
    section.write_payload(binding.record(), &FunctionPayload { return_type })?;

    for parameter in binding.read_parameters(&section.reader(), linkage)? {
        parameter.free(section, linkage)?;
    }
    for parameter in live.parameters() {
        Parameter::create(section, linkage, binding.record(), parameter)?;
    }
    Ok(())
}

impl Binding {
    /// Parameters of a function, in declaration order.
    pub fn read_parameters<L: Linkage + ?Sized>(
        &self,
        reader: &RecordReader<'_>,
        linkage: &L,
    ) -> Result<Vec<Parameter>, CxindexError> {
        if self.kind != BindingKind::Function {
            return Ok(Vec::new());
        }
        let expected = linkage.node_type_of(BindingKind::Parameter);
        reader
            .children(self.record())?
            .into_iter()
            .map(|record| Parameter::from_header(reader.require_header(record)?, expected))
            .collect()
    }
}
