use crate::bindings::basic_type::BasicType;
use crate::bindings::parameter::Parameter;
use crate::Binding;
use cxindex_core::RecordId;

/// Any record a linkage can materialize.
#[derive(Debug, Clone)]
pub enum Node {
    Linkage(RecordId),
    IndexRoot(RecordId),
    Binding(Binding),
    Parameter(Parameter),
    BasicType(BasicType),
}

impl Node {
    pub fn record(&self) -> RecordId {
        match self {
            Self::Linkage(record) | Self::IndexRoot(record) => *record,
            Self::Binding(binding) => binding.record(),
            Self::Parameter(parameter) => parameter.record(),
            Self::BasicType(basic) => basic.record(),
        }
    }

    pub fn into_binding(self) -> Option<Binding> {
        match self {
            Self::Binding(binding) => Some(binding),
            _ => None,
        }
    }
}
