//! The C linkage.

use crate::bindings::basic_type::BasicType;
use crate::bindings::parameter::Parameter;
use crate::bindings::{self, composite, enumeration, enumerator, field, function, typedef, variable};
use crate::find::{self, BytewiseComparator};
use crate::linkage::{self, Parent};
use crate::{anonymous, Binding, Linkage, Node};
use cxindex_core::{
    AstName, BindingFlags, BindingKind, CxindexError, IndexComparator, LiveType, NameRole,
    NodeType, NodeTypeBlock, RecordId, SemanticBinding, C_LINKAGE_ID,
};
use cxindex_storage::{NewRecord, RecordReader, RecordStore, WriteSection};

const BLOCK: NodeTypeBlock = NodeTypeBlock::for_slot(0);

pub const C_VARIABLE: NodeType = BLOCK.tag(1);
pub const C_FUNCTION: NodeType = BLOCK.tag(2);
pub const C_STRUCTURE: NodeType = BLOCK.tag(3);
pub const C_FIELD: NodeType = BLOCK.tag(4);
pub const C_ENUMERATION: NodeType = BLOCK.tag(5);
pub const C_ENUMERATOR: NodeType = BLOCK.tag(6);
pub const C_TYPEDEF: NodeType = BLOCK.tag(7);
pub const C_PARAMETER: NodeType = BLOCK.tag(8);
pub const C_BASIC_TYPE: NodeType = BLOCK.tag(9);

/// Symbol database partition for C translation units.
pub struct CLinkage {
    record: RecordId,
    index_root: RecordId,
    comparator: BytewiseComparator,
}

impl CLinkage {
    /// Open the C linkage of `store`, creating its records on first use.
    pub fn open(store: &RecordStore) -> Result<Self, CxindexError> {
        let roots = match store.read(|reader| reader.linkage_roots(C_LINKAGE_ID))? {
            Some(roots) => roots,
            None => store.write(|section| {
                if let Some(roots) = section.reader().linkage_roots(C_LINKAGE_ID)? {
                    return Ok(roots);
                }
                let record = section.allocate(&NewRecord::new(
                    NodeType::LINKAGE,
                    RecordId::NONE,
                    C_LINKAGE_ID.as_bytes(),
                ))?;
                let index_root =
                    section.allocate(&NewRecord::new(NodeType::INDEX_ROOT, record, b""))?;
                section.register_linkage(C_LINKAGE_ID, record, index_root)?;
                tracing::info!("Created {} linkage at record {}", C_LINKAGE_ID, record);
                Ok((record, index_root))
            })?,
        };

        Ok(Self {
            record: roots.0,
            index_root: roots.1,
            comparator: BytewiseComparator,
        })
    }

    fn create(
        &self,
        section: &WriteSection<'_>,
        kind: BindingKind,
        parent: &Parent,
        name: &[u8],
        binding: &dyn SemanticBinding,
    ) -> Result<Option<Binding>, CxindexError> {
        let created = match kind {
            BindingKind::Field => field::create(section, self, parent, name)?,
            BindingKind::Variable => Some(variable::create(section, self, parent, name, binding)?),
            BindingKind::Function => Some(function::create(section, self, parent, name, binding)?),
            BindingKind::Composite => {
                Some(composite::create(section, self, parent, name, binding)?)
            }
            BindingKind::Enumeration => Some(enumeration::create(section, self, parent, name)?),
            BindingKind::Enumerator => {
                let owner = match binding.enumeration() {
                    Some(live) => self.adapt_binding(&section.reader(), live)?,
                    None => None,
                };
                match owner {
                    Some(owner) if owner.kind() == BindingKind::Enumeration => {
                        Some(enumerator::create(section, self, parent, name, owner)?)
                    }
                    _ => None,
                }
            }
            BindingKind::Typedef => Some(typedef::create(section, self, parent, name)?),
            BindingKind::Parameter | BindingKind::BasicType | BindingKind::Unknown => None,
        };
        Ok(created)
    }
}

impl Linkage for CLinkage {
    fn id(&self) -> &str {
        C_LINKAGE_ID
    }

    fn record(&self) -> RecordId {
        self.record
    }

    fn index_root(&self) -> RecordId {
        self.index_root
    }

    fn node_types(&self) -> NodeTypeBlock {
        BLOCK
    }

    fn node_type_of(&self, kind: BindingKind) -> NodeType {
        match kind {
            BindingKind::Variable => C_VARIABLE,
            BindingKind::Function => C_FUNCTION,
            BindingKind::Composite => C_STRUCTURE,
            BindingKind::Field => C_FIELD,
            BindingKind::Enumeration => C_ENUMERATION,
            BindingKind::Enumerator => C_ENUMERATOR,
            BindingKind::Typedef => C_TYPEDEF,
            BindingKind::Parameter => C_PARAMETER,
            BindingKind::BasicType => C_BASIC_TYPE,
            BindingKind::Unknown => NodeType::NONE,
        }
    }

    fn kind_of(&self, node_type: NodeType) -> Option<BindingKind> {
        match node_type {
            C_VARIABLE => Some(BindingKind::Variable),
            C_FUNCTION => Some(BindingKind::Function),
            C_STRUCTURE => Some(BindingKind::Composite),
            C_FIELD => Some(BindingKind::Field),
            C_ENUMERATION => Some(BindingKind::Enumeration),
            C_ENUMERATOR => Some(BindingKind::Enumerator),
            C_TYPEDEF => Some(BindingKind::Typedef),
            C_PARAMETER => Some(BindingKind::Parameter),
            C_BASIC_TYPE => Some(BindingKind::BasicType),
            _ => None,
        }
    }

    fn index_comparator(&self) -> &dyn IndexComparator {
        &self.comparator
    }

    fn add_binding(
        &self,
        section: &WriteSection<'_>,
        binding: &dyn SemanticBinding,
    ) -> Result<Option<Binding>, CxindexError> {
        let kind = BindingKind::classify(binding);
        if kind == BindingKind::Parameter {
            return Ok(None);
        }
        if let Some(existing) = self.adapt_binding(&section.reader(), binding)? {
            return Ok(Some(existing));
        }

        section.atomically(|section| {
            let Some(parent) = linkage::added_parent(self, section, binding)? else {
                return Ok(None);
            };
            let Some(name) = anonymous::persisted_name(binding) else {
                return Ok(None);
            };
            let Some(created) = self.create(section, kind, &parent, &name, binding)? else {
                return Ok(None);
            };
            linkage::register_child(self, section, &parent, &created)?;
            bindings::populate(section, self, &created, binding)?;
            Ok(Some(created))
        })
    }

    fn adapt_binding(
        &self,
        reader: &RecordReader<'_>,
        binding: &dyn SemanticBinding,
    ) -> Result<Option<Binding>, CxindexError> {
        if let Some(persisted) = binding.persisted() {
            if &persisted.store == reader.store_id() {
                return Binding::load(reader, self, persisted.record).map(Some);
            }
        }

        let Some(name) = anonymous::persisted_name(binding) else {
            return Ok(None);
        };
        let node_type = self.get_binding_type(binding);
        if node_type == NodeType::NONE {
            return Ok(None);
        }

        let found = match linkage::adapted_parent(self, reader, binding)? {
            Some(Parent::Linkage) => find::find_in_index(reader, self, &name, &[node_type])?,
            Some(Parent::Owner(owner)) => {
                find::find_in_owner(reader, self, owner.record(), &name, &[node_type])?
            }
            None => Vec::new(),
        };
        Ok(found.into_iter().next())
    }

    fn resolve_binding(
        &self,
        reader: &RecordReader<'_>,
        name: &dyn AstName,
    ) -> Result<Vec<Binding>, CxindexError> {
        let node_types: &[NodeType] = match name.role() {
            NameRole::CallTarget => &[C_FUNCTION],
            NameRole::IdExpression => &[C_VARIABLE, C_ENUMERATOR],
            NameRole::ElaboratedType => &[C_STRUCTURE],
            NameRole::NamedType => &[C_STRUCTURE, C_ENUMERATION, C_TYPEDEF],
            NameRole::Other => &[],
        };
        if node_types.is_empty() || name.name().is_empty() {
            return Ok(Vec::new());
        }
        find::find_in_index(reader, self, name.name(), node_types)
    }

    fn get_node(
        &self,
        reader: &RecordReader<'_>,
        record: RecordId,
    ) -> Result<Option<Node>, CxindexError> {
        if record.is_none() {
            return Ok(None);
        }
        let header = reader.require_header(record)?;
        let node = match header.node_type {
            C_PARAMETER => Node::Parameter(Parameter::from_header(header, C_PARAMETER)?),
            C_BASIC_TYPE => Node::BasicType(BasicType::load(reader, self, header)?),
            C_VARIABLE | C_FUNCTION | C_STRUCTURE | C_FIELD | C_ENUMERATION | C_ENUMERATOR
            | C_TYPEDEF => Node::Binding(Binding::from_header(reader, self, header)?),
            _ => return linkage::base_node(&header),
        };
        Ok(Some(node))
    }

    fn add_type(
        &self,
        section: &WriteSection<'_>,
        parent: RecordId,
        ty: LiveType<'_>,
    ) -> Result<Option<RecordId>, CxindexError> {
        match ty {
            LiveType::Problem | LiveType::Unsupported => Ok(None),
            LiveType::Basic(spec) => {
                let basic = BasicType::create(section, self, parent, spec)?;
                Ok(Some(basic.record()))
            }
            LiveType::Binding(binding) => {
                Ok(self.add_binding(section, binding)?.map(|b| b.record()))
            }
        }
    }

    fn is_file_local_binding(&self, binding: &dyn SemanticBinding) -> bool {
        match BindingKind::classify(binding) {
            BindingKind::Field => false,
            BindingKind::Variable | BindingKind::Function => binding.has_internal_linkage(),
            _ => false,
        }
    }

    fn refresh_binding(
        &self,
        section: &WriteSection<'_>,
        binding: &Binding,
        live: &dyn SemanticBinding,
    ) -> Result<(), CxindexError> {
        let kind = BindingKind::classify(live);
        if kind != binding.kind() {
            tracing::debug!(
                "Not refreshing {} {} from a live {}",
                binding.kind(),
                binding.name_lossy(),
                kind
            );
            return Ok(());
        }
        section.atomically(|section| {
            if matches!(kind, BindingKind::Variable | BindingKind::Function) {
                section.set_flags(binding.record(), BindingFlags::of(live))?;
            }
            bindings::populate(section, self, binding, live)
        })
    }
}
