//! Mock parser objects for the integration tests.

#![allow(dead_code)]

use cxindex_core::{
    AstName, BasicKind, BasicTypeSpec, CompositeKey, LiveType, NameRole, PersistedRef,
    Resolution, Scope, SemanticBinding, SourceLocation, TranslationUnit,
};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Variable,
    Field,
    Parameter,
    Function,
    Composite,
    Enumeration,
    Enumerator,
    Typedef,
    Basic,
}

#[derive(Clone)]
pub enum MockScope {
    TranslationUnit,
    Local,
    Owner(Rc<Decl>),
}

#[derive(Clone)]
pub enum MockType {
    Basic(BasicTypeSpec),
    Decl(Rc<Decl>),
    Pointer,
    Problem,
}

/// A declaration as the parser would hand it over.
#[derive(Clone)]
pub struct Decl {
    pub name: Vec<u8>,
    pub kind: Kind,
    pub scope: MockScope,
    pub is_static: bool,
    pub is_extern: bool,
    pub varargs: bool,
    pub location: Option<SourceLocation>,
    pub enumeration: Option<Rc<Decl>>,
    pub value: Option<i64>,
    pub ty: Option<MockType>,
    pub params: Vec<Rc<Decl>>,
    pub key: CompositeKey,
    pub bit_width: Option<u32>,
    pub persisted: Option<PersistedRef>,
}

impl Decl {
    pub fn new(kind: Kind, name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            kind,
            scope: MockScope::TranslationUnit,
            is_static: false,
            is_extern: false,
            varargs: false,
            location: None,
            enumeration: None,
            value: None,
            ty: None,
            params: Vec::new(),
            key: CompositeKey::Struct,
            bit_width: None,
            persisted: None,
        }
    }

    pub fn in_owner(mut self, owner: &Rc<Decl>) -> Self {
        self.scope = MockScope::Owner(Rc::clone(owner));
        self
    }

    pub fn local(mut self) -> Self {
        self.scope = MockScope::Local;
        self
    }

    pub fn with_type(mut self, ty: MockType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn at(mut self, file: &str, offset: u32) -> Self {
        self.location = Some(SourceLocation {
            file: file.to_string(),
            offset,
        });
        self
    }

    pub fn rc(self) -> Rc<Decl> {
        Rc::new(self)
    }
}

pub fn int() -> MockType {
    MockType::Basic(BasicTypeSpec::new(BasicKind::Int))
}

pub fn variable(name: &str) -> Rc<Decl> {
    Decl::new(Kind::Variable, name).with_type(int()).rc()
}

pub fn function(name: &str) -> Rc<Decl> {
    Decl::new(Kind::Function, name).with_type(int()).rc()
}

pub fn structure(name: &str) -> Rc<Decl> {
    Decl::new(Kind::Composite, name).at("shapes.c", 0).rc()
}

pub fn field(owner: &Rc<Decl>, name: &str) -> Rc<Decl> {
    Decl::new(Kind::Field, name).in_owner(owner).with_type(int()).rc()
}

pub fn enumeration(name: &str) -> Rc<Decl> {
    Decl::new(Kind::Enumeration, name).at("colors.c", 0).rc()
}

pub fn enumerator(owner: &Rc<Decl>, name: &str, value: i64) -> Rc<Decl> {
    let mut decl = Decl::new(Kind::Enumerator, name);
    decl.enumeration = Some(Rc::clone(owner));
    decl.value = Some(value);
    decl.rc()
}

/// Enumerator whose parser-reported scope is the enumeration body.
pub fn scoped_enumerator(owner: &Rc<Decl>, name: &str, value: i64) -> Rc<Decl> {
    let mut decl = Decl::new(Kind::Enumerator, name).in_owner(owner);
    decl.enumeration = Some(Rc::clone(owner));
    decl.value = Some(value);
    decl.rc()
}

pub fn typedef(name: &str, target: MockType) -> Rc<Decl> {
    Decl::new(Kind::Typedef, name).with_type(target).rc()
}

pub fn parameter(name: &str) -> Rc<Decl> {
    Decl::new(Kind::Parameter, name).local().with_type(int()).rc()
}

impl SemanticBinding for Decl {
    fn name(&self) -> &[u8] {
        &self.name
    }

    fn is_variable(&self) -> bool {
        matches!(self.kind, Kind::Variable | Kind::Field | Kind::Parameter)
    }

    fn is_function(&self) -> bool {
        self.kind == Kind::Function
    }

    fn is_field(&self) -> bool {
        self.kind == Kind::Field
    }

    fn is_composite(&self) -> bool {
        self.kind == Kind::Composite
    }

    fn is_enumeration(&self) -> bool {
        self.kind == Kind::Enumeration
    }

    fn is_enumerator(&self) -> bool {
        self.kind == Kind::Enumerator
    }

    fn is_typedef(&self) -> bool {
        self.kind == Kind::Typedef
    }

    fn is_parameter(&self) -> bool {
        self.kind == Kind::Parameter
    }

    fn is_basic_type(&self) -> bool {
        self.kind == Kind::Basic
    }

    fn scope(&self) -> Scope<'_> {
        match &self.scope {
            MockScope::TranslationUnit => Scope::TranslationUnit,
            MockScope::Local => Scope::Local,
            MockScope::Owner(owner) => Scope::Owner(owner.as_ref()),
        }
    }

    fn has_internal_linkage(&self) -> bool {
        self.is_static
    }

    fn is_extern(&self) -> bool {
        self.is_extern
    }

    fn takes_varargs(&self) -> bool {
        self.varargs
    }

    fn location(&self) -> Option<SourceLocation> {
        self.location.clone()
    }

    fn enumeration(&self) -> Option<&dyn SemanticBinding> {
        self.enumeration
            .as_deref()
            .map(|e| e as &dyn SemanticBinding)
    }

    fn enumerator_value(&self) -> Option<i64> {
        self.value
    }

    fn declared_type(&self) -> Option<LiveType<'_>> {
        self.ty.as_ref().map(|ty| match ty {
            MockType::Basic(spec) => LiveType::Basic(*spec),
            MockType::Decl(decl) => LiveType::Binding(decl.as_ref()),
            MockType::Pointer => LiveType::Unsupported,
            MockType::Problem => LiveType::Problem,
        })
    }

    fn parameters(&self) -> Vec<&dyn SemanticBinding> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &dyn SemanticBinding)
            .collect()
    }

    fn composite_key(&self) -> CompositeKey {
        self.key
    }

    fn bit_field_width(&self) -> Option<u32> {
        self.bit_width
    }

    fn persisted(&self) -> Option<&PersistedRef> {
        self.persisted.as_ref()
    }
}

pub enum Target {
    Decl(Rc<Decl>),
    Problem,
    Unresolved,
}

/// A name reference in the AST.
pub struct MockName {
    pub name: Vec<u8>,
    pub role: NameRole,
    pub target: Target,
    pub definition: bool,
}

impl MockName {
    pub fn new(name: &str, role: NameRole, target: Target) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            role,
            target,
            definition: false,
        }
    }

    /// Defining occurrence of `decl`.
    pub fn defining(decl: &Rc<Decl>) -> Self {
        Self {
            name: decl.name.clone(),
            role: NameRole::Other,
            target: Target::Decl(Rc::clone(decl)),
            definition: true,
        }
    }

    /// Plain reference to `decl` in the given role.
    pub fn referring(decl: &Rc<Decl>, role: NameRole) -> Self {
        Self::new(
            &String::from_utf8_lossy(&decl.name),
            role,
            Target::Decl(Rc::clone(decl)),
        )
    }
}

impl AstName for MockName {
    fn name(&self) -> &[u8] {
        &self.name
    }

    fn role(&self) -> NameRole {
        self.role
    }

    fn resolve(&self) -> Resolution<'_> {
        match &self.target {
            Target::Decl(decl) => Resolution::Binding(decl.as_ref()),
            Target::Problem => Resolution::Problem,
            Target::Unresolved => Resolution::Unresolved,
        }
    }

    fn is_definition(&self) -> bool {
        self.definition
    }
}

pub struct MockUnit {
    pub path: String,
    pub content: Vec<u8>,
    pub names: Vec<MockName>,
    pub linkage: String,
}

impl MockUnit {
    pub fn new(path: &str, content: &str, names: Vec<MockName>) -> Self {
        Self {
            path: path.to_string(),
            content: content.as_bytes().to_vec(),
            names,
            linkage: cxindex_core::C_LINKAGE_ID.to_string(),
        }
    }
}

impl TranslationUnit for MockUnit {
    fn path(&self) -> &str {
        &self.path
    }

    fn content(&self) -> &[u8] {
        &self.content
    }

    fn names(&self) -> Vec<&dyn AstName> {
        self.names.iter().map(|n| n as &dyn AstName).collect()
    }

    fn linkage_id(&self) -> &str {
        &self.linkage
    }
}
