use std::cmp::Ordering;

use crate::{BasicTypeSpec, CompositeKey, PersistedRef, SourceLocation, C_LINKAGE_ID};

// ── Live Semantic Bindings ──────────────────────────────────────────────────

/// Scope in which a live binding is declared.
#[derive(Clone, Copy)]
pub enum Scope<'a> {
    /// File scope of the translation unit.
    TranslationUnit,
    /// Block or function-body scope. Such bindings are never indexed.
    Local,
    /// Member scope of another binding (struct/union body, enumeration).
    Owner(&'a dyn SemanticBinding),
}

/// Type attached to a declaration.
#[derive(Clone, Copy)]
pub enum LiveType<'a> {
    Basic(BasicTypeSpec),
    Binding(&'a dyn SemanticBinding),
    /// The parser could not determine the type.
    Problem,
    /// Derived type shapes (pointers, arrays, qualifiers) the index does not model.
    Unsupported,
}

/// The parser's in-memory view of a resolved name.
///
/// Kind predicates follow the structure of the source language, so several
/// may hold at once: a field is also a variable, and so is a parameter.
/// Callers classify through [`crate::BindingKind::classify`].
pub trait SemanticBinding {
    /// Raw name; empty for anonymous entities.
    fn name(&self) -> &[u8];

    fn is_variable(&self) -> bool {
        false
    }

    fn is_function(&self) -> bool {
        false
    }

    fn is_field(&self) -> bool {
        false
    }

    fn is_composite(&self) -> bool {
        false
    }

    fn is_enumeration(&self) -> bool {
        false
    }

    fn is_enumerator(&self) -> bool {
        false
    }

    fn is_typedef(&self) -> bool {
        false
    }

    fn is_parameter(&self) -> bool {
        false
    }

    fn is_basic_type(&self) -> bool {
        false
    }

    /// Declaring scope.
    fn scope(&self) -> Scope<'_> {
        Scope::TranslationUnit
    }

    /// Declared `static` at file scope.
    fn has_internal_linkage(&self) -> bool {
        false
    }

    fn is_extern(&self) -> bool {
        false
    }

    fn is_inline(&self) -> bool {
        false
    }

    /// Function declared with a trailing `...`.
    fn takes_varargs(&self) -> bool {
        false
    }

    /// Definition location, used to name anonymous types.
    fn location(&self) -> Option<SourceLocation> {
        None
    }

    /// Owning enumeration of an enumerator.
    fn enumeration(&self) -> Option<&dyn SemanticBinding> {
        None
    }

    /// Constant value of an enumerator, when the parser could evaluate it.
    fn enumerator_value(&self) -> Option<i64> {
        None
    }

    /// Variable/field type, typedef target, or function return type.
    fn declared_type(&self) -> Option<LiveType<'_>> {
        None
    }

    /// Parameters of a function, in declaration order.
    fn parameters(&self) -> Vec<&dyn SemanticBinding> {
        Vec::new()
    }

    fn composite_key(&self) -> CompositeKey {
        CompositeKey::Struct
    }

    fn bit_field_width(&self) -> Option<u32> {
        None
    }

    /// Set when this binding is already persisted in some store.
    fn persisted(&self) -> Option<&PersistedRef> {
        None
    }
}

// ── AST Names ───────────────────────────────────────────────────────────────

/// Syntactic role of a name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    /// `foo` in `foo(1, 2)`.
    CallTarget,
    /// `foo` used as a plain value expression.
    IdExpression,
    /// `foo` after `struct`, `union`, or `enum`.
    ElaboratedType,
    /// `foo` in a general type-name position.
    NamedType,
    /// Declarator names and everything else.
    Other,
}

/// Result of resolving an AST name.
#[derive(Clone, Copy)]
pub enum Resolution<'a> {
    Binding(&'a dyn SemanticBinding),
    /// Ambiguous or erroneous source.
    Problem,
    Unresolved,
}

/// A name occurring in the AST.
pub trait AstName {
    fn name(&self) -> &[u8];

    fn role(&self) -> NameRole;

    fn resolve(&self) -> Resolution<'_>;

    /// True for the defining occurrence of the entity.
    fn is_definition(&self) -> bool {
        false
    }
}

/// A parsed translation unit handed to the incremental driver.
pub trait TranslationUnit {
    fn path(&self) -> &str;

    /// Source bytes used for change detection.
    fn content(&self) -> &[u8];

    /// Names in source order.
    fn names(&self) -> Vec<&dyn AstName>;

    fn linkage_id(&self) -> &str {
        C_LINKAGE_ID
    }
}

// ── Index Ordering ──────────────────────────────────────────────────────────

/// Total order over persisted names shared by every insert and search on a
/// linkage's index.
pub trait IndexComparator: Send + Sync {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}
