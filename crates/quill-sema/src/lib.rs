//! Semantic model for the Quill analyzer.
//!
//! This crate provides:
//! - `Type` - semantic types with structural equality and display forms
//! - `Symbol` / `SymbolArena` - the symbol hierarchy, arena-allocated
//! - `Scope` / `ScopeArena` - the lexical scope tree with name lookup
//! - the native type catalogue with built-in operator seeding
//! - `AnalysisContext` - the shared state both analysis phases borrow
//!
//! Symbols reference each other (overload lists, parameter lists, alias
//! targets) through plain `SymbolId` indices into one heterogeneous
//! arena, so the cyclic symbol graph needs no shared ownership.

pub mod context;
pub mod natives;
pub mod operators;
pub mod scope;
pub mod symbol;
pub mod types;

pub use context::AnalysisContext;
pub use natives::NativeKind;
pub use operators::{
    OperatorLookup, binary_operator_name, cast_name, lookup_binary_operator,
    lookup_unary_operator, operator_owner, unary_operator_name,
};
pub use scope::{NarrowedLookup, Scope, ScopeArena, ScopeId};
pub use symbol::{
    AliasSymbol, CastSymbol, ConstSymbol, ConstructorSymbol, DefSymbol, DestructorSymbol,
    EntrySymbol, ExternalFunctionSymbol, FieldSymbol, FunctionSymbol, ImportGroupSymbol,
    ModuleSymbol, OperatorKind, OperatorSymbol, ParameterSymbol, StringFunctionSymbol, StructData,
    Symbol, SymbolArena, SymbolId, TypeSymbol, TypeSymbolKind, VarSymbol,
};
pub use types::{Type, TypeDisplay};
