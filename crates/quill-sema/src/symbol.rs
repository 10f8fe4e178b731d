//! The symbol hierarchy.
//!
//! Every declared name is a `Symbol` in one heterogeneous `SymbolArena`.
//! Cross-references (alias targets, overload lists, parameter lists,
//! operator tables) are `SymbolId` indices, never owning pointers; a
//! symbol's owner is the scope whose table names it.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use quill_ast::{BinaryOp, ExprId, TypeExprId, UnaryOp};

use crate::natives::NativeKind;
use crate::scope::ScopeId;
use crate::types::Type;

/// Index of a symbol in its [`SymbolArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A module: a named scope, neither a value nor static-or-instance.
#[derive(Debug, Clone)]
pub struct ModuleSymbol {
    pub name: String,
    pub scope: ScopeId,
}

/// Payload of a user-declared struct type symbol.
#[derive(Debug, Clone)]
pub struct StructData {
    pub scope: ScopeId,
    pub mutable: bool,
    /// Next zero-based index handed to an instance field.
    pub next_field_index: u32,
    /// Operator overloads whose left (or sole) operand is this type.
    pub operators: Vec<SymbolId>,
    /// Set by the resolver when a static field with an initializer exists.
    pub has_static_fields: bool,
}

#[derive(Debug, Clone)]
pub enum TypeSymbolKind {
    Native {
        kind: NativeKind,
        operators: Vec<SymbolId>,
    },
    Struct(StructData),
    /// A generic hole introduced by a type-parameter list.
    TypeParameter,
}

/// A type symbol: native singleton, user struct, or type parameter.
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub name: String,
    /// Stable numeric id; natives use reserved ids, structs allocate
    /// monotonically.
    pub type_id: u32,
    pub kind: TypeSymbolKind,
}

impl TypeSymbol {
    /// The operator table of this type, when it has one.
    #[must_use]
    pub fn operators(&self) -> Option<&[SymbolId]> {
        match &self.kind {
            TypeSymbolKind::Native { operators, .. } => Some(operators),
            TypeSymbolKind::Struct(data) => Some(&data.operators),
            TypeSymbolKind::TypeParameter => None,
        }
    }

    pub fn push_operator(&mut self, operator: SymbolId) {
        match &mut self.kind {
            TypeSymbolKind::Native { operators, .. } => operators.push(operator),
            TypeSymbolKind::Struct(data) => data.operators.push(operator),
            TypeSymbolKind::TypeParameter => {}
        }
    }

    #[must_use]
    pub fn struct_data(&self) -> Option<&StructData> {
        match &self.kind {
            TypeSymbolKind::Struct(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn struct_data_mut(&mut self) -> Option<&mut StructData> {
        match &mut self.kind {
            TypeSymbolKind::Struct(data) => Some(data),
            _ => None,
        }
    }

    /// The member scope of this type, when it owns one.
    #[must_use]
    pub fn scope(&self) -> Option<ScopeId> {
        self.struct_data().map(|d| d.scope)
    }
}

/// A named redirection to another symbol. The target is resolved at
/// insertion time and never rewritten, so alias chains cannot cycle.
#[derive(Debug, Clone)]
pub struct AliasSymbol {
    pub name: String,
    pub target: SymbolId,
}

#[derive(Debug, Clone)]
pub struct FieldSymbol {
    pub name: String,
    pub owner: SymbolId,
    /// Zero-based layout index; instance fields only, statics carry 0.
    pub index: u32,
    pub mutable: bool,
    pub is_static: bool,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct ConstSymbol {
    pub name: String,
    pub ty: Option<Type>,
}

/// A type alias (`def Name = Type`).
#[derive(Debug, Clone)]
pub struct DefSymbol {
    pub name: String,
    /// Syntactic target, evaluated during Collector Pass B.
    pub syntax: TypeExprId,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub name: String,
    pub mutable: bool,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct ParameterSymbol {
    pub name: String,
    pub mutable: bool,
    pub ty: Option<Type>,
    pub default: Option<ExprId>,
    pub variadic: bool,
    /// Zero-based position, counting a synthesized `this` at 0.
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub type_params: Vec<SymbolId>,
    pub params: Vec<SymbolId>,
    pub return_type: Option<Type>,
    pub scope: ScopeId,
    /// Same-named siblings with distinct signatures.
    pub overloads: SmallVec<[SymbolId; 2]>,
}

#[derive(Debug, Clone)]
pub struct ExternalFunctionSymbol {
    pub name: String,
    pub params: Vec<SymbolId>,
    pub return_type: Option<Type>,
    /// Opaque attribute mapping forwarded to the backend.
    pub attributes: FxHashMap<String, String>,
    pub overloads: SmallVec<[SymbolId; 2]>,
}

#[derive(Debug, Clone)]
pub struct ConstructorSymbol {
    pub owner: SymbolId,
    /// Parameters including the synthesized `this` at index 0.
    pub params: Vec<SymbolId>,
    pub scope: ScopeId,
    pub overloads: SmallVec<[SymbolId; 2]>,
}

#[derive(Debug, Clone)]
pub struct DestructorSymbol {
    pub owner: SymbolId,
    pub scope: ScopeId,
}

/// A struct's `string` conversion function; its return type is fixed to
/// the built-in string type.
#[derive(Debug, Clone)]
pub struct StringFunctionSymbol {
    pub owner: SymbolId,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct CastSymbol {
    /// Mangled from `(implicit|explicit, parameter type, return type)`.
    pub name: String,
    pub implicit: bool,
    pub param: SymbolId,
    pub return_type: Option<Type>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub enum OperatorKind {
    Binary {
        left: SymbolId,
        op: BinaryOp,
        right: SymbolId,
    },
    Unary {
        operand: SymbolId,
        op: UnaryOp,
        prefix: bool,
    },
}

#[derive(Debug, Clone)]
pub struct OperatorSymbol {
    /// Mangled from the operand/operation/return tuple.
    pub name: String,
    pub kind: OperatorKind,
    pub return_type: Option<Type>,
    /// Body scope; built-in operators have none.
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub struct EntrySymbol {
    pub params: Vec<SymbolId>,
    pub scope: ScopeId,
}

/// A named container interposed in a per-file import table so qualified
/// names like `A.foo` resolve against a wildcard- or aggregate-imported
/// set.
#[derive(Debug, Clone)]
pub struct ImportGroupSymbol {
    pub name: String,
    pub table: IndexMap<String, SymbolId>,
}

#[derive(Debug, Clone)]
pub enum Symbol {
    Module(ModuleSymbol),
    Type(TypeSymbol),
    Alias(AliasSymbol),
    Field(FieldSymbol),
    Const(ConstSymbol),
    Def(DefSymbol),
    Var(VarSymbol),
    Parameter(ParameterSymbol),
    Function(FunctionSymbol),
    ExternalFunction(ExternalFunctionSymbol),
    Constructor(ConstructorSymbol),
    Destructor(DestructorSymbol),
    StringFunction(StringFunctionSymbol),
    Cast(CastSymbol),
    Operator(OperatorSymbol),
    Entry(EntrySymbol),
    ImportGroup(ImportGroupSymbol),
}

impl Symbol {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Symbol::Module(s) => &s.name,
            Symbol::Type(s) => &s.name,
            Symbol::Alias(s) => &s.name,
            Symbol::Field(s) => &s.name,
            Symbol::Const(s) => &s.name,
            Symbol::Def(s) => &s.name,
            Symbol::Var(s) => &s.name,
            Symbol::Parameter(s) => &s.name,
            Symbol::Function(s) => &s.name,
            Symbol::ExternalFunction(s) => &s.name,
            Symbol::Constructor(_) => "$constructor",
            Symbol::Destructor(_) => "$destructor",
            Symbol::StringFunction(_) => "$string",
            Symbol::Cast(s) => &s.name,
            Symbol::Operator(s) => &s.name,
            Symbol::Entry(_) => "$entry",
            Symbol::ImportGroup(s) => &s.name,
        }
    }

    /// Human-readable category, with its article, for diagnostics like
    /// "a function with that name already exists".
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Symbol::Module(_) => "a module",
            Symbol::Type(_) => "a type",
            Symbol::Alias(_) => "an alias",
            Symbol::Field(_) => "a field",
            Symbol::Const(_) => "a constant",
            Symbol::Def(_) => "a type alias",
            Symbol::Var(_) => "a variable",
            Symbol::Parameter(_) => "a parameter",
            Symbol::Function(_) => "a function",
            Symbol::ExternalFunction(_) => "an external function",
            Symbol::Constructor(_) => "a constructor",
            Symbol::Destructor(_) => "a destructor",
            Symbol::StringFunction(_) => "a string function",
            Symbol::Cast(_) => "a cast overload",
            Symbol::Operator(_) => "an operator overload",
            Symbol::Entry(_) => "an entry point",
            Symbol::ImportGroup(_) => "an import grouping",
        }
    }

    /// The evaluated type of this symbol, when it has one.
    #[must_use]
    pub fn evaluated_type(&self) -> Option<&Type> {
        match self {
            Symbol::Field(s) => s.ty.as_ref(),
            Symbol::Const(s) => s.ty.as_ref(),
            Symbol::Def(s) => s.ty.as_ref(),
            Symbol::Var(s) => s.ty.as_ref(),
            Symbol::Parameter(s) => s.ty.as_ref(),
            _ => None,
        }
    }

    /// True for compile-time-evaluable symbols: constants and type
    /// aliases.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Symbol::Const(_) | Symbol::Def(_))
    }

    /// True if the symbol is addressable without an instance.
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            Symbol::Field(s) => s.is_static,
            Symbol::Var(_) | Symbol::Parameter(_) => false,
            Symbol::Constructor(_) | Symbol::Destructor(_) | Symbol::StringFunction(_) => false,
            _ => true,
        }
    }
}

/// Arena storage for all symbols of one analysis.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[must_use]
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Follow alias redirections to the symbol they name.
    ///
    /// Targets are fixed at insertion time, so chains are short and
    /// acyclic; the walk is bounded regardless.
    #[must_use]
    pub fn chase_alias(&self, mut id: SymbolId) -> SymbolId {
        for _ in 0..8 {
            match self.get(id) {
                Symbol::Alias(alias) => id = alias.target,
                _ => return id,
            }
        }
        id
    }
}
