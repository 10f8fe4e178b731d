//! The analysis context.
//!
//! All state shared by the collector and resolver lives here: the symbol
//! and scope arenas, the global scope, the native type singletons, and
//! the struct type-id counter. Keeping it in an explicit context (rather
//! than process-wide statics) makes the analyzer reentrant and testable
//! without global resets.

use tracing::debug;

use quill_ast::BinaryOp;
use quill_common::{AnalyzerOptions, PointerWidth};

use crate::natives::{FIRST_STRUCT_TYPE_ID, NativeKind};
use crate::operators::binary_operator_name;
use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::{
    AliasSymbol, OperatorKind, OperatorSymbol, ParameterSymbol, Symbol, SymbolArena, SymbolId,
    TypeSymbol, TypeSymbolKind,
};
use crate::types::Type;

pub struct AnalysisContext {
    pub options: AnalyzerOptions,
    pub symbols: SymbolArena,
    pub scopes: ScopeArena,
    pub global_scope: ScopeId,
    /// The program's `$entry`, once one has been collected.
    pub entry: Option<SymbolId>,
    natives: [SymbolId; NativeKind::ALL.len()],
    next_struct_type_id: u32,
}

impl AnalysisContext {
    #[must_use]
    pub fn new(options: AnalyzerOptions) -> Self {
        let mut symbols = SymbolArena::new();
        let mut scopes = ScopeArena::new();
        let global_scope = scopes.alloc(None);

        let mut natives = [SymbolId(0); NativeKind::ALL.len()];
        for kind in NativeKind::ALL {
            let id = symbols.alloc(Symbol::Type(TypeSymbol {
                name: kind.keyword().to_string(),
                type_id: kind.type_id(),
                kind: TypeSymbolKind::Native {
                    kind,
                    operators: Vec::new(),
                },
            }));
            natives[kind.index()] = id;
            scopes
                .insert(global_scope, kind.keyword(), id)
                .expect("native keywords are unique");
        }

        let mut ctx = Self {
            options,
            symbols,
            scopes,
            global_scope,
            entry: None,
            natives,
            next_struct_type_id: FIRST_STRUCT_TYPE_ID,
        };
        ctx.seed_builtin_operators();
        ctx.register_native_aliases();
        ctx
    }

    #[must_use]
    pub fn native(&self, kind: NativeKind) -> SymbolId {
        self.natives[kind.index()]
    }

    #[must_use]
    pub fn native_type(&self, kind: NativeKind) -> Type {
        Type::Base(self.native(kind))
    }

    /// Allocate the next user-struct type id.
    pub fn alloc_struct_type_id(&mut self) -> u32 {
        let id = self.next_struct_type_id;
        self.next_struct_type_id += 1;
        id
    }

    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    #[must_use]
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        self.symbols.get_mut(id)
    }

    /// Every numeric native carries built-in `add` and `multiply`
    /// returning the operand type; `string` carries `add`. This is what
    /// makes `1 + 1` resolve without user declarations.
    fn seed_builtin_operators(&mut self) {
        for kind in NativeKind::NUMERIC {
            self.seed_binary(kind, BinaryOp::Add);
            self.seed_binary(kind, BinaryOp::Multiply);
        }
        self.seed_binary(NativeKind::String, BinaryOp::Add);
    }

    fn seed_binary(&mut self, kind: NativeKind, op: BinaryOp) {
        let operand = self.native_type(kind);
        let left = self.symbols.alloc(Symbol::Parameter(ParameterSymbol {
            name: "left".to_string(),
            mutable: false,
            ty: Some(operand.clone()),
            default: None,
            variadic: false,
            index: 0,
        }));
        let right = self.symbols.alloc(Symbol::Parameter(ParameterSymbol {
            name: "right".to_string(),
            mutable: false,
            ty: Some(operand.clone()),
            default: None,
            variadic: false,
            index: 1,
        }));
        let name = binary_operator_name(&self.symbols, &operand, op, &operand, &operand);
        let operator = self.symbols.alloc(Symbol::Operator(OperatorSymbol {
            name,
            kind: OperatorKind::Binary { left, op, right },
            return_type: Some(operand),
            scope: None,
        }));
        let native = self.native(kind);
        if let Symbol::Type(ts) = self.symbols.get_mut(native) {
            ts.push_operator(operator);
        }
    }

    /// `int`/`uint`/`float`/`fixed` alias the 32-bit natives; `nint`/
    /// `nuint` alias the pointer-width integers. All are registered in
    /// the global scope as aliased symbols.
    fn register_native_aliases(&mut self) {
        let (nint, nuint) = match self.options.pointer_width {
            PointerWidth::Bits32 => (NativeKind::Int32, NativeKind::UInt32),
            PointerWidth::Bits64 => (NativeKind::Int64, NativeKind::UInt64),
        };
        debug!(pointer_width = ?self.options.pointer_width, "registering native-width aliases");
        let aliases = [
            ("int", NativeKind::Int32),
            ("uint", NativeKind::UInt32),
            ("float", NativeKind::Float32),
            ("fixed", NativeKind::Fixed32),
            ("nint", nint),
            ("nuint", nuint),
        ];
        for (name, kind) in aliases {
            let target = self.native(kind);
            let alias = self.symbols.alloc(Symbol::Alias(AliasSymbol {
                name: name.to_string(),
                target,
            }));
            self.scopes
                .insert(self.global_scope, name, alias)
                .expect("alias names are unique in a fresh global scope");
        }
    }

    /// Scope-chain lookup with alias chasing.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes.lookup(scope, name, &self.symbols)
    }

    /// Bind `name` in `scope`, refusing native-keyword shadowing and
    /// duplicate names. On failure the existing binding is returned.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: SymbolId,
    ) -> Result<(), SymbolId> {
        if scope != self.global_scope && NativeKind::is_native_keyword(name) {
            return Err(self.lookup(self.global_scope, name).unwrap_or(symbol));
        }
        self.scopes.insert(scope, name, symbol)
    }

    /// Allocate a symbol and bind it in `scope` in one step.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: Symbol,
    ) -> Result<SymbolId, SymbolId> {
        let id = self.symbols.alloc(symbol);
        self.insert(scope, name, id).map(|()| id)
    }

    #[must_use]
    pub fn string_type(&self) -> Type {
        self.native_type(NativeKind::String)
    }

    #[must_use]
    pub fn bool_type(&self) -> Type {
        self.native_type(NativeKind::Bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{OperatorLookup, lookup_binary_operator};

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(AnalyzerOptions::default())
    }

    #[test]
    fn natives_resolve_from_the_global_scope() {
        let ctx = ctx();
        let int32 = ctx.lookup(ctx.global_scope, "int32").unwrap();
        assert_eq!(int32, ctx.native(NativeKind::Int32));
    }

    #[test]
    fn convenience_aliases_chase_to_natives() {
        let ctx = ctx();
        assert_eq!(
            ctx.lookup(ctx.global_scope, "int"),
            Some(ctx.native(NativeKind::Int32))
        );
        assert_eq!(
            ctx.lookup(ctx.global_scope, "float"),
            Some(ctx.native(NativeKind::Float32))
        );
    }

    #[test]
    fn nint_follows_pointer_width() {
        let ctx64 = ctx();
        assert_eq!(
            ctx64.lookup(ctx64.global_scope, "nint"),
            Some(ctx64.native(NativeKind::Int64))
        );

        let options = AnalyzerOptions {
            pointer_width: PointerWidth::Bits32,
            ..AnalyzerOptions::default()
        };
        let ctx32 = AnalysisContext::new(options);
        assert_eq!(
            ctx32.lookup(ctx32.global_scope, "nint"),
            Some(ctx32.native(NativeKind::Int32))
        );
    }

    #[test]
    fn builtin_addition_resolves_on_numerics() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        match lookup_binary_operator(&ctx, &int32, &int32, BinaryOp::Add) {
            OperatorLookup::Found(_) => {}
            other => panic!("expected built-in int32 add, got {other:?}"),
        }
    }

    #[test]
    fn builtin_subtraction_is_not_seeded() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        assert_eq!(
            lookup_binary_operator(&ctx, &int32, &int32, BinaryOp::Subtract),
            OperatorLookup::NotFound
        );
    }

    #[test]
    fn string_concatenation_is_seeded() {
        let ctx = ctx();
        let string = ctx.string_type();
        match lookup_binary_operator(&ctx, &string, &string, BinaryOp::Add) {
            OperatorLookup::Found(_) => {}
            other => panic!("expected string add, got {other:?}"),
        }
    }

    #[test]
    fn mixed_numeric_operands_do_not_promote() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        let int64 = ctx.native_type(NativeKind::Int64);
        assert_eq!(
            lookup_binary_operator(&ctx, &int32, &int64, BinaryOp::Add),
            OperatorLookup::NotFound
        );
    }

    #[test]
    fn native_keywords_cannot_be_shadowed() {
        let mut ctx = ctx();
        let inner = ctx.scopes.alloc(Some(ctx.global_scope));
        let result = ctx.declare(
            inner,
            "int32",
            Symbol::Var(crate::symbol::VarSymbol {
                name: "int32".to_string(),
                mutable: false,
                ty: None,
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn type_display_forms() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        let string = ctx.string_type();

        assert_eq!(int32.display(&ctx.symbols).to_string(), "int32");
        assert_eq!(
            Type::array(int32.clone()).display(&ctx.symbols).to_string(),
            "int32[]"
        );
        assert_eq!(
            Type::nullable(int32.clone())
                .display(&ctx.symbols)
                .to_string(),
            "int32?"
        );
        assert_eq!(
            Type::mutable(int32.clone()).display(&ctx.symbols).to_string(),
            "mutable int32"
        );
        assert_eq!(
            Type::reference(int32.clone(), false)
                .display(&ctx.symbols)
                .to_string(),
            "ref int32"
        );
        assert_eq!(
            Type::Tuple(vec![int32.clone(), string.clone()])
                .display(&ctx.symbols)
                .to_string(),
            "(int32, string)"
        );
        assert_eq!(
            Type::Function {
                params: vec![int32.clone(), string],
                return_type: Some(Box::new(int32)),
            }
            .display(&ctx.symbols)
            .to_string(),
            "(int32, string) => int32"
        );
    }

    #[test]
    fn nullable_matches_relaxation() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        let nullable = Type::nullable(int32.clone());

        assert!(int32.matches(&nullable));
        assert!(nullable.matches(&int32));
        assert_ne!(int32, nullable);
    }

    #[test]
    fn reference_equality_ignores_immutability() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        assert_eq!(
            Type::reference(int32.clone(), true),
            Type::reference(int32, false)
        );
    }

    #[test]
    fn mutable_does_not_double_wrap() {
        let ctx = ctx();
        let int32 = ctx.native_type(NativeKind::Int32);
        let once = Type::mutable(int32);
        let twice = Type::mutable(once.clone());
        assert_eq!(once, twice);
    }
}
