//! Pass B signature completion.
//!
//! After imports are resolved, Pass B walks each file's collected tree:
//! field/const/def symbols get their evaluated types, function-like
//! containers get parameter and return types plus a synthesized `this`
//! where the form is instance-bound, and every function-like symbol is
//! registered against its scope with duplicate-signature detection.

use smallvec::SmallVec;
use tracing::{debug, trace};

use quill_ast::{Ast, Param, StmtKind, TypeExprId};
use quill_common::{Span, codes};
use quill_sema::{
    AnalysisContext, CastSymbol, ConstructorSymbol, DestructorSymbol, EntrySymbol,
    ExternalFunctionSymbol, FunctionSymbol, OperatorKind, OperatorSymbol, ParameterSymbol, ScopeId,
    StringFunctionSymbol, Symbol, SymbolId, Type, TypeSymbol, TypeSymbolKind, binary_operator_name,
    cast_name, operator_owner, unary_operator_name,
};

use crate::collected::{CollectedFile, CollectedStmt, FunctionLikeKind};
use crate::collector::Collector;
use crate::error::{CollectError, CollectResult};
use crate::type_eval::resolve_type;

/// Two function-like symbols match when their parameter counts agree and
/// every positional pair of parameter types is structurally equal (both
/// missing counts as equal). Variadic-ness, default values, and return
/// types are not part of the signature.
#[must_use]
pub fn signature_matches(ctx: &AnalysisContext, a: SymbolId, b: SymbolId) -> bool {
    let pa = params_of(ctx, a);
    let pb = params_of(ctx, b);
    if pa.len() != pb.len() {
        return false;
    }
    pa.iter().zip(pb.iter()).all(|(&x, &y)| {
        match (
            ctx.symbol(x).evaluated_type(),
            ctx.symbol(y).evaluated_type(),
        ) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    })
}

/// The ordered parameter list of a function-like symbol.
#[must_use]
pub fn params_of(ctx: &AnalysisContext, id: SymbolId) -> &[SymbolId] {
    match ctx.symbol(id) {
        Symbol::Function(f) => &f.params,
        Symbol::ExternalFunction(f) => &f.params,
        Symbol::Constructor(c) => &c.params,
        Symbol::Entry(e) => &e.params,
        _ => &[],
    }
}

/// The overload list of a function-like symbol.
#[must_use]
pub fn overloads_of(ctx: &AnalysisContext, id: SymbolId) -> &[SymbolId] {
    match ctx.symbol(id) {
        Symbol::Function(f) => &f.overloads,
        Symbol::ExternalFunction(f) => &f.overloads,
        Symbol::Constructor(c) => &c.overloads,
        _ => &[],
    }
}

impl Collector<'_> {
    /// Run Pass B over one file. Must run after Pass A has run for all
    /// files.
    pub fn complete_file(&mut self, ast: &Ast, file: &mut CollectedFile) {
        self.file = ast.path.clone();
        debug!(file = %ast.path, "collector pass B");

        for &scope in &file.module_scopes {
            self.scope_stack.push(scope);
        }
        self.resolve_imports(ast, file);

        let mut stmts = std::mem::take(&mut file.stmts);
        for stmt in &mut stmts {
            let scope_depth = self.scope_stack.len();
            let type_depth = self.type_stack.len();
            if let Err(error) = self.complete_stmt(ast, file, stmt) {
                self.record(error);
                self.unwind_to(scope_depth, type_depth);
            }
        }
        file.stmts = stmts;

        let balanced =
            self.scope_stack.len() == 1 + file.module_scopes.len() && self.type_stack.is_empty();
        self.scope_stack.truncate(1);
        self.type_stack.clear();
        if !balanced {
            self.record(CollectError::new(
                codes::INTERNAL,
                format!("scope stack unbalanced after completing '{}'", ast.path),
            ));
        }
    }

    fn complete_stmt(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        node: &mut CollectedStmt,
    ) -> CollectResult<()> {
        match node {
            CollectedStmt::Module { scope, body, .. } => {
                self.scope_stack.push(*scope);
                for child in body {
                    let scope_depth = self.scope_stack.len();
                    let type_depth = self.type_stack.len();
                    if let Err(error) = self.complete_stmt(ast, file, child) {
                        self.record(error);
                        self.unwind_to(scope_depth, type_depth);
                    }
                }
                self.scope_stack.pop();
                Ok(())
            }
            CollectedStmt::Struct {
                symbol, members, ..
            } => {
                let symbol = *symbol;
                let scope = match self.ctx.symbol(symbol) {
                    Symbol::Type(ts) => ts.scope().expect("struct symbols own a scope"),
                    _ => unreachable!("collected struct nodes hold type symbols"),
                };
                self.scope_stack.push(scope);
                self.type_stack.push(symbol);
                for member in members {
                    let scope_depth = self.scope_stack.len();
                    let type_depth = self.type_stack.len();
                    if let Err(error) = self.complete_stmt(ast, file, member) {
                        self.record(error);
                        self.unwind_to(scope_depth, type_depth);
                    }
                }
                self.type_stack.pop();
                self.scope_stack.pop();
                Ok(())
            }
            CollectedStmt::Field { symbol, ast: stmt } => {
                let ty = match &ast.stmt(*stmt).kind {
                    StmtKind::Field { ty, .. } => *ty,
                    _ => None,
                };
                if let Some(ty) = ty {
                    let resolved = self.try_resolve_type(ast, file, ty);
                    if let Symbol::Field(field) = self.ctx.symbol_mut(*symbol) {
                        field.ty = resolved;
                    }
                }
                Ok(())
            }
            CollectedStmt::Const { symbol, ast: stmt } => {
                let ty = match &ast.stmt(*stmt).kind {
                    StmtKind::Const { ty, .. } => *ty,
                    StmtKind::Field { ty, .. } => *ty,
                    _ => None,
                };
                if let Some(ty) = ty {
                    let resolved = self.try_resolve_type(ast, file, ty);
                    if let Symbol::Const(constant) = self.ctx.symbol_mut(*symbol) {
                        constant.ty = resolved;
                    }
                }
                Ok(())
            }
            CollectedStmt::Def { symbol, ast: stmt } => {
                let ty = match &ast.stmt(*stmt).kind {
                    StmtKind::Define { ty, .. } => *ty,
                    _ => return Ok(()),
                };
                let resolved = self.try_resolve_type(ast, file, ty);
                if let Symbol::Def(def) = self.ctx.symbol_mut(*symbol) {
                    def.ty = resolved;
                }
                Ok(())
            }
            CollectedStmt::FunctionLike {
                kind,
                symbol,
                scope,
                ast: stmt,
                body,
            } => {
                // Parameter and return types resolve inside the body
                // scope (where type parameters live); the symbol itself
                // registers in the enclosing scope.
                let enclosing = self.current_scope();
                self.scope_stack.push(*scope);
                let completed =
                    self.complete_function_like(ast, file, *kind, enclosing, *scope, *stmt)?;
                *symbol = Some(completed);

                for child in body {
                    let scope_depth = self.scope_stack.len();
                    let type_depth = self.type_stack.len();
                    if let Err(error) = self.complete_stmt(ast, file, child) {
                        self.record(error);
                        self.unwind_to(scope_depth, type_depth);
                    }
                }
                self.scope_stack.pop();
                Ok(())
            }
            CollectedStmt::ExternalFunction { symbol, ast: stmt } => {
                *symbol = Some(self.complete_external(ast, file, *stmt)?);
                Ok(())
            }
            CollectedStmt::Block { scope, body } => {
                self.scope_stack.push(*scope);
                for child in body {
                    let scope_depth = self.scope_stack.len();
                    let type_depth = self.type_stack.len();
                    if let Err(error) = self.complete_stmt(ast, file, child) {
                        self.record(error);
                        self.unwind_to(scope_depth, type_depth);
                    }
                }
                self.scope_stack.pop();
                Ok(())
            }
            CollectedStmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.complete_stmt(ast, file, then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.complete_stmt(ast, file, else_branch)?;
                }
                Ok(())
            }
            CollectedStmt::Var { .. }
            | CollectedStmt::Expression { .. }
            | CollectedStmt::Return { .. } => Ok(()),
        }
    }

    /// Resolve a syntactic type, converting failure into a recorded
    /// diagnostic; the unresolved leaf does not abort the declaration.
    fn try_resolve_type(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        ty: TypeExprId,
    ) -> Option<Type> {
        let scope = self.current_scope();
        match resolve_type(self.ctx, scope, &file.import_table, ast, ty) {
            Ok(resolved) => Some(resolved),
            Err(error) => {
                self.record(error);
                None
            }
        }
    }

    fn complete_function_like(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        kind: FunctionLikeKind,
        enclosing: ScopeId,
        body_scope: ScopeId,
        stmt: quill_ast::StmtId,
    ) -> CollectResult<SymbolId> {
        let node = ast.stmt(stmt);
        let span = node.span;
        trace!(?kind, "completing function-like declaration");
        match (&node.kind, kind) {
            (StmtKind::Entry { params, .. }, FunctionLikeKind::Entry) => {
                self.complete_entry(ast, file, enclosing, body_scope, params, span)
            }
            (
                StmtKind::Function {
                    name,
                    type_params,
                    params,
                    return_type,
                    ..
                },
                FunctionLikeKind::Function,
            ) => {
                let mut type_param_ids = Vec::with_capacity(type_params.len());
                for tp in type_params {
                    let type_id = self.ctx.alloc_struct_type_id();
                    let id = self
                        .ctx
                        .declare(
                            body_scope,
                            &tp.name,
                            Symbol::Type(TypeSymbol {
                                name: tp.name.clone(),
                                type_id,
                                kind: TypeSymbolKind::TypeParameter,
                            }),
                        )
                        .map_err(|existing| {
                            CollectError::new(
                                codes::DUPLICATE_DECLARATION,
                                format!(
                                    "cannot declare type parameter '{}' because {} with that name already exists",
                                    tp.name,
                                    self.ctx.symbol(existing).kind_label()
                                ),
                            )
                            .with_span(tp.span)
                        })?;
                    type_param_ids.push(id);
                }

                let param_ids = self.complete_params(ast, file, body_scope, params, 0)?;
                let return_type = match return_type {
                    Some(ret) => self.try_resolve_type(ast, file, *ret),
                    None => None,
                };
                let id = self.ctx.symbols.alloc(Symbol::Function(FunctionSymbol {
                    name: name.name.clone(),
                    type_params: type_param_ids,
                    params: param_ids,
                    return_type,
                    scope: body_scope,
                    overloads: SmallVec::new(),
                }));
                self.register_overload(enclosing, &name.name, id, name.span, "Function")?;
                Ok(id)
            }
            (StmtKind::Constructor { params, .. }, FunctionLikeKind::Constructor) => {
                let owner = *self.type_stack.last().expect("constructors live in structs");
                let this = self.synthesize_this(owner, body_scope, span)?;
                let mut param_ids = vec![this];
                param_ids.extend(self.complete_params(ast, file, body_scope, params, 1)?);
                let id = self.ctx.symbols.alloc(Symbol::Constructor(ConstructorSymbol {
                    owner,
                    params: param_ids,
                    scope: body_scope,
                    overloads: SmallVec::new(),
                }));
                self.register_overload(enclosing, "$constructor", id, span, "Constructor")?;
                Ok(id)
            }
            (StmtKind::Destructor { .. }, FunctionLikeKind::Destructor) => {
                let owner = *self.type_stack.last().expect("destructors live in structs");
                let scope = enclosing;
                if self.ctx.scopes.lookup_local(scope, "$destructor").is_some() {
                    return Err(CollectError::new(
                        codes::DUPLICATE_DECLARATION,
                        "a destructor has already been declared for this type",
                    )
                    .with_span(span));
                }
                self.synthesize_this(owner, body_scope, span)?;
                let id = self.ctx.symbols.alloc(Symbol::Destructor(DestructorSymbol {
                    owner,
                    scope: body_scope,
                }));
                self.ctx
                    .insert(scope, "$destructor", id)
                    .expect("destructor uniqueness was just checked");
                Ok(id)
            }
            (StmtKind::StringFunction { .. }, FunctionLikeKind::StringFunction) => {
                let owner = *self.type_stack.last().expect("string functions live in structs");
                let scope = enclosing;
                if self.ctx.scopes.lookup_local(scope, "$string").is_some() {
                    return Err(CollectError::new(
                        codes::DUPLICATE_DECLARATION,
                        "a string function has already been declared for this type",
                    )
                    .with_span(span));
                }
                self.synthesize_this(owner, body_scope, span)?;
                let id = self
                    .ctx
                    .symbols
                    .alloc(Symbol::StringFunction(StringFunctionSymbol {
                        owner,
                        scope: body_scope,
                    }));
                self.ctx
                    .insert(scope, "$string", id)
                    .expect("string function uniqueness was just checked");
                Ok(id)
            }
            (
                StmtKind::Cast {
                    implicit,
                    param,
                    return_type,
                    ..
                },
                FunctionLikeKind::Cast,
            ) => self.complete_cast(
                ast,
                file,
                enclosing,
                body_scope,
                *implicit,
                param,
                *return_type,
                span,
            ),
            (
                StmtKind::BinaryOperator {
                    left,
                    op,
                    right,
                    return_type,
                    ..
                },
                FunctionLikeKind::Operator,
            ) => {
                let left_id = self.complete_operand(ast, file, body_scope, left, 0)?;
                let right_id = self.complete_operand(ast, file, body_scope, right, 1)?;
                let return_type = self
                    .try_resolve_type(ast, file, *return_type)
                    .ok_or_else(|| {
                        CollectError::new(
                            codes::PARAMETER_SHAPE,
                            "an operator overload requires a return type",
                        )
                        .with_span(span)
                    })?;

                let left_ty = self
                    .ctx
                    .symbol(left_id)
                    .evaluated_type()
                    .expect("operands are typed")
                    .clone();
                let right_ty = self
                    .ctx
                    .symbol(right_id)
                    .evaluated_type()
                    .expect("operands are typed")
                    .clone();
                let name =
                    binary_operator_name(&self.ctx.symbols, &left_ty, *op, &right_ty, &return_type);
                let id = self.ctx.symbols.alloc(Symbol::Operator(OperatorSymbol {
                    name: name.clone(),
                    kind: OperatorKind::Binary {
                        left: left_id,
                        op: *op,
                        right: right_id,
                    },
                    return_type: Some(return_type),
                    scope: Some(body_scope),
                }));
                self.register_operator(enclosing, &name, id, &left_ty, span)?;
                Ok(id)
            }
            (
                StmtKind::UnaryOperator {
                    operand,
                    op,
                    prefix,
                    return_type,
                    ..
                },
                FunctionLikeKind::Operator,
            ) => {
                let operand_id = self.complete_operand(ast, file, body_scope, operand, 0)?;
                let return_type = self
                    .try_resolve_type(ast, file, *return_type)
                    .ok_or_else(|| {
                        CollectError::new(
                            codes::PARAMETER_SHAPE,
                            "an operator overload requires a return type",
                        )
                        .with_span(span)
                    })?;
                let operand_ty = self
                    .ctx
                    .symbol(operand_id)
                    .evaluated_type()
                    .expect("operands are typed")
                    .clone();
                let name = unary_operator_name(
                    &self.ctx.symbols,
                    *op,
                    *prefix,
                    &operand_ty,
                    &return_type,
                );
                let id = self.ctx.symbols.alloc(Symbol::Operator(OperatorSymbol {
                    name: name.clone(),
                    kind: OperatorKind::Unary {
                        operand: operand_id,
                        op: *op,
                        prefix: *prefix,
                    },
                    return_type: Some(return_type),
                    scope: Some(body_scope),
                }));
                self.register_operator(enclosing, &name, id, &operand_ty, span)?;
                Ok(id)
            }
            _ => Err(CollectError::new(
                codes::INTERNAL,
                "collected container does not match its declaration",
            )),
        }
    }

    fn complete_entry(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        enclosing: ScopeId,
        body_scope: ScopeId,
        params: &[Param],
        span: Span,
    ) -> CollectResult<SymbolId> {
        if self.ctx.entry.is_some() {
            return Err(CollectError::new(
                codes::DUPLICATE_DECLARATION,
                "an entry point has already been declared",
            )
            .with_span(span));
        }
        let param_ids = self.complete_params(ast, file, body_scope, params, 0)?;
        let id = self.ctx.symbols.alloc(Symbol::Entry(EntrySymbol {
            params: param_ids,
            scope: body_scope,
        }));
        self.ctx.insert(enclosing, "$entry", id).map_err(|_| {
            CollectError::new(
                codes::DUPLICATE_DECLARATION,
                "an entry point has already been declared",
            )
            .with_span(span)
        })?;
        self.ctx.entry = Some(id);
        Ok(id)
    }

    fn complete_external(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        stmt: quill_ast::StmtId,
    ) -> CollectResult<SymbolId> {
        let node = ast.stmt(stmt);
        let StmtKind::ExternalFunction {
            name,
            params,
            return_type,
            attributes,
        } = &node.kind
        else {
            return Err(CollectError::new(
                codes::INTERNAL,
                "collected container does not match its declaration",
            ));
        };
        // External functions have no body scope; their parameter symbols
        // are reachable only through the symbol itself.
        let mut param_ids = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let ty = self.check_param_shape(ast, file, params, index, param)?;
            let id = self.ctx.symbols.alloc(Symbol::Parameter(ParameterSymbol {
                name: param.name.name.clone(),
                mutable: param.mutable,
                ty,
                default: param.default,
                variadic: param.variadic,
                index: index as u32,
            }));
            param_ids.push(id);
        }
        let return_type = match return_type {
            Some(ret) => self.try_resolve_type(ast, file, *ret),
            None => None,
        };
        let id = self
            .ctx
            .symbols
            .alloc(Symbol::ExternalFunction(ExternalFunctionSymbol {
                name: name.name.clone(),
                params: param_ids,
                return_type,
                attributes: attributes.iter().cloned().collect(),
                overloads: SmallVec::new(),
            }));
        let scope = self.current_scope();
        self.register_overload(scope, &name.name, id, name.span, "External function")?;
        Ok(id)
    }

    /// Walk a parameter list left to right, enforcing shape rules and
    /// registering the symbols in the body scope.
    fn complete_params(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        body_scope: ScopeId,
        params: &[Param],
        index_base: u32,
    ) -> CollectResult<Vec<SymbolId>> {
        let mut ids = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let ty = self.check_param_shape(ast, file, params, index, param)?;
            let symbol = Symbol::Parameter(ParameterSymbol {
                name: param.name.name.clone(),
                mutable: param.mutable,
                ty,
                default: param.default,
                variadic: param.variadic,
                index: index_base + index as u32,
            });
            let id = self
                .ctx
                .declare(body_scope, &param.name.name, symbol)
                .map_err(|existing| {
                    CollectError::new(
                        codes::DUPLICATE_DECLARATION,
                        format!(
                            "cannot declare parameter '{}' because {} with that name already exists",
                            param.name.name,
                            self.ctx.symbol(existing).kind_label()
                        ),
                    )
                    .with_span(param.name.span)
                })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Shape rules: a variadic parameter must be last and of array type;
    /// after the first defaulted parameter, every later parameter must
    /// also carry a default.
    fn check_param_shape(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        params: &[Param],
        index: usize,
        param: &Param,
    ) -> CollectResult<Option<Type>> {
        if param.variadic && index + 1 != params.len() {
            return Err(CollectError::new(
                codes::PARAMETER_SHAPE,
                format!(
                    "variadic parameter '{}' must be the last parameter",
                    param.name.name
                ),
            )
            .with_span(param.name.span));
        }
        if param.default.is_none()
            && params[..index].iter().any(|p| p.default.is_some())
        {
            return Err(CollectError::new(
                codes::PARAMETER_SHAPE,
                format!(
                    "parameter '{}' must have a default value because an earlier parameter does",
                    param.name.name
                ),
            )
            .with_span(param.name.span));
        }
        let ty = match param.ty {
            Some(ty) => self.try_resolve_type(ast, file, ty),
            None => None,
        };
        if param.variadic && !matches!(ty, Some(Type::Array(_))) {
            return Err(CollectError::new(
                codes::PARAMETER_SHAPE,
                format!(
                    "variadic parameter '{}' must have an array type",
                    param.name.name
                ),
            )
            .with_span(param.name.span));
        }
        Ok(ty)
    }

    /// Synthesize the `this` parameter of an instance-bound form.
    fn synthesize_this(
        &mut self,
        owner: SymbolId,
        body_scope: ScopeId,
        span: Span,
    ) -> CollectResult<SymbolId> {
        let immutable = match self.ctx.symbol(owner) {
            Symbol::Type(ts) => ts.struct_data().is_none_or(|d| !d.mutable),
            _ => true,
        };
        let this_ty = Type::reference(Type::Base(owner), immutable);
        self.ctx
            .declare(
                body_scope,
                "this",
                Symbol::Parameter(ParameterSymbol {
                    name: "this".to_string(),
                    mutable: false,
                    ty: Some(this_ty),
                    default: None,
                    variadic: false,
                    index: 0,
                }),
            )
            .map_err(|_| {
                CollectError::new(codes::INTERNAL, "'this' is already bound in a fresh body scope")
                    .with_span(span)
            })
    }

    fn complete_cast(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        enclosing: ScopeId,
        body_scope: ScopeId,
        implicit: bool,
        param: &Param,
        return_type: TypeExprId,
        span: Span,
    ) -> CollectResult<SymbolId> {
        if param.mutable || param.variadic {
            return Err(CollectError::new(
                codes::PARAMETER_SHAPE,
                "a cast parameter must be non-mutable and non-variadic",
            )
            .with_span(param.name.span));
        }
        let param_ty = param
            .ty
            .and_then(|ty| self.try_resolve_type(ast, file, ty))
            .ok_or_else(|| {
                CollectError::new(codes::PARAMETER_SHAPE, "a cast parameter must be typed")
                    .with_span(param.name.span)
            })?;
        let return_ty = self
            .try_resolve_type(ast, file, return_type)
            .ok_or_else(|| {
                CollectError::new(codes::PARAMETER_SHAPE, "a cast requires a return type")
                    .with_span(span)
            })?;

        let param_id = self
            .ctx
            .declare(
                body_scope,
                &param.name.name,
                Symbol::Parameter(ParameterSymbol {
                    name: param.name.name.clone(),
                    mutable: false,
                    ty: Some(param_ty.clone()),
                    default: None,
                    variadic: false,
                    index: 0,
                }),
            )
            .map_err(|existing| {
                CollectError::new(
                    codes::DUPLICATE_DECLARATION,
                    format!(
                        "cannot declare parameter '{}' because {} with that name already exists",
                        param.name.name,
                        self.ctx.symbol(existing).kind_label()
                    ),
                )
                .with_span(param.name.span)
            })?;

        let name = cast_name(&self.ctx.symbols, implicit, &param_ty, &return_ty);
        let id = self.ctx.symbols.alloc(Symbol::Cast(CastSymbol {
            name: name.clone(),
            implicit,
            param: param_id,
            return_type: Some(return_ty),
            scope: body_scope,
        }));
        self.ctx.insert(enclosing, &name, id).map_err(|_| {
            CollectError::new(
                codes::SIGNATURE_MATCHES_EXISTING,
                "Cast signature matches existing cast signature",
            )
            .with_span(span)
        })?;
        Ok(id)
    }

    /// An operator operand must be typed; it is registered in the body
    /// scope like any parameter.
    fn complete_operand(
        &mut self,
        ast: &Ast,
        file: &CollectedFile,
        body_scope: ScopeId,
        param: &Param,
        index: u32,
    ) -> CollectResult<SymbolId> {
        let ty = param
            .ty
            .and_then(|ty| self.try_resolve_type(ast, file, ty))
            .ok_or_else(|| {
                CollectError::new(
                    codes::PARAMETER_SHAPE,
                    format!("operator operand '{}' must be typed", param.name.name),
                )
                .with_span(param.name.span)
            })?;
        self.ctx
            .declare(
                body_scope,
                &param.name.name,
                Symbol::Parameter(ParameterSymbol {
                    name: param.name.name.clone(),
                    mutable: false,
                    ty: Some(ty),
                    default: None,
                    variadic: false,
                    index,
                }),
            )
            .map_err(|existing| {
                CollectError::new(
                    codes::DUPLICATE_DECLARATION,
                    format!(
                        "cannot declare parameter '{}' because {} with that name already exists",
                        param.name.name,
                        self.ctx.symbol(existing).kind_label()
                    ),
                )
                .with_span(param.name.span)
            })
    }

    /// Insert an operator into the current scope under its mangled name
    /// and append it to an operator table: the enclosing struct's when
    /// the declaration is lexically inside one, otherwise the table of
    /// the left (or sole) operand's root type.
    fn register_operator(
        &mut self,
        enclosing: ScopeId,
        name: &str,
        id: SymbolId,
        operand_ty: &Type,
        span: Span,
    ) -> CollectResult<()> {
        self.ctx.insert(enclosing, name, id).map_err(|_| {
            CollectError::new(
                codes::SIGNATURE_MATCHES_EXISTING,
                "Operator signature matches existing operator signature",
            )
            .with_span(span)
        })?;
        let owner = match self.type_stack.last() {
            Some(&enclosing_type) => enclosing_type,
            None => operator_owner(self.ctx, operand_ty).ok_or_else(|| {
                CollectError::new(
                    codes::INVALID_OPERATOR_DECLARATION,
                    format!(
                        "cannot declare an operator for type '{}'",
                        operand_ty.display(&self.ctx.symbols)
                    ),
                )
                .with_span(span)
            })?,
        };
        if let Symbol::Type(ts) = self.ctx.symbol_mut(owner) {
            ts.push_operator(id);
        }
        Ok(())
    }

    /// Register a function-like symbol against its scope: first of a name
    /// inserts, later ones join the overload list unless their signature
    /// matches an existing overload.
    fn register_overload(
        &mut self,
        scope: ScopeId,
        name: &str,
        new_id: SymbolId,
        span: Span,
        kind_word: &str,
    ) -> CollectResult<()> {
        let Some(existing) = self.ctx.scopes.lookup_local(scope, name) else {
            self.ctx.insert(scope, name, new_id).map_err(|other| {
                CollectError::new(
                    codes::DUPLICATE_DECLARATION,
                    format!(
                        "cannot declare '{}' because {} with that name already exists",
                        name,
                        self.ctx.symbol(other).kind_label()
                    ),
                )
                .with_span(span)
            })?;
            return Ok(());
        };

        let compatible = matches!(
            (self.ctx.symbol(existing), self.ctx.symbol(new_id)),
            (Symbol::Function(_), Symbol::Function(_))
                | (Symbol::ExternalFunction(_), Symbol::ExternalFunction(_))
                | (Symbol::Constructor(_), Symbol::Constructor(_))
        );
        if !compatible {
            return Err(CollectError::new(
                codes::DUPLICATE_DECLARATION,
                format!(
                    "cannot declare '{}' because {} with that name already exists",
                    name,
                    self.ctx.symbol(existing).kind_label()
                ),
            )
            .with_span(span));
        }

        let mut candidates = vec![existing];
        candidates.extend_from_slice(overloads_of(self.ctx, existing));
        for candidate in candidates {
            if signature_matches(self.ctx, new_id, candidate) {
                return Err(CollectError::new(
                    codes::SIGNATURE_MATCHES_EXISTING,
                    format!("{kind_word} signature matches existing {} signature", {
                        let mut w = kind_word.to_string();
                        w.make_ascii_lowercase();
                        w
                    }),
                )
                .with_span(span));
            }
        }

        match self.ctx.symbol_mut(existing) {
            Symbol::Function(f) => f.overloads.push(new_id),
            Symbol::ExternalFunction(f) => f.overloads.push(new_id),
            Symbol::Constructor(c) => c.overloads.push(new_id),
            _ => unreachable!("compatibility was checked above"),
        }
        Ok(())
    }
}
