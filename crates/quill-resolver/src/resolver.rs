//! The resolver driver and statement rules.
//!
//! The resolver walks each file's collected tree after Pass B has run
//! for all files, producing resolved statements. It maintains three
//! stacks: scopes, enclosing types (for `this` and static-vs-instance
//! decisions), and enclosing function-like symbols. A location is a
//! static context iff the function stack is empty or its topmost
//! function is static.

use indexmap::IndexMap;
use tracing::{debug, trace};

use quill_ast::{Ast, StmtKind};
use quill_common::{DiagnosticList, codes};
use quill_sema::{AnalysisContext, ScopeId, Symbol, SymbolId, Type};
use quill_collector::{CollectedFile, CollectedStmt, FunctionLikeKind, resolve_type};

use crate::error::{ResolveError, ResolveResult};
use crate::resolved::{ResolvedFile, ResolvedStmt};

pub struct Resolver<'ctx> {
    pub(crate) ctx: &'ctx mut AnalysisContext,
    pub diagnostics: DiagnosticList,
    pub(crate) scope_stack: Vec<ScopeId>,
    pub(crate) type_stack: Vec<SymbolId>,
    pub(crate) function_stack: Vec<SymbolId>,
    pub(crate) imports: IndexMap<String, SymbolId>,
    pub(crate) file: String,
}

impl<'ctx> Resolver<'ctx> {
    #[must_use]
    pub fn new(ctx: &'ctx mut AnalysisContext) -> Self {
        let global = ctx.global_scope;
        Self {
            ctx,
            diagnostics: DiagnosticList::new(),
            scope_stack: vec![global],
            type_stack: Vec::new(),
            function_stack: Vec::new(),
            imports: IndexMap::new(),
            file: String::new(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &AnalysisContext {
        self.ctx
    }

    pub(crate) fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("scope stack is never empty")
    }

    /// True iff no instance of an enclosing type is in scope.
    pub(crate) fn static_context(&self) -> bool {
        match self.function_stack.last() {
            None => true,
            Some(&function) => self.ctx.symbol(function).is_static(),
        }
    }

    /// The enclosing constructor's owner type, when resolution is inside
    /// a constructor body.
    pub(crate) fn constructor_owner(&self) -> Option<SymbolId> {
        match self.function_stack.last().map(|&f| self.ctx.symbol(f)) {
            Some(Symbol::Constructor(c)) => Some(c.owner),
            _ => None,
        }
    }

    pub(crate) fn record(&mut self, error: ResolveError) {
        self.diagnostics
            .push(error.into_diagnostic(&self.file, self.ctx.options.working_dir.as_deref()));
    }

    pub(crate) fn unwind_to(&mut self, scopes: usize, types: usize, functions: usize) {
        self.scope_stack.truncate(scopes);
        self.type_stack.truncate(types);
        self.function_stack.truncate(functions);
    }

    /// Evaluate a syntactic type against the current scope and the file's
    /// import snapshot.
    pub(crate) fn eval_type(
        &self,
        ast: &Ast,
        ty: quill_ast::TypeExprId,
    ) -> ResolveResult<Type> {
        resolve_type(self.ctx, self.current_scope(), &self.imports, ast, ty)
            .map_err(ResolveError::from)
    }

    /// Resolve one file's collected tree. Runs after Pass B has completed
    /// for all files.
    pub fn resolve_file(&mut self, ast: &Ast, file: &CollectedFile) -> ResolvedFile {
        self.file = file.path.clone();
        self.imports = file.import_table.clone();
        debug!(file = %file.path, imports = self.imports.len(), "resolver");

        for &scope in &file.module_scopes {
            self.scope_stack.push(scope);
        }

        let mut stmts = Vec::with_capacity(file.stmts.len());
        for stmt in &file.stmts {
            stmts.push(self.resolve_guarded(ast, stmt));
        }

        let balanced = self.scope_stack.len() == 1 + file.module_scopes.len()
            && self.type_stack.is_empty()
            && self.function_stack.is_empty();
        self.scope_stack.truncate(1);
        self.type_stack.clear();
        self.function_stack.clear();
        if !balanced {
            self.record(ResolveError::new(
                codes::INTERNAL,
                format!("scope stack unbalanced after resolving '{}'", file.path),
            ));
        }

        ResolvedFile {
            path: file.path.clone(),
            stmts,
        }
    }

    /// Resolve one statement inside a guarded region: errors become
    /// diagnostics, the stacks are restored, and an `Incomplete` node
    /// stands in for the failed statement.
    fn resolve_guarded(&mut self, ast: &Ast, stmt: &CollectedStmt) -> ResolvedStmt {
        let scopes = self.scope_stack.len();
        let types = self.type_stack.len();
        let functions = self.function_stack.len();
        match self.resolve_stmt(ast, stmt) {
            Ok(resolved) => resolved,
            Err(error) => {
                self.record(error);
                self.unwind_to(scopes, types, functions);
                ResolvedStmt::Incomplete
            }
        }
    }

    fn resolve_body(&mut self, ast: &Ast, body: &[CollectedStmt]) -> Vec<ResolvedStmt> {
        body.iter()
            .map(|stmt| self.resolve_guarded(ast, stmt))
            .collect()
    }

    pub(crate) fn resolve_stmt(
        &mut self,
        ast: &Ast,
        stmt: &CollectedStmt,
    ) -> ResolveResult<ResolvedStmt> {
        match stmt {
            CollectedStmt::Module { symbol, scope, body } => {
                self.scope_stack.push(*scope);
                let body = self.resolve_body(ast, body);
                self.scope_stack.pop();
                Ok(ResolvedStmt::Module {
                    symbol: *symbol,
                    body,
                })
            }
            CollectedStmt::Struct { symbol, members, .. } => {
                let scope = match self.ctx.symbol(*symbol) {
                    Symbol::Type(ts) => ts.scope().expect("struct symbols own a scope"),
                    _ => unreachable!("collected struct nodes hold type symbols"),
                };
                self.scope_stack.push(scope);
                self.type_stack.push(*symbol);
                let members = self.resolve_body(ast, members);
                self.type_stack.pop();
                self.scope_stack.pop();
                Ok(ResolvedStmt::Struct {
                    symbol: *symbol,
                    members,
                })
            }
            CollectedStmt::Field { symbol, ast: stmt_id } => {
                self.resolve_field(ast, *symbol, *stmt_id)
            }
            CollectedStmt::Const { symbol, ast: stmt_id } => {
                self.resolve_const(ast, *symbol, *stmt_id)
            }
            CollectedStmt::Def { symbol, .. } => {
                // The alias target was evaluated during Pass B.
                Ok(ResolvedStmt::Def { symbol: *symbol })
            }
            CollectedStmt::FunctionLike {
                kind,
                symbol,
                scope,
                body,
                ..
            } => {
                let Some(symbol) = *symbol else {
                    return Ok(ResolvedStmt::Incomplete);
                };
                trace!(?kind, "resolving function-like body");
                self.scope_stack.push(*scope);
                self.function_stack.push(symbol);
                let body = self.resolve_body(ast, body);
                self.function_stack.pop();
                self.scope_stack.pop();
                Ok(match kind {
                    FunctionLikeKind::Entry => ResolvedStmt::Entry { symbol, body },
                    FunctionLikeKind::Function => ResolvedStmt::Function { symbol, body },
                    FunctionLikeKind::Constructor => ResolvedStmt::Constructor { symbol, body },
                    FunctionLikeKind::Destructor => ResolvedStmt::Destructor { symbol, body },
                    FunctionLikeKind::StringFunction => {
                        ResolvedStmt::StringFunction { symbol, body }
                    }
                    FunctionLikeKind::Cast => ResolvedStmt::Cast { symbol, body },
                    FunctionLikeKind::Operator => ResolvedStmt::Operator { symbol, body },
                })
            }
            CollectedStmt::ExternalFunction { symbol, .. } => match *symbol {
                Some(symbol) => Ok(ResolvedStmt::External { symbol }),
                None => Ok(ResolvedStmt::Incomplete),
            },
            CollectedStmt::Var { symbol, ast: stmt_id } => {
                self.resolve_var(ast, *symbol, *stmt_id)
            }
            CollectedStmt::Block { scope, body } => {
                self.scope_stack.push(*scope);
                let body = self.resolve_body(ast, body);
                self.scope_stack.pop();
                Ok(ResolvedStmt::Block { body })
            }
            CollectedStmt::If {
                ast: stmt_id,
                then_branch,
                else_branch,
            } => {
                let condition = match &ast.stmt(*stmt_id).kind {
                    StmtKind::If { condition, .. } => *condition,
                    _ => unreachable!("collected if nodes point at if statements"),
                };
                let condition = self.resolve_expr(ast, condition)?;
                let then_branch = Box::new(self.resolve_guarded(ast, then_branch));
                let else_branch = else_branch
                    .as_ref()
                    .map(|stmt| Box::new(self.resolve_guarded(ast, stmt)));
                Ok(ResolvedStmt::If {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            CollectedStmt::Expression { ast: stmt_id } => {
                let expr = match &ast.stmt(*stmt_id).kind {
                    StmtKind::Expression(expr) => *expr,
                    _ => unreachable!("collected expression nodes point at expression statements"),
                };
                Ok(ResolvedStmt::Expression(self.resolve_expr(ast, expr)?))
            }
            CollectedStmt::Return { ast: stmt_id } => {
                let value = match &ast.stmt(*stmt_id).kind {
                    StmtKind::Return { value } => *value,
                    _ => unreachable!("collected return nodes point at return statements"),
                };
                let value = match value {
                    Some(expr) => Some(self.resolve_expr(ast, expr)?),
                    None => None,
                };
                Ok(ResolvedStmt::Return { value })
            }
        }
    }

    fn resolve_field(
        &mut self,
        ast: &Ast,
        symbol: SymbolId,
        stmt_id: quill_ast::StmtId,
    ) -> ResolveResult<ResolvedStmt> {
        let (name, mutable, is_static) = match self.ctx.symbol(symbol) {
            Symbol::Field(f) => (f.name.clone(), f.mutable, f.is_static),
            _ => unreachable!("collected field nodes hold field symbols"),
        };
        let owner = *self.type_stack.last().expect("fields live in structs");
        let owner_mutable = match self.ctx.symbol(owner) {
            Symbol::Type(ts) => ts.struct_data().is_some_and(|d| d.mutable),
            _ => false,
        };
        let span = ast.stmt(stmt_id).span;
        if mutable && !owner_mutable {
            return Err(ResolveError::new(
                codes::MUTABILITY_VIOLATION,
                format!(
                    "cannot declare field '{name}' as mutable because the parent type is immutable"
                ),
            )
            .with_span(span));
        }

        let initializer = match &ast.stmt(stmt_id).kind {
            StmtKind::Field { initializer, .. } => *initializer,
            _ => None,
        };
        let initializer = match initializer {
            Some(expr) => Some(self.resolve_expr(ast, expr)?),
            None => None,
        };

        if is_static {
            if let Symbol::Type(ts) = self.ctx.symbol_mut(owner) {
                if let Some(data) = ts.struct_data_mut() {
                    data.has_static_fields = true;
                }
            }
        }

        Ok(ResolvedStmt::Field {
            symbol,
            initializer,
        })
    }

    fn resolve_const(
        &mut self,
        ast: &Ast,
        symbol: SymbolId,
        stmt_id: quill_ast::StmtId,
    ) -> ResolveResult<ResolvedStmt> {
        let initializer = match &ast.stmt(stmt_id).kind {
            StmtKind::Const { initializer, .. } => Some(*initializer),
            StmtKind::Field { initializer, .. } => *initializer,
            _ => None,
        };
        let span = ast.stmt(stmt_id).span;
        let Some(initializer) = initializer else {
            return Err(ResolveError::new(
                codes::CONSTANCY_VIOLATION,
                "a constant requires an initializer",
            )
            .with_span(span));
        };
        let initializer = self.resolve_expr(ast, initializer)?;
        if !initializer.constant {
            return Err(ResolveError::new(
                codes::CONSTANCY_VIOLATION,
                "Constant initializer must be a compile-time constant expression",
            )
            .with_span(initializer.span.merge(span)));
        }
        if let Symbol::Const(constant) = self.ctx.symbol_mut(symbol) {
            if constant.ty.is_none() {
                constant.ty = initializer.ty.clone();
            }
        }
        Ok(ResolvedStmt::Const {
            symbol,
            initializer,
        })
    }

    fn resolve_var(
        &mut self,
        ast: &Ast,
        symbol: SymbolId,
        stmt_id: quill_ast::StmtId,
    ) -> ResolveResult<ResolvedStmt> {
        let (declared, initializer, name_span) = match &ast.stmt(stmt_id).kind {
            StmtKind::Var {
                ty,
                initializer,
                name,
                ..
            } => (*ty, *initializer, name.span),
            _ => unreachable!("collected var nodes point at var statements"),
        };

        let declared = match declared {
            Some(ty) => Some(self.eval_type(ast, ty)?),
            None => None,
        };
        let initializer = match initializer {
            Some(expr) => Some(self.resolve_expr(ast, expr)?),
            None => None,
        };

        if declared.is_none() && initializer.is_none() {
            let name = self.ctx.symbol(symbol).name().to_string();
            return Err(ResolveError::new(
                codes::TYPE_NOT_INFERRED,
                format!("the type of '{name}' cannot be inferred"),
            )
            .with_span(name_span));
        }

        let ty = match declared {
            Some(ty) => Some(ty),
            None => initializer.as_ref().and_then(|init| init.ty.clone()),
        };
        if let Symbol::Var(var) = self.ctx.symbol_mut(symbol) {
            var.ty = ty;
        }

        Ok(ResolvedStmt::Var {
            symbol,
            initializer,
        })
    }
}
