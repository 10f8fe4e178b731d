//! Collector Pass A: the declaration walk.
//!
//! Pass A runs once per file, in any order across files. It builds the
//! scope tree, inserts placeholder symbols for every declaration into the
//! enclosing scope, assigns struct layout indices, and records raw import
//! statements for Pass B. Function-like declarations get a body scope and
//! a collected body here; their symbols are completed in Pass B.
//!
//! Every declaration is visited inside a guarded region: on failure the
//! error is recorded and the scope stack is unwound to its depth at the
//! start of the declaration before the walk continues with the next
//! sibling.

use tracing::{debug, trace};

use quill_ast::{Ast, FieldMutability, Ident, StmtId, StmtKind, StructMutability};
use quill_common::{DiagnosticList, Span, codes};
use quill_sema::{
    AnalysisContext, ConstSymbol, DefSymbol, FieldSymbol, ModuleSymbol, ScopeId, StructData,
    Symbol, SymbolId, TypeSymbol, TypeSymbolKind, VarSymbol,
};

use crate::collected::{CollectedFile, CollectedStmt, FunctionLikeKind};
use crate::error::{CollectError, CollectResult};

pub struct Collector<'ctx> {
    pub(crate) ctx: &'ctx mut AnalysisContext,
    pub diagnostics: DiagnosticList,
    pub(crate) scope_stack: Vec<ScopeId>,
    pub(crate) type_stack: Vec<SymbolId>,
    pub(crate) file: String,
}

impl<'ctx> Collector<'ctx> {
    #[must_use]
    pub fn new(ctx: &'ctx mut AnalysisContext) -> Self {
        let global = ctx.global_scope;
        Self {
            ctx,
            diagnostics: DiagnosticList::new(),
            scope_stack: vec![global],
            type_stack: Vec::new(),
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

    pub(crate) fn record(&mut self, error: CollectError) {
        self.diagnostics
            .push(error.into_diagnostic(&self.file, self.ctx.options.working_dir.as_deref()));
    }

    /// Unwind the scope stack to `depth` after a failed declaration.
    pub(crate) fn unwind_to(&mut self, scope_depth: usize, type_depth: usize) {
        debug_assert!(self.scope_stack.len() >= scope_depth);
        self.scope_stack.truncate(scope_depth);
        self.type_stack.truncate(type_depth);
    }

    /// Run Pass A over one file.
    pub fn collect_file(&mut self, ast: &Ast) -> CollectedFile {
        self.file = ast.path.clone();
        debug!(file = %ast.path, "collector pass A");

        let mut file = CollectedFile {
            path: ast.path.clone(),
            module_scopes: Vec::new(),
            imports: Vec::new(),
            stmts: Vec::new(),
            import_table: indexmap::IndexMap::new(),
        };

        let Some(root) = ast.root else {
            return file;
        };
        let StmtKind::Program { module_path, stmts } = &ast.stmt(root).kind else {
            self.record(CollectError::new(
                codes::INTERNAL,
                "the root node of a file must be a program",
            ));
            return file;
        };

        match self.enter_module_path(module_path) {
            Ok(scopes) => file.module_scopes = scopes,
            Err(error) => {
                self.record(error);
                self.scope_stack.truncate(1);
                return file;
            }
        }

        let stmt_ids = stmts.clone();
        self.collect_siblings(ast, &stmt_ids, &mut file.imports, &mut file.stmts);

        let balanced =
            self.scope_stack.len() == 1 + file.module_scopes.len() && self.type_stack.is_empty();
        self.scope_stack.truncate(1);
        self.type_stack.clear();
        if !balanced {
            self.record(CollectError::new(
                codes::INTERNAL,
                format!("scope stack unbalanced after collecting '{}'", ast.path),
            ));
        }
        file
    }

    /// Collect a run of sibling declarations, each inside a guarded
    /// region.
    fn collect_siblings(
        &mut self,
        ast: &Ast,
        stmt_ids: &[StmtId],
        imports: &mut Vec<StmtId>,
        out: &mut Vec<CollectedStmt>,
    ) {
        for &stmt_id in stmt_ids {
            if let StmtKind::Import(_) = &ast.stmt(stmt_id).kind {
                imports.push(stmt_id);
                continue;
            }
            let scope_depth = self.scope_stack.len();
            let type_depth = self.type_stack.len();
            match self.collect_stmt(ast, stmt_id, imports) {
                Ok(collected) => out.push(collected),
                Err(error) => {
                    self.record(error);
                    self.unwind_to(scope_depth, type_depth);
                }
            }
        }
    }

    /// Push scopes for each segment of a module path, creating module
    /// symbols on first use and re-entering existing ones on subsequent
    /// files.
    fn enter_module_path(&mut self, path: &[Ident]) -> CollectResult<Vec<ScopeId>> {
        let mut entered = Vec::with_capacity(path.len());
        for segment in path {
            let scope = self.current_scope();
            match self.ctx.scopes.lookup_local(scope, &segment.name) {
                Some(existing) => match self.ctx.symbol(existing) {
                    Symbol::Module(module) => {
                        let module_scope = module.scope;
                        self.scope_stack.push(module_scope);
                        entered.push(module_scope);
                    }
                    other => {
                        return Err(CollectError::new(
                            codes::DUPLICATE_DECLARATION,
                            format!(
                                "cannot declare module '{}' because {} with that name already exists",
                                segment.name,
                                other.kind_label()
                            ),
                        )
                        .with_span(segment.span));
                    }
                },
                None => {
                    let module_scope = self.ctx.scopes.alloc(Some(scope));
                    let symbol = Symbol::Module(ModuleSymbol {
                        name: segment.name.clone(),
                        scope: module_scope,
                    });
                    self.declare(scope, &segment.name, symbol, segment.span)?;
                    self.scope_stack.push(module_scope);
                    entered.push(module_scope);
                }
            }
        }
        Ok(entered)
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: Symbol,
        span: Span,
    ) -> CollectResult<SymbolId> {
        match self.ctx.declare(scope, name, symbol) {
            Ok(id) => Ok(id),
            Err(existing) => Err(CollectError::new(
                codes::DUPLICATE_DECLARATION,
                format!(
                    "cannot declare '{}' because {} with that name already exists",
                    name,
                    self.ctx.symbol(existing).kind_label()
                ),
            )
            .with_span(span)),
        }
    }

    fn collect_stmt(
        &mut self,
        ast: &Ast,
        stmt_id: StmtId,
        imports: &mut Vec<StmtId>,
    ) -> CollectResult<CollectedStmt> {
        let stmt = ast.stmt(stmt_id);
        trace!(?stmt_id, "collecting statement");
        match &stmt.kind {
            StmtKind::Program { .. } => Err(CollectError::new(
                codes::INTERNAL,
                "nested program nodes are not valid",
            )),
            StmtKind::Import(_) => Err(CollectError::new(
                codes::CONTEXT_ERROR,
                "imports are only allowed at the top level of a file or module",
            )
            .with_span(stmt.span)),
            StmtKind::Module { path, stmts } => {
                let entered = self.enter_module_path(path)?;
                let symbol = {
                    // The innermost segment's symbol names this node.
                    let scope = *entered.last().expect("module paths are non-empty");
                    let parent = self.ctx.scopes.get(scope).parent.expect("module scopes have parents");
                    let last = path.last().expect("module paths are non-empty");
                    self.ctx
                        .scopes
                        .lookup_local(parent, &last.name)
                        .expect("module symbol was just entered")
                };
                let mut body = Vec::new();
                self.collect_siblings(ast, stmts, imports, &mut body);
                for _ in 0..entered.len() {
                    self.scope_stack.pop();
                }
                Ok(CollectedStmt::Module {
                    symbol,
                    scope: *entered.last().expect("module paths are non-empty"),
                    body,
                })
            }
            StmtKind::Struct {
                name,
                mutability,
                members,
            } => self.collect_struct(ast, stmt_id, name, *mutability, members, imports),
            StmtKind::Field {
                name,
                mutability,
                is_static,
                initializer,
                ..
            } => self.collect_field(stmt_id, name, *mutability, *is_static, initializer.is_some()),
            StmtKind::Const { name, .. } => {
                let scope = self.current_scope();
                let symbol = self.declare(
                    scope,
                    &name.name,
                    Symbol::Const(ConstSymbol {
                        name: name.name.clone(),
                        ty: None,
                    }),
                    name.span,
                )?;
                Ok(CollectedStmt::Const {
                    symbol,
                    ast: stmt_id,
                })
            }
            StmtKind::Define { name, ty } => {
                let scope = self.current_scope();
                let symbol = self.declare(
                    scope,
                    &name.name,
                    Symbol::Def(DefSymbol {
                        name: name.name.clone(),
                        syntax: *ty,
                        ty: None,
                    }),
                    name.span,
                )?;
                Ok(CollectedStmt::Def {
                    symbol,
                    ast: stmt_id,
                })
            }
            StmtKind::Entry { body, .. } => {
                self.collect_function_like(ast, stmt_id, FunctionLikeKind::Entry, *body, imports)
            }
            StmtKind::Function { body, .. } => {
                self.collect_function_like(ast, stmt_id, FunctionLikeKind::Function, *body, imports)
            }
            StmtKind::Constructor { body, .. } => {
                self.require_enclosing_type(stmt.span, "a constructor")?;
                self.collect_function_like(
                    ast,
                    stmt_id,
                    FunctionLikeKind::Constructor,
                    *body,
                    imports,
                )
            }
            StmtKind::Destructor { body } => {
                self.require_enclosing_type(stmt.span, "a destructor")?;
                self.collect_function_like(
                    ast,
                    stmt_id,
                    FunctionLikeKind::Destructor,
                    *body,
                    imports,
                )
            }
            StmtKind::StringFunction { body } => {
                self.require_enclosing_type(stmt.span, "a string function")?;
                self.collect_function_like(
                    ast,
                    stmt_id,
                    FunctionLikeKind::StringFunction,
                    *body,
                    imports,
                )
            }
            StmtKind::Cast { body, .. } => {
                self.collect_function_like(ast, stmt_id, FunctionLikeKind::Cast, *body, imports)
            }
            StmtKind::BinaryOperator { body, .. } | StmtKind::UnaryOperator { body, .. } => {
                self.collect_function_like(ast, stmt_id, FunctionLikeKind::Operator, *body, imports)
            }
            StmtKind::ExternalFunction { .. } => Ok(CollectedStmt::ExternalFunction {
                symbol: None,
                ast: stmt_id,
            }),
            StmtKind::Expression(_) => Ok(CollectedStmt::Expression { ast: stmt_id }),
            StmtKind::Block { stmts } => {
                let scope = self.ctx.scopes.alloc(Some(self.current_scope()));
                self.scope_stack.push(scope);
                let mut body = Vec::new();
                self.collect_siblings(ast, stmts, imports, &mut body);
                self.scope_stack.pop();
                Ok(CollectedStmt::Block { scope, body })
            }
            StmtKind::Var { name, mutable, .. } => {
                let scope = self.current_scope();
                // Shadowing is a future feature; collisions are errors.
                let symbol = self.declare(
                    scope,
                    &name.name,
                    Symbol::Var(VarSymbol {
                        name: name.name.clone(),
                        mutable: *mutable,
                        ty: None,
                    }),
                    name.span,
                )?;
                Ok(CollectedStmt::Var {
                    symbol,
                    ast: stmt_id,
                })
            }
            StmtKind::Return { .. } => Ok(CollectedStmt::Return { ast: stmt_id }),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                let then_branch = Box::new(self.collect_stmt(ast, *then_branch, imports)?);
                let else_branch = match else_branch {
                    Some(id) => Some(Box::new(self.collect_stmt(ast, *id, imports)?)),
                    None => None,
                };
                Ok(CollectedStmt::If {
                    ast: stmt_id,
                    then_branch,
                    else_branch,
                })
            }
        }
    }

    fn require_enclosing_type(&self, span: Span, what: &str) -> CollectResult<()> {
        if self.type_stack.is_empty() {
            return Err(CollectError::new(
                codes::CONTEXT_ERROR,
                format!("{what} may only be declared inside a struct"),
            )
            .with_span(span));
        }
        Ok(())
    }

    fn collect_struct(
        &mut self,
        ast: &Ast,
        stmt_id: StmtId,
        name: &Ident,
        mutability: StructMutability,
        members: &[StmtId],
        imports: &mut Vec<StmtId>,
    ) -> CollectResult<CollectedStmt> {
        let scope = self.current_scope();
        let struct_scope = self.ctx.scopes.alloc(Some(scope));
        let type_id = self.ctx.alloc_struct_type_id();
        let symbol = self.declare(
            scope,
            &name.name,
            Symbol::Type(TypeSymbol {
                name: name.name.clone(),
                type_id,
                kind: TypeSymbolKind::Struct(StructData {
                    scope: struct_scope,
                    mutable: mutability == StructMutability::Mutable,
                    next_field_index: 0,
                    operators: Vec::new(),
                    has_static_fields: false,
                }),
            }),
            name.span,
        )?;

        self.scope_stack.push(struct_scope);
        self.type_stack.push(symbol);
        let mut collected_members = Vec::new();
        self.collect_siblings(ast, members, imports, &mut collected_members);
        self.type_stack.pop();
        self.scope_stack.pop();

        Ok(CollectedStmt::Struct {
            symbol,
            ast: stmt_id,
            members: collected_members,
        })
    }

    fn collect_field(
        &mut self,
        stmt_id: StmtId,
        name: &Ident,
        mutability: FieldMutability,
        is_static: bool,
        has_initializer: bool,
    ) -> CollectResult<CollectedStmt> {
        let Some(&owner) = self.type_stack.last() else {
            return Err(CollectError::new(
                codes::CONTEXT_ERROR,
                "a field may only be declared inside a struct",
            )
            .with_span(name.span));
        };
        let scope = self.current_scope();

        // Constants at field position are modeled as Const symbols.
        if mutability == FieldMutability::Constant {
            if !has_initializer {
                return Err(CollectError::new(
                    codes::CONSTANCY_VIOLATION,
                    format!("constant field '{}' requires an initializer", name.name),
                )
                .with_span(name.span));
            }
            let symbol = self.declare(
                scope,
                &name.name,
                Symbol::Const(ConstSymbol {
                    name: name.name.clone(),
                    ty: None,
                }),
                name.span,
            )?;
            return Ok(CollectedStmt::Const {
                symbol,
                ast: stmt_id,
            });
        }

        // Reject duplicates before consuming a layout index.
        if let Some(existing) = self.ctx.scopes.lookup_local(scope, &name.name) {
            return Err(CollectError::new(
                codes::DUPLICATE_DECLARATION,
                format!(
                    "cannot declare '{}' because {} with that name already exists",
                    name.name,
                    self.ctx.symbol(existing).kind_label()
                ),
            )
            .with_span(name.span));
        }

        let index = if is_static {
            0
        } else {
            let data = match self.ctx.symbol_mut(owner) {
                Symbol::Type(ts) => ts.struct_data_mut().expect("field owner is a struct"),
                _ => unreachable!("type stack holds type symbols"),
            };
            let index = data.next_field_index;
            data.next_field_index += 1;
            index
        };

        let symbol = self.declare(
            scope,
            &name.name,
            Symbol::Field(FieldSymbol {
                name: name.name.clone(),
                owner,
                index,
                mutable: mutability == FieldMutability::Mutable,
                is_static,
                ty: None,
            }),
            name.span,
        )?;
        Ok(CollectedStmt::Field {
            symbol,
            ast: stmt_id,
        })
    }

    /// Create the body scope for a function-like declaration and collect
    /// its body. The symbol itself is completed in Pass B.
    fn collect_function_like(
        &mut self,
        ast: &Ast,
        stmt_id: StmtId,
        kind: FunctionLikeKind,
        body: StmtId,
        imports: &mut Vec<StmtId>,
    ) -> CollectResult<CollectedStmt> {
        let scope = self.ctx.scopes.alloc(Some(self.current_scope()));
        self.scope_stack.push(scope);
        let mut collected_body = Vec::new();
        match &ast.stmt(body).kind {
            StmtKind::Block { stmts } => {
                self.collect_siblings(ast, stmts, imports, &mut collected_body);
            }
            _ => {
                // Expression-bodied forms collect their single statement.
                let scope_depth = self.scope_stack.len();
                let type_depth = self.type_stack.len();
                match self.collect_stmt(ast, body, imports) {
                    Ok(collected) => collected_body.push(collected),
                    Err(error) => {
                        self.record(error);
                        self.unwind_to(scope_depth, type_depth);
                    }
                }
            }
        }
        self.scope_stack.pop();
        Ok(CollectedStmt::FunctionLike {
            kind,
            symbol: None,
            scope,
            ast: stmt_id,
            body: collected_body,
        })
    }
}
