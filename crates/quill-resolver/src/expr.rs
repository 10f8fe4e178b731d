//! Expression resolution.
//!
//! Every resolved expression carries `(type, is_constant)`. Token
//! expressions classify literals and bind identifiers (synthesizing
//! `(this).field` for instance fields); binary and unary expressions bind
//! a specific operator overload; assignments validate their target.
//! Constructs outside the implemented subset pass through as deferred
//! nodes with an unclassified type.

use quill_ast::{Ast, BinaryOp, ExprId, ExprKind, Ident, Literal, UnaryOp};
use quill_common::{Span, codes};
use quill_sema::{
    NativeKind, OperatorLookup, Symbol, SymbolId, Type, lookup_binary_operator,
    lookup_unary_operator,
};
use quill_collector::lookup_with_imports;

use crate::error::{ResolveError, ResolveResult};
use crate::resolved::{ResolvedExpr, ResolvedExprKind};
use crate::resolver::Resolver;

impl Resolver<'_> {
    pub(crate) fn resolve_expr(&mut self, ast: &Ast, id: ExprId) -> ResolveResult<ResolvedExpr> {
        let expr = ast.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(self.classify_literal(literal.clone(), span)),
            ExprKind::Interpolated(_) => Ok(ResolvedExpr {
                kind: ResolvedExprKind::InterpolatedString,
                ty: Some(self.ctx.string_type()),
                constant: false,
                span,
            }),
            ExprKind::Name(ident) => self.resolve_identifier(ident, span),
            ExprKind::This => self.resolve_this(span),
            ExprKind::Binary { left, op, right } => {
                let left = self.resolve_expr(ast, *left)?;
                let right = self.resolve_expr(ast, *right)?;
                self.resolve_binary(left, *op, right, span)
            }
            ExprKind::Unary {
                op,
                prefix,
                operand,
            } => {
                let operand = self.resolve_expr(ast, *operand)?;
                self.resolve_unary(*op, *prefix, operand, span)
            }
            ExprKind::Assign { target, value } => {
                let target = self.resolve_expr(ast, *target)?;
                let value = self.resolve_expr(ast, *value)?;
                self.resolve_assignment(target, value, span)
            }
            ExprKind::Call { callee, args } => self.resolve_call(ast, *callee, args, span),
            ExprKind::Access { source, member } => {
                self.resolve_access(ast, *source, member, span)
            }
            // Deep analysis of the remaining expression kinds is not yet
            // implemented; they pass through unclassified.
            ExprKind::Tuple(_)
            | ExprKind::ListLiteral(_)
            | ExprKind::MapLiteral(_)
            | ExprKind::Instantiation { .. }
            | ExprKind::Cast { .. }
            | ExprKind::Index { .. }
            | ExprKind::Lambda { .. }
            | ExprKind::Conditional { .. }
            | ExprKind::Switch { .. }
            | ExprKind::With { .. } => Ok(ResolvedExpr {
                kind: ResolvedExprKind::Deferred,
                ty: None,
                constant: false,
                span,
            }),
        }
    }

    fn classify_literal(&self, literal: Literal, span: Span) -> ResolvedExpr {
        let ty = match &literal {
            Literal::Bool(_) => self.ctx.bool_type(),
            Literal::Char(_) => self.ctx.native_type(NativeKind::Char),
            Literal::String(_) => self.ctx.string_type(),
            Literal::Number { kind, .. } => self.ctx.native_type(NativeKind::of_number(*kind)),
        };
        ResolvedExpr {
            kind: ResolvedExprKind::Literal(literal),
            ty: Some(ty),
            constant: true,
            span,
        }
    }

    fn resolve_this(&self, span: Span) -> ResolveResult<ResolvedExpr> {
        if self.static_context() {
            return Err(ResolveError::new(
                codes::CONTEXT_ERROR,
                "cannot use 'this' in a static context",
            )
            .with_span(span));
        }
        let owner = *self
            .type_stack
            .last()
            .expect("instance contexts have an enclosing type");
        Ok(ResolvedExpr {
            kind: ResolvedExprKind::This,
            ty: Some(Type::Base(owner)),
            constant: false,
            span,
        })
    }

    /// Bind an identifier token, honoring static-context rules.
    pub(crate) fn resolve_identifier(
        &mut self,
        ident: &Ident,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let symbol = lookup_with_imports(self.ctx, self.current_scope(), &self.imports, &ident.name)
            .ok_or_else(|| {
                ResolveError::new(
                    codes::UNRESOLVED_NAME,
                    format!("could not find a symbol named '{}'", ident.name),
                )
                .with_span(ident.span)
            })?;
        self.bind_symbol(symbol, span)
    }

    /// Produce the resolved reference for a looked-up symbol, including
    /// the implicit `(this).field` rewrite for instance fields.
    pub(crate) fn bind_symbol(&mut self, symbol: SymbolId, span: Span) -> ResolveResult<ResolvedExpr> {
        match self.ctx.symbol(symbol) {
            Symbol::Field(field) => {
                if field.is_static {
                    return Ok(ResolvedExpr {
                        kind: ResolvedExprKind::Field(symbol),
                        ty: field.ty.clone(),
                        constant: false,
                        span,
                    });
                }
                if self.static_context() {
                    return Err(ResolveError::new(
                        codes::CONTEXT_ERROR,
                        format!(
                            "cannot access instance field '{}' from a static context",
                            field.name
                        ),
                    )
                    .with_span(span));
                }
                let ty = field.ty.clone();
                let this = self.resolve_this(span)?;
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::ValueAccess {
                        source: Box::new(this),
                        target: symbol,
                    },
                    ty,
                    constant: false,
                    span,
                })
            }
            Symbol::Const(constant) => Ok(ResolvedExpr {
                kind: ResolvedExprKind::Const(symbol),
                ty: constant.ty.clone(),
                constant: true,
                span,
            }),
            Symbol::Function(function) => {
                let ty = Self::function_type(&function.params, function.return_type.clone(), self.ctx);
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::Function(symbol),
                    ty: Some(ty),
                    constant: false,
                    span,
                })
            }
            Symbol::ExternalFunction(function) => {
                let ty = Self::function_type(&function.params, function.return_type.clone(), self.ctx);
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::External(symbol),
                    ty: Some(ty),
                    constant: false,
                    span,
                })
            }
            Symbol::StringFunction(_) => {
                if self.static_context() {
                    return Err(ResolveError::new(
                        codes::CONTEXT_ERROR,
                        "cannot access a string function from a static context",
                    )
                    .with_span(span));
                }
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::StringFunction(symbol),
                    ty: Some(Type::Function {
                        params: Vec::new(),
                        return_type: Some(Box::new(self.ctx.string_type())),
                    }),
                    constant: false,
                    span,
                })
            }
            Symbol::Var(var) => Ok(ResolvedExpr {
                kind: ResolvedExprKind::Variable(symbol),
                ty: var.ty.clone(),
                constant: false,
                span,
            }),
            Symbol::Parameter(param) => Ok(ResolvedExpr {
                kind: ResolvedExprKind::Parameter(symbol),
                ty: param.ty.clone(),
                constant: false,
                span,
            }),
            Symbol::Type(_) => Ok(ResolvedExpr {
                kind: ResolvedExprKind::Type(symbol),
                // A bare type reference is not a constant expression.
                ty: Some(Type::Base(symbol)),
                constant: false,
                span,
            }),
            Symbol::Def(def) => {
                let ty = def.ty.clone();
                match ty.as_ref().and_then(Type::root_symbol) {
                    Some(root) => Ok(ResolvedExpr {
                        kind: ResolvedExprKind::Type(root),
                        ty,
                        constant: false,
                        span,
                    }),
                    None => Err(ResolveError::new(
                        codes::CONTEXT_ERROR,
                        format!("'{}' cannot be used as a value", def.name),
                    )
                    .with_span(span)),
                }
            }
            other @ (Symbol::Module(_)
            | Symbol::ImportGroup(_)
            | Symbol::Constructor(_)
            | Symbol::Destructor(_)
            | Symbol::Operator(_)
            | Symbol::Cast(_)
            | Symbol::Entry(_)
            | Symbol::Alias(_)) => Err(ResolveError::new(
                codes::CONTEXT_ERROR,
                format!("{} cannot be used as a value", other.kind_label()),
            )
            .with_span(span)),
        }
    }

    pub(crate) fn function_type(
        params: &[SymbolId],
        return_type: Option<Type>,
        ctx: &quill_sema::AnalysisContext,
    ) -> Type {
        let params = params
            .iter()
            .filter_map(|&p| ctx.symbol(p).evaluated_type().cloned())
            .collect();
        Type::Function {
            params,
            return_type: return_type.map(Box::new),
        }
    }

    fn display_or_unknown(&self, ty: Option<&Type>) -> String {
        match ty {
            Some(ty) => ty.display(&self.ctx.symbols).to_string(),
            None => "<unclassified>".to_string(),
        }
    }

    fn resolve_binary(
        &mut self,
        left: ResolvedExpr,
        op: BinaryOp,
        right: ResolvedExpr,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let (Some(left_ty), Some(right_ty)) = (left.ty.as_ref(), right.ty.as_ref()) else {
            return Err(ResolveError::new(
                codes::OPERATOR_NOT_FOUND,
                format!(
                    "no operator '{}' is defined for types '{}' and '{}'",
                    op.token(),
                    self.display_or_unknown(left.ty.as_ref()),
                    self.display_or_unknown(right.ty.as_ref())
                ),
            )
            .with_span(span));
        };

        match lookup_binary_operator(self.ctx, left_ty, right_ty, op) {
            OperatorLookup::Found(operator) => {
                let ty = match self.ctx.symbol(operator) {
                    Symbol::Operator(o) => o.return_type.clone(),
                    _ => None,
                };
                let constant = left.constant && right.constant;
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::Binary {
                        left: Box::new(left),
                        op,
                        operator,
                        right: Box::new(right),
                    },
                    ty,
                    constant,
                    span,
                })
            }
            OperatorLookup::Ambiguous => Err(ResolveError::new(
                codes::AMBIGUOUS_INVOCATION,
                format!("Ambiguous invocation of operator '{}'", op.token()),
            )
            .with_span(span)),
            OperatorLookup::NotFound => Err(ResolveError::new(
                codes::OPERATOR_NOT_FOUND,
                format!(
                    "no operator '{}' is defined for types '{}' and '{}'",
                    op.token(),
                    left_ty.display(&self.ctx.symbols),
                    right_ty.display(&self.ctx.symbols)
                ),
            )
            .with_span(span)),
        }
    }

    fn resolve_unary(
        &mut self,
        op: UnaryOp,
        prefix: bool,
        operand: ResolvedExpr,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let Some(operand_ty) = operand.ty.as_ref() else {
            return Err(ResolveError::new(
                codes::OPERATOR_NOT_FOUND,
                format!(
                    "no operator '{}' is defined for type '<unclassified>'",
                    op.token()
                ),
            )
            .with_span(span));
        };

        match lookup_unary_operator(self.ctx, operand_ty, op, prefix) {
            OperatorLookup::Found(operator) => {
                let ty = match self.ctx.symbol(operator) {
                    Symbol::Operator(o) => o.return_type.clone(),
                    _ => None,
                };
                let constant = operand.constant;
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::Unary {
                        op,
                        prefix,
                        operator,
                        operand: Box::new(operand),
                    },
                    ty,
                    constant,
                    span,
                })
            }
            _ => Err(ResolveError::new(
                codes::OPERATOR_NOT_FOUND,
                format!(
                    "no operator '{}' is defined for type '{}'",
                    op.token(),
                    operand_ty.display(&self.ctx.symbols)
                ),
            )
            .with_span(span)),
        }
    }

    /// Validate the assignment target and produce the assignment node.
    /// Its type is the left side's type and its constancy the left side's
    /// constancy.
    fn resolve_assignment(
        &mut self,
        target: ResolvedExpr,
        value: ResolvedExpr,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        self.check_assignment_target(&target, span)?;
        let ty = target.ty.clone();
        let constant = target.constant;
        Ok(ResolvedExpr {
            kind: ResolvedExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
            constant,
            span,
        })
    }

    fn check_assignment_target(&self, target: &ResolvedExpr, span: Span) -> ResolveResult<()> {
        let field_target = match &target.kind {
            ResolvedExprKind::Field(field) => Some(*field),
            ResolvedExprKind::ValueAccess { target, .. }
            | ResolvedExprKind::TypeAccess { target, .. } => {
                match self.ctx.symbol(*target) {
                    Symbol::Field(_) => Some(*target),
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some(field_id) = field_target {
            let Symbol::Field(field) = self.ctx.symbol(field_id) else {
                unreachable!("field targets hold field symbols");
            };
            // Non-mutable fields may only be assigned inside a
            // constructor of the owning type.
            if !field.mutable && self.constructor_owner() != Some(field.owner) {
                return Err(ResolveError::new(
                    codes::MUTABILITY_VIOLATION,
                    "immutable fields cannot be modified outside of a constructor",
                )
                .with_span(span));
            }
            return Ok(());
        }

        match &target.kind {
            ResolvedExprKind::Variable(symbol) => match self.ctx.symbol(*symbol) {
                Symbol::Var(var) if !var.mutable => Err(ResolveError::new(
                    codes::MUTABILITY_VIOLATION,
                    format!("cannot assign to immutable variable '{}'", var.name),
                )
                .with_span(span)),
                _ => Ok(()),
            },
            ResolvedExprKind::Parameter(symbol) => match self.ctx.symbol(*symbol) {
                Symbol::Parameter(param) if !param.mutable => Err(ResolveError::new(
                    codes::MUTABILITY_VIOLATION,
                    format!("cannot assign to immutable parameter '{}'", param.name),
                )
                .with_span(span)),
                _ => Ok(()),
            },
            ResolvedExprKind::Const(symbol)
            | ResolvedExprKind::Function(symbol)
            | ResolvedExprKind::External(symbol)
            | ResolvedExprKind::StringFunction(symbol)
            | ResolvedExprKind::Type(symbol) => Err(ResolveError::new(
                codes::INVALID_ASSIGNMENT_TARGET,
                format!("cannot assign to {}", self.ctx.symbol(*symbol).kind_label()),
            )
            .with_span(span)),
            ResolvedExprKind::ValueAccess { target, .. }
            | ResolvedExprKind::TypeAccess { target, .. } => Err(ResolveError::new(
                codes::INVALID_ASSIGNMENT_TARGET,
                format!("cannot assign to {}", self.ctx.symbol(*target).kind_label()),
            )
            .with_span(span)),
            _ => Err(ResolveError::new(
                codes::INVALID_ASSIGNMENT_TARGET,
                "expression is not a valid assignment target",
            )
            .with_span(span)),
        }
    }
}
