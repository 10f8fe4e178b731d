//! Access classification and call dispatch.
//!
//! An access `source.target` is static when the source names a type (or
//! module/import grouping): the target must then be static, a
//! constructor, or the string-conversion keyword. Otherwise the access is
//! an instance access and the target must be non-static; naming a
//! static-only symbol through an instance produces a diagnostic
//! suggesting `Type.symbol`.
//!
//! Calls dispatch on the resolved callee: bare function and external
//! references, static methods and constructors through type accesses, and
//! instance methods and string conversions through value accesses.

use quill_ast::{Ast, ExprId, ExprKind, Ident};
use quill_common::{Span, codes};
use quill_sema::{ScopeId, Symbol, SymbolId, Type};
use quill_collector::{lookup_with_imports, overloads_of, params_of};

use crate::error::{ResolveError, ResolveResult};
use crate::resolved::{ResolvedExpr, ResolvedExprKind};
use crate::resolver::Resolver;

impl Resolver<'_> {
    pub(crate) fn resolve_access(
        &mut self,
        ast: &Ast,
        source: ExprId,
        member: &Ident,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        // A name on the left of the dot may denote a module, an import
        // grouping, or a type; those accesses never evaluate the source.
        if let ExprKind::Name(ident) = &ast.expr(source).kind {
            if let Some(symbol) =
                lookup_with_imports(self.ctx, self.current_scope(), &self.imports, &ident.name)
            {
                match self.ctx.symbol(symbol) {
                    Symbol::Module(module) => {
                        let scope = module.scope;
                        let name = module.name.clone();
                        return self.resolve_scoped_member(scope, &name, member, span);
                    }
                    Symbol::ImportGroup(group) => {
                        let target = group.table.get(&member.name).copied();
                        let name = group.name.clone();
                        let Some(target) = target else {
                            return Err(ResolveError::new(
                                codes::UNRESOLVED_NAME,
                                format!(
                                    "could not find a symbol named '{}' in '{}'",
                                    member.name, name
                                ),
                            )
                            .with_span(member.span));
                        };
                        let target = self.ctx.symbols.chase_alias(target);
                        return self.bind_symbol(target, span);
                    }
                    Symbol::Type(_) => {
                        return self.resolve_type_access(symbol, member, span);
                    }
                    Symbol::Def(def) => {
                        if let Some(root) = def.ty.as_ref().and_then(Type::root_symbol) {
                            return self.resolve_type_access(root, member, span);
                        }
                    }
                    _ => {}
                }
            }
        }

        let source = self.resolve_expr(ast, source)?;
        self.resolve_value_access(source, member, span)
    }

    /// `module.member`: module members bind like ordinary identifiers.
    fn resolve_scoped_member(
        &mut self,
        scope: ScopeId,
        scope_name: &str,
        member: &Ident,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let Some(symbol) = self.ctx.scopes.lookup_local(scope, &member.name) else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!(
                    "could not find a symbol named '{}' in module '{}'",
                    member.name, scope_name
                ),
            )
            .with_span(member.span));
        };
        let symbol = self.ctx.symbols.chase_alias(symbol);
        self.bind_symbol(symbol, span)
    }

    /// `Type.member`: the target must be static, a constructor, or the
    /// string-conversion keyword.
    fn resolve_type_access(
        &mut self,
        type_symbol: SymbolId,
        member: &Ident,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let type_name = self.ctx.symbol(type_symbol).name().to_string();
        let Symbol::Type(ts) = self.ctx.symbol(type_symbol) else {
            unreachable!("type accesses start from type symbols");
        };
        let Some(scope) = ts.scope() else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!("'{type_name}' has no member named '{}'", member.name),
            )
            .with_span(member.span));
        };

        let lookup_name = match member.name.as_str() {
            "new" => "$constructor",
            "string" => "$string",
            other => other,
        };
        let Some(target) = self.ctx.scopes.lookup_local(scope, lookup_name) else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!("'{type_name}' has no member named '{}'", member.name),
            )
            .with_span(member.span));
        };
        let target = self.ctx.symbols.chase_alias(target);

        let target_symbol = self.ctx.symbol(target);
        let allowed = target_symbol.is_static()
            || matches!(
                target_symbol,
                Symbol::Constructor(_) | Symbol::StringFunction(_)
            );
        if !allowed {
            return Err(ResolveError::new(
                codes::CONTEXT_ERROR,
                format!(
                    "cannot access instance member '{}' through type '{type_name}'",
                    member.name
                ),
            )
            .with_span(member.span));
        }

        let (ty, constant) = self.member_type_and_constancy(target);
        Ok(ResolvedExpr {
            kind: ResolvedExprKind::TypeAccess {
                source: type_symbol,
                target,
            },
            ty,
            constant,
            span,
        })
    }

    /// `value.member`: the target must be non-static.
    fn resolve_value_access(
        &mut self,
        source: ResolvedExpr,
        member: &Ident,
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let Some(source_ty) = source.ty.as_ref() else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!(
                    "cannot access member '{}' of an unclassified expression",
                    member.name
                ),
            )
            .with_span(member.span));
        };
        let Some(owner) = source_ty.value_type().root_symbol() else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!(
                    "type '{}' has no member named '{}'",
                    source_ty.display(&self.ctx.symbols),
                    member.name
                ),
            )
            .with_span(member.span));
        };
        let owner_name = self.ctx.symbol(owner).name().to_string();
        let scope = match self.ctx.symbol(owner) {
            Symbol::Type(ts) => ts.scope(),
            _ => None,
        };
        let Some(scope) = scope else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!("'{owner_name}' has no member named '{}'", member.name),
            )
            .with_span(member.span));
        };

        let lookup_name = match member.name.as_str() {
            "string" => "$string",
            other => other,
        };
        let Some(target) = self.ctx.scopes.lookup_local(scope, lookup_name) else {
            return Err(ResolveError::new(
                codes::UNRESOLVED_NAME,
                format!("'{owner_name}' has no member named '{}'", member.name),
            )
            .with_span(member.span));
        };
        let target = self.ctx.symbols.chase_alias(target);

        let target_symbol = self.ctx.symbol(target);
        if target_symbol.is_static() && !matches!(target_symbol, Symbol::StringFunction(_)) {
            // Static members are reached through the type, not an
            // instance.
            return Err(ResolveError::new(
                codes::CONTEXT_ERROR,
                format!(
                    "'{}' is static; access it as '{owner_name}.{}'",
                    member.name, member.name
                ),
            )
            .with_span(member.span));
        }

        let (ty, constant) = self.member_type_and_constancy(target);
        Ok(ResolvedExpr {
            kind: ResolvedExprKind::ValueAccess {
                source: Box::new(source),
                target,
            },
            ty,
            constant,
            span,
        })
    }

    /// An access's type comes from its target; its constancy is the
    /// target symbol's constancy.
    fn member_type_and_constancy(&self, target: SymbolId) -> (Option<Type>, bool) {
        let symbol = self.ctx.symbol(target);
        let ty = match symbol {
            Symbol::Function(f) => {
                Some(Self::function_type(&f.params, f.return_type.clone(), self.ctx))
            }
            Symbol::ExternalFunction(f) => {
                Some(Self::function_type(&f.params, f.return_type.clone(), self.ctx))
            }
            Symbol::StringFunction(_) => Some(Type::Function {
                params: Vec::new(),
                return_type: Some(Box::new(self.ctx.string_type())),
            }),
            Symbol::Constructor(_) => None,
            other => other.evaluated_type().cloned(),
        };
        (ty, symbol.is_constant())
    }

    pub(crate) fn resolve_call(
        &mut self,
        ast: &Ast,
        callee: ExprId,
        args: &[ExprId],
        span: Span,
    ) -> ResolveResult<ResolvedExpr> {
        let callee = self.resolve_expr(ast, callee)?;
        let mut resolved_args = Vec::with_capacity(args.len());
        for &arg in args {
            resolved_args.push(self.resolve_expr(ast, arg)?);
        }

        match callee.kind {
            ResolvedExprKind::Function(function) => {
                let selected = self.select_overload(function, &resolved_args, 0, span)?;
                let ty = self.return_type_of(selected);
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::FunctionCall {
                        function: selected,
                        receiver: None,
                        args: resolved_args,
                    },
                    ty,
                    constant: false,
                    span,
                })
            }
            ResolvedExprKind::External(function) => {
                let selected = self.select_overload(function, &resolved_args, 0, span)?;
                let ty = self.return_type_of(selected);
                Ok(ResolvedExpr {
                    kind: ResolvedExprKind::ExternalCall {
                        function: selected,
                        args: resolved_args,
                    },
                    ty,
                    constant: false,
                    span,
                })
            }
            ResolvedExprKind::TypeAccess { target, .. } => match self.ctx.symbol(target) {
                Symbol::Function(_) => {
                    let selected = self.select_overload(target, &resolved_args, 0, span)?;
                    let ty = self.return_type_of(selected);
                    Ok(ResolvedExpr {
                        kind: ResolvedExprKind::FunctionCall {
                            function: selected,
                            receiver: None,
                            args: resolved_args,
                        },
                        ty,
                        constant: false,
                        span,
                    })
                }
                Symbol::Constructor(_) => {
                    // Constructor parameter lists carry `this` at index
                    // 0, which callers never pass.
                    let selected = self.select_overload(target, &resolved_args, 1, span)?;
                    let owner = match self.ctx.symbol(selected) {
                        Symbol::Constructor(c) => c.owner,
                        _ => unreachable!("constructor overloads are constructors"),
                    };
                    Ok(ResolvedExpr {
                        kind: ResolvedExprKind::ConstructorCall {
                            constructor: selected,
                            args: resolved_args,
                        },
                        ty: Some(Type::Base(owner)),
                        constant: false,
                        span,
                    })
                }
                _ => Err(ResolveError::new(
                    codes::INVALID_CALL_TARGET,
                    "expression is not callable",
                )
                .with_span(span)),
            },
            ResolvedExprKind::ValueAccess { source, target } => match self.ctx.symbol(target) {
                Symbol::Function(_) => {
                    let selected = self.select_overload(target, &resolved_args, 0, span)?;
                    let ty = self.return_type_of(selected);
                    Ok(ResolvedExpr {
                        kind: ResolvedExprKind::FunctionCall {
                            function: selected,
                            receiver: Some(source),
                            args: resolved_args,
                        },
                        ty,
                        constant: false,
                        span,
                    })
                }
                Symbol::StringFunction(_) => {
                    if !resolved_args.is_empty() {
                        return Err(ResolveError::new(
                            codes::NO_MATCHING_OVERLOAD,
                            "a string conversion takes no arguments",
                        )
                        .with_span(span));
                    }
                    Ok(ResolvedExpr {
                        kind: ResolvedExprKind::StringCall { source },
                        ty: Some(self.ctx.string_type()),
                        constant: false,
                        span,
                    })
                }
                _ => Err(ResolveError::new(
                    codes::INVALID_CALL_TARGET,
                    "expression is not callable",
                )
                .with_span(span)),
            },
            _ => Err(ResolveError::new(
                codes::INVALID_CALL_TARGET,
                "expression is not callable",
            )
            .with_span(span)),
        }
    }

    fn return_type_of(&self, function: SymbolId) -> Option<Type> {
        match self.ctx.symbol(function) {
            Symbol::Function(f) => f.return_type.clone(),
            Symbol::ExternalFunction(f) => f.return_type.clone(),
            _ => None,
        }
    }

    /// Pick the overload whose parameters match the argument types,
    /// honoring defaults and a trailing variadic parameter. Exactly one
    /// match is required.
    fn select_overload(
        &self,
        primary: SymbolId,
        args: &[ResolvedExpr],
        skip_params: usize,
        span: Span,
    ) -> ResolveResult<SymbolId> {
        let mut candidates = vec![primary];
        candidates.extend_from_slice(overloads_of(self.ctx, primary));

        let matching: Vec<SymbolId> = candidates
            .into_iter()
            .filter(|&candidate| self.arguments_match(candidate, args, skip_params))
            .collect();

        let name = self.ctx.symbol(primary).name().to_string();
        match matching.as_slice() {
            [selected] => Ok(*selected),
            [] => Err(ResolveError::new(
                codes::NO_MATCHING_OVERLOAD,
                format!("no overload of '{name}' matches the provided arguments"),
            )
            .with_span(span)),
            _ => Err(ResolveError::new(
                codes::AMBIGUOUS_INVOCATION,
                format!("Ambiguous invocation of '{name}'"),
            )
            .with_span(span)),
        }
    }

    fn arguments_match(&self, candidate: SymbolId, args: &[ResolvedExpr], skip: usize) -> bool {
        let all_params = params_of(self.ctx, candidate);
        let params = &all_params[skip.min(all_params.len())..];
        let variadic = params.last().is_some_and(|&p| match self.ctx.symbol(p) {
            Symbol::Parameter(param) => param.variadic,
            _ => false,
        });
        let fixed = if variadic { params.len() - 1 } else { params.len() };
        let required = params[..fixed]
            .iter()
            .filter(|&&p| match self.ctx.symbol(p) {
                Symbol::Parameter(param) => param.default.is_none(),
                _ => true,
            })
            .count();

        if args.len() < required {
            return false;
        }
        if !variadic && args.len() > params.len() {
            return false;
        }

        for (i, arg) in args.iter().enumerate() {
            let param_ty = if i < fixed {
                match self.ctx.symbol(params[i]) {
                    Symbol::Parameter(param) => param.ty.clone(),
                    _ => None,
                }
            } else if variadic {
                // Extra arguments match the variadic array's element
                // type.
                match self.ctx.symbol(params[fixed]) {
                    Symbol::Parameter(param) => match &param.ty {
                        Some(Type::Array(element)) => Some(element.as_ref().clone()),
                        other => other.clone(),
                    },
                    _ => None,
                }
            } else {
                return false;
            };
            match (arg.ty.as_ref(), param_ty.as_ref()) {
                (Some(arg_ty), Some(param_ty)) => {
                    if !arg_ty.matches(param_ty) {
                        return false;
                    }
                }
                // Untyped parameters accept anything; unclassified
                // arguments cannot be judged and are accepted.
                _ => {}
            }
        }
        true
    }
}
