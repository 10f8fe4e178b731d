//! Evaluation of syntactic types to semantic types.
//!
//! `resolve_type` descends the syntactic type tree and short-circuits on
//! the first unresolved leaf. A bare identifier resolves through the
//! scope chain, then the per-file import table; the bound symbol must be
//! a type symbol (or a completed type alias).

use indexmap::IndexMap;

use quill_ast::{Ast, TypeExprId, TypeExprKind};
use quill_common::codes;
use quill_sema::{AnalysisContext, ScopeId, Symbol, SymbolId, Type};

use crate::error::{CollectError, CollectResult};

/// Look a name up in the scope chain and then the import table, chasing
/// aliases.
#[must_use]
pub fn lookup_with_imports(
    ctx: &AnalysisContext,
    scope: ScopeId,
    imports: &IndexMap<String, SymbolId>,
    name: &str,
) -> Option<SymbolId> {
    ctx.lookup(scope, name)
        .or_else(|| imports.get(name).map(|&id| ctx.symbols.chase_alias(id)))
}

/// Evaluate a syntactic type to a semantic type.
pub fn resolve_type(
    ctx: &AnalysisContext,
    scope: ScopeId,
    imports: &IndexMap<String, SymbolId>,
    ast: &Ast,
    id: TypeExprId,
) -> CollectResult<Type> {
    let node = ast.type_expr(id);
    match &node.kind {
        TypeExprKind::Base(ident) => {
            let not_found = || {
                CollectError::new(
                    codes::UNRESOLVED_TYPE,
                    format!("could not find a type named '{}'", ident.name),
                )
                .with_span(ident.span)
            };
            let symbol = lookup_with_imports(ctx, scope, imports, &ident.name)
                .ok_or_else(not_found)?;
            match ctx.symbol(symbol) {
                Symbol::Type(_) => Ok(Type::Base(symbol)),
                // A completed type alias stands for its target.
                Symbol::Def(def) => def.ty.clone().ok_or_else(not_found),
                _ => Err(not_found()),
            }
        }
        TypeExprKind::Tuple(elements) => {
            let mut resolved = Vec::with_capacity(elements.len());
            for &element in elements {
                resolved.push(resolve_type(ctx, scope, imports, ast, element)?);
            }
            Ok(Type::Tuple(resolved))
        }
        TypeExprKind::Generic { base, args } => {
            let base = resolve_type(ctx, scope, imports, ast, *base)?;
            let mut resolved = Vec::with_capacity(args.len());
            for &arg in args {
                resolved.push(resolve_type(ctx, scope, imports, ast, arg)?);
            }
            Ok(Type::Generic {
                base: Box::new(base),
                args: resolved,
            })
        }
        TypeExprKind::Mutable(inner) => {
            Ok(Type::mutable(resolve_type(ctx, scope, imports, ast, *inner)?))
        }
        TypeExprKind::Array(inner) => {
            Ok(Type::array(resolve_type(ctx, scope, imports, ast, *inner)?))
        }
        TypeExprKind::Nullable(inner) => {
            Ok(Type::nullable(resolve_type(ctx, scope, imports, ast, *inner)?))
        }
        TypeExprKind::Reference { inner, immutable } => Ok(Type::reference(
            resolve_type(ctx, scope, imports, ast, *inner)?,
            *immutable,
        )),
        TypeExprKind::Lambda {
            params,
            return_type,
        } => {
            let mut resolved = Vec::with_capacity(params.len());
            for &param in params {
                resolved.push(resolve_type(ctx, scope, imports, ast, param)?);
            }
            let return_type = match return_type {
                Some(ret) => Some(Box::new(resolve_type(ctx, scope, imports, ast, *ret)?)),
                None => None,
            };
            Ok(Type::Function {
                params: resolved,
                return_type,
            })
        }
    }
}
