//! Operator overload lookup and name mangling.
//!
//! Binary lookup consults both operands' operator tables; each side may
//! contribute a candidate. Both contributing over structurally distinct
//! types is an ambiguity, one contributing wins, neither is "not found".
//!
//! Routing: a `Base` queries its own type symbol, `Array` the hidden
//! `$Array` native, and wrapper types search through to the wrapped type.
//! `Nullable` currently routes to its inner type as well; the routing is
//! provisional.

use quill_ast::{BinaryOp, UnaryOp};

use crate::context::AnalysisContext;
use crate::natives::NativeKind;
use crate::symbol::{OperatorKind, Symbol, SymbolArena, SymbolId};
use crate::types::Type;

/// Outcome of an operator search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorLookup {
    Found(SymbolId),
    Ambiguous,
    NotFound,
}

/// The type symbol whose operator table serves `ty`, per the routing
/// rules above.
#[must_use]
pub fn operator_owner(ctx: &AnalysisContext, ty: &Type) -> Option<SymbolId> {
    match ty {
        Type::Base(id) => match ctx.symbols.get(*id) {
            Symbol::Type(ts) if ts.operators().is_some() => Some(*id),
            _ => None,
        },
        Type::Array(_) => Some(ctx.native(NativeKind::Array)),
        Type::Nullable(inner) => operator_owner(ctx, inner),
        Type::Mutable(inner) => operator_owner(ctx, inner),
        Type::Reference { inner, .. } => operator_owner(ctx, inner),
        Type::Generic { base, .. } => operator_owner(ctx, base),
        Type::Tuple(_) | Type::Function { .. } => None,
    }
}

fn binary_candidate(
    ctx: &AnalysisContext,
    owner: SymbolId,
    left: &Type,
    op: BinaryOp,
    right: &Type,
) -> Option<SymbolId> {
    let Symbol::Type(ts) = ctx.symbols.get(owner) else {
        return None;
    };
    for &candidate in ts.operators()? {
        let Symbol::Operator(operator) = ctx.symbols.get(candidate) else {
            continue;
        };
        let OperatorKind::Binary {
            left: l,
            op: candidate_op,
            right: r,
        } = &operator.kind
        else {
            continue;
        };
        if *candidate_op != op {
            continue;
        }
        let l_ty = ctx.symbols.get(*l).evaluated_type();
        let r_ty = ctx.symbols.get(*r).evaluated_type();
        let (Some(l_ty), Some(r_ty)) = (l_ty, r_ty) else {
            continue;
        };
        if left.matches(l_ty) && right.matches(r_ty) {
            return Some(candidate);
        }
    }
    None
}

fn unary_candidate(
    ctx: &AnalysisContext,
    owner: SymbolId,
    operand: &Type,
    op: UnaryOp,
    prefix: bool,
) -> Option<SymbolId> {
    let Symbol::Type(ts) = ctx.symbols.get(owner) else {
        return None;
    };
    for &candidate in ts.operators()? {
        let Symbol::Operator(operator) = ctx.symbols.get(candidate) else {
            continue;
        };
        let OperatorKind::Unary {
            operand: o,
            op: candidate_op,
            prefix: candidate_prefix,
        } = &operator.kind
        else {
            continue;
        };
        if *candidate_op != op || *candidate_prefix != prefix {
            continue;
        }
        let Some(o_ty) = ctx.symbols.get(*o).evaluated_type() else {
            continue;
        };
        if operand.matches(o_ty) {
            return Some(candidate);
        }
    }
    None
}

/// Find the overload for `left op right`.
#[must_use]
pub fn lookup_binary_operator(
    ctx: &AnalysisContext,
    left: &Type,
    right: &Type,
    op: BinaryOp,
) -> OperatorLookup {
    let left_owner = operator_owner(ctx, left);
    let right_owner = operator_owner(ctx, right);

    let from_left = left_owner.and_then(|o| binary_candidate(ctx, o, left, op, right));
    let from_right = match right_owner {
        Some(o) if right_owner != left_owner => binary_candidate(ctx, o, left, op, right),
        _ => None,
    };

    match (from_left, from_right) {
        (Some(l), Some(r)) => {
            if l == r || left == right {
                OperatorLookup::Found(l)
            } else {
                OperatorLookup::Ambiguous
            }
        }
        (Some(found), None) | (None, Some(found)) => OperatorLookup::Found(found),
        (None, None) => OperatorLookup::NotFound,
    }
}

/// Find the overload for a unary operation on `operand`.
#[must_use]
pub fn lookup_unary_operator(
    ctx: &AnalysisContext,
    operand: &Type,
    op: UnaryOp,
    prefix: bool,
) -> OperatorLookup {
    match operator_owner(ctx, operand) {
        Some(owner) => match unary_candidate(ctx, owner, operand, op, prefix) {
            Some(found) => OperatorLookup::Found(found),
            None => OperatorLookup::NotFound,
        },
        None => OperatorLookup::NotFound,
    }
}

/// Mangled scope-table name for a binary operator overload. Two overloads
/// collide iff their (operands, operation, return) tuples match.
#[must_use]
pub fn binary_operator_name(
    symbols: &SymbolArena,
    left: &Type,
    op: BinaryOp,
    right: &Type,
    return_type: &Type,
) -> String {
    format!(
        "$operator({} {} {}) => {}",
        left.display(symbols),
        op.token(),
        right.display(symbols),
        return_type.display(symbols)
    )
}

/// Mangled scope-table name for a unary operator overload.
#[must_use]
pub fn unary_operator_name(
    symbols: &SymbolArena,
    op: UnaryOp,
    prefix: bool,
    operand: &Type,
    return_type: &Type,
) -> String {
    if prefix {
        format!(
            "$operator({}{}) => {}",
            op.token(),
            operand.display(symbols),
            return_type.display(symbols)
        )
    } else {
        format!(
            "$operator({}{}) => {}",
            operand.display(symbols),
            op.token(),
            return_type.display(symbols)
        )
    }
}

/// Mangled scope-table name for a cast overload.
#[must_use]
pub fn cast_name(
    symbols: &SymbolArena,
    implicit: bool,
    param: &Type,
    return_type: &Type,
) -> String {
    format!(
        "$cast({} {} => {})",
        if implicit { "implicit" } else { "explicit" },
        param.display(symbols),
        return_type.display(symbols)
    )
}
