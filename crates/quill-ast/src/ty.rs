//! Syntactic type nodes.
//!
//! These are the type expressions a parser produces; the collector's
//! `resolve_type` evaluates them to semantic types.

use serde::Serialize;

use quill_common::Span;

use crate::arena::TypeExprId;
use crate::stmt::Ident;

#[derive(Debug, Clone, Serialize)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum TypeExprKind {
    /// An identifier or native keyword, e.g. `int32`, `Money`.
    Base(Ident),
    /// `(T1, T2)`
    Tuple(Vec<TypeExprId>),
    /// `Base[A, B]`
    Generic {
        base: TypeExprId,
        args: Vec<TypeExprId>,
    },
    /// `mutable T`
    Mutable(TypeExprId),
    /// `T[]`
    Array(TypeExprId),
    /// `T?`
    Nullable(TypeExprId),
    /// `ref T` / `ref immutable T`
    Reference {
        inner: TypeExprId,
        immutable: bool,
    },
    /// `(P1, P2) => R`
    Lambda {
        params: Vec<TypeExprId>,
        return_type: Option<TypeExprId>,
    },
}
