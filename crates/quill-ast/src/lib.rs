//! AST node definitions for the Quill semantic analyzer.
//!
//! The analyzer consumes ASTs produced by an external parser. Nodes live
//! in a per-file [`Ast`] arena and are addressed by `StmtId`/`ExprId`/
//! `TypeExprId` indices, so later phases can keep cheap back-pointers to
//! syntax without borrowing into the tree.
//!
//! [`AstBuilder`] is the construction API: the parser allocates nodes
//! through it, and the analyzer's test suites use it to assemble programs
//! directly.

pub mod arena;
pub mod builder;
pub mod expr;
pub mod stmt;
pub mod ty;

pub use arena::{Ast, ExprId, StmtId, TypeExprId};
pub use builder::AstBuilder;
pub use expr::{BinaryOp, Expr, ExprKind, InterpolatedPart, Literal, NumberKind, UnaryOp};
pub use stmt::{
    FieldMutability, Ident, ImportStmt, ImportTarget, Param, Stmt, StmtKind, StructMutability,
};
pub use ty::{TypeExpr, TypeExprKind};
