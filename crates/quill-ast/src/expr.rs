//! Expression nodes.

use serde::Serialize;
use smallvec::SmallVec;

use quill_common::Span;

use crate::arena::{ExprId, StmtId, TypeExprId};
use crate::stmt::{Ident, Param};

/// Binary operations, as classified by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    /// The surface token, used in diagnostics and overload mangling.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }
}

/// Unary operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Negate,
    Not,
    BitNot,
}

impl UnaryOp {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// The payload category of a numeric literal, assigned by the lexer.
///
/// Unsuffixed integer literals classify as `Int32`, unsuffixed decimal
/// literals as `Float32`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum NumberKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Float32,
    Float128,
    Fixed32,
    Fixed128,
}

/// A literal token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    Bool(bool),
    Char(char),
    String(String),
    Number { text: String, kind: NumberKind },
}

/// One segment of an interpolated string.
#[derive(Debug, Clone, Serialize)]
pub enum InterpolatedPart {
    Text(String),
    Expr(ExprId),
}

/// An expression node.
#[derive(Debug, Clone, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum ExprKind {
    Literal(Literal),
    /// An interpolated string; classified as `string`, embedded
    /// expressions are not deeply analyzed.
    Interpolated(Vec<InterpolatedPart>),
    Name(Ident),
    This,
    Binary {
        left: ExprId,
        op: BinaryOp,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        prefix: bool,
        operand: ExprId,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
    Call {
        callee: ExprId,
        args: SmallVec<[ExprId; 4]>,
    },
    Access {
        source: ExprId,
        member: Ident,
    },

    // Constructs below pass through resolution unclassified; see the
    // resolver's deferred-expression handling.
    Tuple(Vec<ExprId>),
    ListLiteral(Vec<ExprId>),
    MapLiteral(Vec<(ExprId, ExprId)>),
    Instantiation {
        ty: TypeExprId,
        args: Vec<ExprId>,
    },
    Cast {
        expr: ExprId,
        ty: TypeExprId,
    },
    Index {
        source: ExprId,
        index: ExprId,
    },
    Lambda {
        params: Vec<Param>,
        body: StmtId,
    },
    Conditional {
        condition: ExprId,
        then_value: ExprId,
        else_value: ExprId,
    },
    Switch {
        subject: ExprId,
        arms: Vec<(ExprId, ExprId)>,
    },
    With {
        source: ExprId,
        overrides: Vec<(Ident, ExprId)>,
    },
}
