//! The resolved tree.
//!
//! Every resolved expression carries its evaluated type (or `None` for
//! constructs whose analysis is explicitly deferred) and a constancy
//! flag; statement nodes carry fully bound symbols. One resolved tree is
//! produced per input file, ready for a code generator.

use quill_ast::{BinaryOp, Literal, UnaryOp};
use quill_common::Span;
use quill_sema::{SymbolId, Type};

#[derive(Debug)]
pub struct ResolvedExpr {
    pub kind: ResolvedExprKind,
    /// `None` marks an explicitly deferred/unclassified construct.
    pub ty: Option<Type>,
    /// True iff the expression can be evaluated at compile time from
    /// literals and constants only.
    pub constant: bool,
    pub span: Span,
}

#[derive(Debug)]
pub enum ResolvedExprKind {
    Function(SymbolId),
    Constructor(SymbolId),
    External(SymbolId),
    StringFunction(SymbolId),
    Variable(SymbolId),
    Parameter(SymbolId),
    Field(SymbolId),
    Const(SymbolId),
    Type(SymbolId),
    Literal(Literal),
    /// An interpolated string; embedded expressions are not analyzed.
    InterpolatedString,
    This,
    Binary {
        left: Box<ResolvedExpr>,
        op: BinaryOp,
        /// The bound operator overload.
        operator: SymbolId,
        right: Box<ResolvedExpr>,
    },
    Unary {
        op: UnaryOp,
        prefix: bool,
        operator: SymbolId,
        operand: Box<ResolvedExpr>,
    },
    Assignment {
        target: Box<ResolvedExpr>,
        value: Box<ResolvedExpr>,
    },
    /// `Type.member` - a static access.
    TypeAccess {
        source: SymbolId,
        target: SymbolId,
    },
    /// `value.member` - an instance access.
    ValueAccess {
        source: Box<ResolvedExpr>,
        target: SymbolId,
    },
    FunctionCall {
        function: SymbolId,
        receiver: Option<Box<ResolvedExpr>>,
        args: Vec<ResolvedExpr>,
    },
    ConstructorCall {
        constructor: SymbolId,
        args: Vec<ResolvedExpr>,
    },
    ExternalCall {
        function: SymbolId,
        args: Vec<ResolvedExpr>,
    },
    /// A string-conversion invocation on a value.
    StringCall {
        source: Box<ResolvedExpr>,
    },
    /// A construct whose deep analysis is not yet implemented; it passes
    /// through unresolved.
    Deferred,
}

#[derive(Debug)]
pub enum ResolvedStmt {
    Module {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Struct {
        symbol: SymbolId,
        members: Vec<ResolvedStmt>,
    },
    Field {
        symbol: SymbolId,
        initializer: Option<ResolvedExpr>,
    },
    Const {
        symbol: SymbolId,
        initializer: ResolvedExpr,
    },
    Def {
        symbol: SymbolId,
    },
    Entry {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Function {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Constructor {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Destructor {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    StringFunction {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Cast {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    Operator {
        symbol: SymbolId,
        body: Vec<ResolvedStmt>,
    },
    External {
        symbol: SymbolId,
    },
    Var {
        symbol: SymbolId,
        initializer: Option<ResolvedExpr>,
    },
    Block {
        body: Vec<ResolvedStmt>,
    },
    Return {
        value: Option<ResolvedExpr>,
    },
    If {
        condition: ResolvedExpr,
        then_branch: Box<ResolvedStmt>,
        else_branch: Option<Box<ResolvedStmt>>,
    },
    Expression(ResolvedExpr),
    /// A declaration whose collection failed; nothing to resolve.
    Incomplete,
}

/// One file's resolved tree.
#[derive(Debug)]
pub struct ResolvedFile {
    pub path: String,
    pub stmts: Vec<ResolvedStmt>,
}
