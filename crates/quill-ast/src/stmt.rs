//! Statement nodes.

use serde::Serialize;
use smallvec::SmallVec;

use quill_common::Span;

use crate::arena::{ExprId, StmtId, TypeExprId};
use crate::expr::{BinaryOp, UnaryOp};

/// An identifier token with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Declared mutability of a struct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StructMutability {
    Mutable,
    Immutable,
}

/// Declared mutability of a field position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldMutability {
    /// `var` - reassignable anywhere the owner permits.
    Mutable,
    /// `let` - assignable only inside a constructor.
    Immutable,
    /// `const` - a compile-time constant; modeled as a `Const` symbol.
    Constant,
}

/// A declared parameter of any function-like form.
#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: Ident,
    /// `mutable` parameters may be reassigned in the body.
    pub mutable: bool,
    pub ty: Option<TypeExprId>,
    pub default: Option<ExprId>,
    pub variadic: bool,
    pub span: Span,
}

impl Param {
    #[must_use]
    pub fn new(name: Ident, ty: Option<TypeExprId>) -> Self {
        let span = name.span;
        Self {
            name,
            mutable: false,
            ty,
            default: None,
            variadic: false,
            span,
        }
    }
}

/// One import statement.
#[derive(Debug, Clone, Serialize)]
pub struct ImportStmt {
    /// Module scope path to descend, e.g. `a.b`.
    pub module_path: Vec<Ident>,
    pub target: ImportTarget,
}

/// What an import statement brings into the per-file import table.
#[derive(Debug, Clone, Serialize)]
pub enum ImportTarget {
    /// `import a.*` / `import a.* as A`
    Wildcard { group_alias: Option<Ident> },
    /// `import a.foo` / `import a.foo as bar`
    Single {
        name: Ident,
        alias: Option<Ident>,
    },
    /// `import a.{foo, bar as baz}` / `... as G`
    Aggregate {
        items: Vec<(Ident, Option<Ident>)>,
        group_alias: Option<Ident>,
    },
}

/// A statement node.
#[derive(Debug, Clone, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum StmtKind {
    /// The root node of a file: optional module path plus top-level
    /// declarations.
    Program {
        module_path: Vec<Ident>,
        stmts: Vec<StmtId>,
    },
    /// A nested `module a.b { ... }` statement.
    Module {
        path: Vec<Ident>,
        stmts: Vec<StmtId>,
    },
    Import(ImportStmt),
    /// An external-function import; the attribute map is opaque to the
    /// analyzer and forwarded to the backend.
    ExternalFunction {
        name: Ident,
        params: SmallVec<[Param; 4]>,
        return_type: Option<TypeExprId>,
        attributes: Vec<(String, String)>,
    },
    Struct {
        name: Ident,
        mutability: StructMutability,
        members: Vec<StmtId>,
    },
    Field {
        name: Ident,
        mutability: FieldMutability,
        is_static: bool,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
    },
    Const {
        name: Ident,
        ty: Option<TypeExprId>,
        initializer: ExprId,
    },
    /// `def Name = Type` - a type alias.
    Define {
        name: Ident,
        ty: TypeExprId,
    },
    Entry {
        params: SmallVec<[Param; 4]>,
        body: StmtId,
    },
    Function {
        name: Ident,
        type_params: Vec<Ident>,
        params: SmallVec<[Param; 4]>,
        return_type: Option<TypeExprId>,
        body: StmtId,
    },
    Constructor {
        params: SmallVec<[Param; 4]>,
        body: StmtId,
    },
    Destructor {
        body: StmtId,
    },
    /// The `string` conversion function of a struct.
    StringFunction {
        body: StmtId,
    },
    Cast {
        implicit: bool,
        param: Param,
        return_type: TypeExprId,
        body: StmtId,
    },
    BinaryOperator {
        left: Param,
        op: BinaryOp,
        right: Param,
        return_type: TypeExprId,
        body: StmtId,
    },
    UnaryOperator {
        operand: Param,
        op: UnaryOp,
        prefix: bool,
        return_type: TypeExprId,
        body: StmtId,
    },
    Expression(ExprId),
    Block {
        stmts: Vec<StmtId>,
    },
    /// `var x = ...` / `let x = ...` local declaration.
    Var {
        name: Ident,
        mutable: bool,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
    },
    Return {
        value: Option<ExprId>,
    },
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
}
