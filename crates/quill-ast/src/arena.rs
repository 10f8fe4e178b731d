//! Flat per-file AST storage.
//!
//! All statement, expression, and type-syntax nodes of one file live in
//! three `Vec`s indexed by newtype ids. Ids are only meaningful within
//! the `Ast` that allocated them.

use serde::Serialize;

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::ty::TypeExpr;

macro_rules! ast_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ast_id!(
    /// Index of a statement node in its [`Ast`].
    StmtId
);
ast_id!(
    /// Index of an expression node in its [`Ast`].
    ExprId
);
ast_id!(
    /// Index of a type-syntax node in its [`Ast`].
    TypeExprId
);

/// The AST of a single source file.
#[derive(Debug, Clone, Serialize)]
pub struct Ast {
    /// Path of the file this tree was parsed from.
    pub path: String,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,
    types: Vec<TypeExpr>,
    /// The program node, once the parser has produced one.
    pub root: Option<StmtId>,
}

impl Ast {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stmts: Vec::new(),
            exprs: Vec::new(),
            types: Vec::new(),
            root: None,
        }
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn alloc_type(&mut self, ty: TypeExpr) -> TypeExprId {
        let id = TypeExprId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    #[must_use]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[must_use]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[must_use]
    pub fn type_expr(&self, id: TypeExprId) -> &TypeExpr {
        &self.types[id.index()]
    }

    #[must_use]
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}
