//! The collected tree.
//!
//! Between the two analysis phases every AST declaration is shadowed by a
//! collected node carrying either the symbol it introduces (function-like
//! symbols are filled in during Pass B) or a back-pointer to the AST for
//! statements whose processing is deferred to the resolver.

use indexmap::IndexMap;

use quill_ast::StmtId;
use quill_sema::{ScopeId, SymbolId};

/// Which function-like form a collected container belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FunctionLikeKind {
    Entry,
    Function,
    Constructor,
    Destructor,
    StringFunction,
    Cast,
    Operator,
}

#[derive(Debug)]
pub enum CollectedStmt {
    Module {
        symbol: SymbolId,
        scope: ScopeId,
        body: Vec<CollectedStmt>,
    },
    Struct {
        symbol: SymbolId,
        ast: StmtId,
        members: Vec<CollectedStmt>,
    },
    Field {
        symbol: SymbolId,
        ast: StmtId,
    },
    Const {
        symbol: SymbolId,
        ast: StmtId,
    },
    Def {
        symbol: SymbolId,
        ast: StmtId,
    },
    /// Entry, function, constructor, destructor, string function, cast,
    /// or operator: the body scope and collected body exist after Pass A;
    /// the symbol is created during Pass B signature completion.
    FunctionLike {
        kind: FunctionLikeKind,
        symbol: Option<SymbolId>,
        scope: ScopeId,
        ast: StmtId,
        body: Vec<CollectedStmt>,
    },
    ExternalFunction {
        symbol: Option<SymbolId>,
        ast: StmtId,
    },
    Var {
        symbol: SymbolId,
        ast: StmtId,
    },
    Block {
        scope: ScopeId,
        body: Vec<CollectedStmt>,
    },
    If {
        ast: StmtId,
        then_branch: Box<CollectedStmt>,
        else_branch: Option<Box<CollectedStmt>>,
    },
    /// An expression statement; resolution is entirely deferred.
    Expression {
        ast: StmtId,
    },
    Return {
        ast: StmtId,
    },
}

/// One file's collected tree plus its per-file import state.
#[derive(Debug)]
pub struct CollectedFile {
    pub path: String,
    /// Scopes of the declared module path, outermost first; empty for
    /// files in the global module.
    pub module_scopes: Vec<ScopeId>,
    /// Raw import statements recorded during Pass A, resolved in Pass B.
    pub imports: Vec<StmtId>,
    pub stmts: Vec<CollectedStmt>,
    /// The per-file import table filled in by Pass B; the resolver reads
    /// it as an immutable snapshot.
    pub import_table: IndexMap<String, SymbolId>,
}

impl CollectedFile {
    /// The scope unqualified top-level names of this file resolve in.
    #[must_use]
    pub fn file_scope(&self, global: ScopeId) -> ScopeId {
        self.module_scopes.last().copied().unwrap_or(global)
    }
}
