//! AST construction API.
//!
//! The parser allocates nodes through `AstBuilder`; the analyzer's test
//! suites use it to assemble programs without a parser. Nodes default to
//! dummy spans; span-carrying constructors exist where diagnostics tests
//! need real locations.

use smallvec::SmallVec;

use quill_common::Span;

use crate::arena::{Ast, ExprId, StmtId, TypeExprId};
use crate::expr::{BinaryOp, Expr, ExprKind, Literal, NumberKind, UnaryOp};
use crate::stmt::{
    FieldMutability, Ident, ImportStmt, ImportTarget, Param, Stmt, StmtKind, StructMutability,
};
use crate::ty::{TypeExpr, TypeExprKind};

pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            ast: Ast::new(path),
        }
    }

    /// Set the program root and hand back the finished tree.
    #[must_use]
    pub fn program(mut self, module_path: &[&str], stmts: Vec<StmtId>) -> Ast {
        let module_path = module_path.iter().map(|s| self.ident(s)).collect();
        let root = self.stmt(StmtKind::Program { module_path, stmts }, Span::dummy());
        self.ast.root = Some(root);
        self.ast
    }

    #[must_use]
    pub fn ident(&self, name: &str) -> Ident {
        Ident::new(name, Span::dummy())
    }

    #[must_use]
    pub fn ident_at(&self, name: &str, span: Span) -> Ident {
        Ident::new(name, span)
    }

    pub fn stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.ast.alloc_stmt(Stmt { kind, span })
    }

    pub fn expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.alloc_expr(Expr { kind, span })
    }

    pub fn type_expr(&mut self, kind: TypeExprKind, span: Span) -> TypeExprId {
        self.ast.alloc_type(TypeExpr { kind, span })
    }

    // ----- types -----

    pub fn ty_name(&mut self, name: &str) -> TypeExprId {
        let ident = self.ident(name);
        self.type_expr(TypeExprKind::Base(ident), Span::dummy())
    }

    pub fn ty_name_at(&mut self, name: &str, span: Span) -> TypeExprId {
        let ident = self.ident_at(name, span);
        self.type_expr(TypeExprKind::Base(ident), span)
    }

    pub fn ty_tuple(&mut self, elements: Vec<TypeExprId>) -> TypeExprId {
        self.type_expr(TypeExprKind::Tuple(elements), Span::dummy())
    }

    pub fn ty_generic(&mut self, base: TypeExprId, args: Vec<TypeExprId>) -> TypeExprId {
        self.type_expr(TypeExprKind::Generic { base, args }, Span::dummy())
    }

    pub fn ty_mutable(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Mutable(inner), Span::dummy())
    }

    pub fn ty_array(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Array(inner), Span::dummy())
    }

    pub fn ty_nullable(&mut self, inner: TypeExprId) -> TypeExprId {
        self.type_expr(TypeExprKind::Nullable(inner), Span::dummy())
    }

    pub fn ty_ref(&mut self, inner: TypeExprId, immutable: bool) -> TypeExprId {
        self.type_expr(TypeExprKind::Reference { inner, immutable }, Span::dummy())
    }

    pub fn ty_lambda(
        &mut self,
        params: Vec<TypeExprId>,
        return_type: Option<TypeExprId>,
    ) -> TypeExprId {
        self.type_expr(
            TypeExprKind::Lambda {
                params,
                return_type,
            },
            Span::dummy(),
        )
    }

    // ----- expressions -----

    pub fn int(&mut self, text: &str) -> ExprId {
        self.number(text, NumberKind::Int32)
    }

    pub fn number(&mut self, text: &str, kind: NumberKind) -> ExprId {
        self.expr(
            ExprKind::Literal(Literal::Number {
                text: text.to_string(),
                kind,
            }),
            Span::dummy(),
        )
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)), Span::dummy())
    }

    pub fn char_lit(&mut self, value: char) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Char(value)), Span::dummy())
    }

    pub fn string_lit(&mut self, value: &str) -> ExprId {
        self.expr(
            ExprKind::Literal(Literal::String(value.to_string())),
            Span::dummy(),
        )
    }

    pub fn name(&mut self, name: &str) -> ExprId {
        let ident = self.ident(name);
        self.expr(ExprKind::Name(ident), Span::dummy())
    }

    pub fn name_at(&mut self, name: &str, span: Span) -> ExprId {
        let ident = self.ident_at(name, span);
        self.expr(ExprKind::Name(ident), span)
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(ExprKind::This, Span::dummy())
    }

    pub fn binary(&mut self, left: ExprId, op: BinaryOp, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { left, op, right }, Span::dummy())
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(
            ExprKind::Unary {
                op,
                prefix: true,
                operand,
            },
            Span::dummy(),
        )
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assign { target, value }, Span::dummy())
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(
            ExprKind::Call {
                callee,
                args: SmallVec::from_vec(args),
            },
            Span::dummy(),
        )
    }

    pub fn access(&mut self, source: ExprId, member: &str) -> ExprId {
        let member = self.ident(member);
        self.expr(ExprKind::Access { source, member }, Span::dummy())
    }

    // ----- parameters -----

    #[must_use]
    pub fn param(&self, name: &str, ty: TypeExprId) -> Param {
        Param::new(self.ident(name), Some(ty))
    }

    #[must_use]
    pub fn param_untyped(&self, name: &str) -> Param {
        Param::new(self.ident(name), None)
    }

    // ----- statements -----

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block { stmts }, Span::dummy())
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expression(expr), Span::dummy())
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return { value }, Span::dummy())
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) -> StmtId {
        self.stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            Span::dummy(),
        )
    }

    /// `let name = init` / `let name: ty = init`
    pub fn let_var(&mut self, name: &str, ty: Option<TypeExprId>, init: Option<ExprId>) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Var {
                name,
                mutable: false,
                ty,
                initializer: init,
            },
            Span::dummy(),
        )
    }

    /// `var name = init` / `var name: ty = init`
    pub fn var_var(&mut self, name: &str, ty: Option<TypeExprId>, init: Option<ExprId>) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Var {
                name,
                mutable: true,
                ty,
                initializer: init,
            },
            Span::dummy(),
        )
    }

    pub fn const_stmt(&mut self, name: &str, ty: Option<TypeExprId>, init: ExprId) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Const {
                name,
                ty,
                initializer: init,
            },
            Span::dummy(),
        )
    }

    pub fn define(&mut self, name: &str, ty: TypeExprId) -> StmtId {
        let name = self.ident(name);
        self.stmt(StmtKind::Define { name, ty }, Span::dummy())
    }

    pub fn field(
        &mut self,
        name: &str,
        mutability: FieldMutability,
        is_static: bool,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
    ) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Field {
                name,
                mutability,
                is_static,
                ty,
                initializer,
            },
            Span::dummy(),
        )
    }

    pub fn struct_stmt(
        &mut self,
        name: &str,
        mutability: StructMutability,
        members: Vec<StmtId>,
    ) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Struct {
                name,
                mutability,
                members,
            },
            Span::dummy(),
        )
    }

    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Param>,
        return_type: Option<TypeExprId>,
        body: StmtId,
    ) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::Function {
                name,
                type_params: Vec::new(),
                params: SmallVec::from_vec(params),
                return_type,
                body,
            },
            Span::dummy(),
        )
    }

    pub fn entry(&mut self, params: Vec<Param>, body: StmtId) -> StmtId {
        self.stmt(
            StmtKind::Entry {
                params: SmallVec::from_vec(params),
                body,
            },
            Span::dummy(),
        )
    }

    pub fn constructor(&mut self, params: Vec<Param>, body: StmtId) -> StmtId {
        self.stmt(
            StmtKind::Constructor {
                params: SmallVec::from_vec(params),
                body,
            },
            Span::dummy(),
        )
    }

    pub fn destructor(&mut self, body: StmtId) -> StmtId {
        self.stmt(StmtKind::Destructor { body }, Span::dummy())
    }

    pub fn string_function(&mut self, body: StmtId) -> StmtId {
        self.stmt(StmtKind::StringFunction { body }, Span::dummy())
    }

    pub fn cast(
        &mut self,
        implicit: bool,
        param: Param,
        return_type: TypeExprId,
        body: StmtId,
    ) -> StmtId {
        self.stmt(
            StmtKind::Cast {
                implicit,
                param,
                return_type,
                body,
            },
            Span::dummy(),
        )
    }

    pub fn binary_operator(
        &mut self,
        left: Param,
        op: BinaryOp,
        right: Param,
        return_type: TypeExprId,
        body: StmtId,
    ) -> StmtId {
        self.stmt(
            StmtKind::BinaryOperator {
                left,
                op,
                right,
                return_type,
                body,
            },
            Span::dummy(),
        )
    }

    pub fn unary_operator(
        &mut self,
        operand: Param,
        op: UnaryOp,
        prefix: bool,
        return_type: TypeExprId,
        body: StmtId,
    ) -> StmtId {
        self.stmt(
            StmtKind::UnaryOperator {
                operand,
                op,
                prefix,
                return_type,
                body,
            },
            Span::dummy(),
        )
    }

    pub fn external_function(
        &mut self,
        name: &str,
        params: Vec<Param>,
        return_type: Option<TypeExprId>,
        attributes: Vec<(&str, &str)>,
    ) -> StmtId {
        let name = self.ident(name);
        self.stmt(
            StmtKind::ExternalFunction {
                name,
                params: SmallVec::from_vec(params),
                return_type,
                attributes: attributes
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
            Span::dummy(),
        )
    }

    pub fn module_stmt(&mut self, path: &[&str], stmts: Vec<StmtId>) -> StmtId {
        let path = path.iter().map(|s| self.ident(s)).collect();
        self.stmt(StmtKind::Module { path, stmts }, Span::dummy())
    }

    pub fn import_wildcard(&mut self, module_path: &[&str], group_alias: Option<&str>) -> StmtId {
        let import = ImportStmt {
            module_path: module_path.iter().map(|s| self.ident(s)).collect(),
            target: ImportTarget::Wildcard {
                group_alias: group_alias.map(|a| self.ident(a)),
            },
        };
        self.stmt(StmtKind::Import(import), Span::dummy())
    }

    pub fn import_single(
        &mut self,
        module_path: &[&str],
        name: &str,
        alias: Option<&str>,
    ) -> StmtId {
        let import = ImportStmt {
            module_path: module_path.iter().map(|s| self.ident(s)).collect(),
            target: ImportTarget::Single {
                name: self.ident(name),
                alias: alias.map(|a| self.ident(a)),
            },
        };
        self.stmt(StmtKind::Import(import), Span::dummy())
    }

    pub fn import_aggregate(
        &mut self,
        module_path: &[&str],
        items: &[(&str, Option<&str>)],
        group_alias: Option<&str>,
    ) -> StmtId {
        let import = ImportStmt {
            module_path: module_path.iter().map(|s| self.ident(s)).collect(),
            target: ImportTarget::Aggregate {
                items: items
                    .iter()
                    .map(|(n, a)| (self.ident(n), a.map(|a| self.ident(a))))
                    .collect(),
                group_alias: group_alias.map(|a| self.ident(a)),
            },
        };
        self.stmt(StmtKind::Import(import), Span::dummy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_program_with_an_entry() {
        let mut b = AstBuilder::new("main.ql");
        let one = b.int("1");
        let two = b.int("2");
        let sum = b.binary(one, BinaryOp::Add, two);
        let decl = b.let_var("a", None, Some(sum));
        let body = b.block(vec![decl]);
        let entry = b.entry(vec![], body);
        let ast = b.program(&[], vec![entry]);

        let root = ast.root.expect("program root");
        match &ast.stmt(root).kind {
            StmtKind::Program { stmts, .. } => assert_eq!(stmts.len(), 1),
            other => panic!("expected program, got {other:?}"),
        }
    }
}
