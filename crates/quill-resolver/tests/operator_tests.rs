//! Tests for operator overload resolution: built-in seeding, user
//! overloads, two-sided ambiguity, and failures.

use quill_ast::{Ast, AstBuilder, BinaryOp, NumberKind, StmtId, StructMutability, UnaryOp};
use quill_ast::FieldMutability;
use quill_collector::{CollectedFile, Collector};
use quill_common::{AnalyzerOptions, Diagnostic, codes};
use quill_resolver::{ResolvedFile, Resolver};
use quill_sema::{AnalysisContext, Symbol, Type};

fn analyze(asts: &[Ast]) -> (AnalysisContext, Vec<ResolvedFile>, Vec<Diagnostic>) {
    let mut ctx = AnalysisContext::new(AnalyzerOptions::default());
    let mut collector = Collector::new(&mut ctx);
    let mut collected: Vec<CollectedFile> =
        asts.iter().map(|ast| collector.collect_file(ast)).collect();
    for (ast, file) in asts.iter().zip(collected.iter_mut()) {
        collector.complete_file(ast, file);
    }
    let mut diagnostics: Vec<Diagnostic> = collector.diagnostics.iter().cloned().collect();
    drop(collector);

    let mut resolver = Resolver::new(&mut ctx);
    let resolved = asts
        .iter()
        .zip(collected.iter())
        .map(|(ast, file)| resolver.resolve_file(ast, file))
        .collect();
    diagnostics.extend(resolver.diagnostics.iter().cloned());
    drop(resolver);
    (ctx, resolved, diagnostics)
}

fn var_type(ctx: &AnalysisContext, name: &str) -> Option<Type> {
    ctx.symbols.iter().find_map(|(_, s)| match s {
        Symbol::Var(v) if v.name == name => v.ty.clone(),
        _ => None,
    })
}

/// `struct Money { var cents:int64; constructor(cents:int64) }`
fn money_struct(b: &mut AstBuilder) -> StmtId {
    let tc = b.ty_name("int64");
    let cents = b.field("cents", FieldMutability::Mutable, false, Some(tc), None);
    let tp = b.ty_name("int64");
    let p = b.param("cents", tp);
    let this = b.this();
    let access = b.access(this, "cents");
    let value = b.name("cents");
    let set = b.assign(access, value);
    let stmt = b.expr_stmt(set);
    let ctor_body = b.block(vec![stmt]);
    let ctor = b.constructor(vec![p], ctor_body);
    b.struct_stmt("Money", StructMutability::Mutable, vec![cents, ctor])
}

/// `operator(l:Money + r:Money) :> Money => Money.new(l.cents + r.cents)`
fn money_add_operator(b: &mut AstBuilder) -> StmtId {
    let lt = b.ty_name("Money");
    let rt = b.ty_name("Money");
    let ret_ty = b.ty_name("Money");
    let l = b.param("l", lt);
    let r = b.param("r", rt);
    let l_ref = b.name("l");
    let l_cents = b.access(l_ref, "cents");
    let r_ref = b.name("r");
    let r_cents = b.access(r_ref, "cents");
    let sum = b.binary(l_cents, BinaryOp::Add, r_cents);
    let money = b.name("Money");
    let new = b.access(money, "new");
    let call = b.call(new, vec![sum]);
    let ret = b.ret(Some(call));
    let body = b.block(vec![ret]);
    b.binary_operator(l, BinaryOp::Add, r, ret_ty, body)
}

#[test]
fn user_operator_overloads_bind_on_struct_operands() {
    let mut b = AstBuilder::new("main.ql");
    let s = money_struct(&mut b);
    let op = money_add_operator(&mut b);

    let hundred = b.number("100", NumberKind::Int64);
    let money1 = b.name("Money");
    let new1 = b.access(money1, "new");
    let lhs = b.call(new1, vec![hundred]);
    let deux = b.number("250", NumberKind::Int64);
    let money2 = b.name("Money");
    let new2 = b.access(money2, "new");
    let rhs = b.call(new2, vec![deux]);
    let sum = b.binary(lhs, BinaryOp::Add, rhs);
    let total = b.let_var("total", None, Some(sum));
    let body = b.block(vec![total]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![s, op, entry]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let money = ctx.lookup(ctx.global_scope, "Money").expect("Money exists");
    assert_eq!(var_type(&ctx, "total"), Some(Type::Base(money)));
}

#[test]
fn mixed_operands_resolve_when_one_side_contributes() {
    // operator(l:Money + r:int64) on Money plus the symmetric
    // operator(l:int64 + r:Money) on int64: exactly one side matches
    // each call order.
    let mut b = AstBuilder::new("main.ql");
    let s = money_struct(&mut b);

    let lt = b.ty_name("Money");
    let rt = b.ty_name("int64");
    let ret_ty = b.ty_name("Money");
    let l = b.param("l", lt);
    let r = b.param("r", rt);
    let body = b.block(vec![]);
    let op1 = b.binary_operator(l, BinaryOp::Add, r, ret_ty, body);

    let lt2 = b.ty_name("int64");
    let rt2 = b.ty_name("Money");
    let ret_ty2 = b.ty_name("Money");
    let l2 = b.param("l", lt2);
    let r2 = b.param("r", rt2);
    let body2 = b.block(vec![]);
    let op2 = b.binary_operator(l2, BinaryOp::Add, r2, ret_ty2, body2);

    let one = b.number("1", NumberKind::Int64);
    let money = b.name("Money");
    let new = b.access(money, "new");
    let lhs = b.call(new, vec![one]);
    let amount = b.number("1", NumberKind::Int64);
    let sum = b.binary(lhs, BinaryOp::Add, amount);
    let total = b.let_var("total", None, Some(sum));
    let body3 = b.block(vec![total]);
    let entry = b.entry(vec![], body3);
    let ast = b.program(&[], vec![s, op1, op2, entry]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let money = ctx.lookup(ctx.global_scope, "Money").expect("Money exists");
    assert_eq!(var_type(&ctx, "total"), Some(Type::Base(money)));
}

#[test]
fn matching_overloads_on_both_sides_are_ambiguous() {
    // The same (A, B) signature declared inside struct A and inside
    // struct B: both operand tables contribute a candidate.
    let mut b = AstBuilder::new("main.ql");

    let lt1 = b.ty_name("A");
    let rt1 = b.ty_name("B");
    let ret1 = b.ty_name("A");
    let l1 = b.param("l", lt1);
    let r1 = b.param("r", rt1);
    let body1 = b.block(vec![]);
    let op_in_a = b.binary_operator(l1, BinaryOp::Add, r1, ret1, body1);
    let a = b.struct_stmt("A", StructMutability::Mutable, vec![op_in_a]);

    let lt2 = b.ty_name("A");
    let rt2 = b.ty_name("B");
    let ret2 = b.ty_name("A");
    let l2 = b.param("l", lt2);
    let r2 = b.param("r", rt2);
    let body2 = b.block(vec![]);
    let op_in_b = b.binary_operator(l2, BinaryOp::Add, r2, ret2, body2);
    let bb = b.struct_stmt("B", StructMutability::Mutable, vec![op_in_b]);

    let ta = b.ty_name("A");
    let va = b.let_var("x", Some(ta), None);
    let tb = b.ty_name("B");
    let vb = b.let_var("y", Some(tb), None);
    let x = b.name("x");
    let y = b.name("y");
    let sum = b.binary(x, BinaryOp::Add, y);
    let stmt = b.expr_stmt(sum);
    let body = b.block(vec![va, vb, stmt]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![a, bb, entry]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::AMBIGUOUS_INVOCATION);
    assert!(diagnostics[0].message.contains("Ambiguous invocation"));
}

#[test]
fn missing_operators_are_reported_with_both_types() {
    let mut b = AstBuilder::new("main.ql");
    let one = b.int("1");
    let yes = b.bool_lit(true);
    let bad = b.binary(one, BinaryOp::Add, yes);
    let stmt = b.expr_stmt(bad);
    let body = b.block(vec![stmt]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![entry]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::OPERATOR_NOT_FOUND);
    assert!(diagnostics[0].message.contains("'int32'"));
    assert!(diagnostics[0].message.contains("'bool'"));
}

#[test]
fn nullable_operands_route_to_the_inner_type() {
    let mut b = AstBuilder::new("main.ql");
    let t1 = b.ty_name("int32");
    let n1 = b.ty_nullable(t1);
    let one = b.int("1");
    let v1 = b.let_var("a", Some(n1), Some(one));
    let a1 = b.name("a");
    let a2 = b.name("a");
    let sum = b.binary(a1, BinaryOp::Add, a2);
    let v2 = b.let_var("b", None, Some(sum));
    let body = b.block(vec![v1, v2]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![entry]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        var_type(&ctx, "b"),
        Some(ctx.native_type(quill_sema::NativeKind::Int32))
    );
}

#[test]
fn unary_operator_overloads_resolve_on_the_operand_type() {
    let mut b = AstBuilder::new("main.ql");
    let s = money_struct(&mut b);

    let ot = b.ty_name("Money");
    let ret_ty = b.ty_name("Money");
    let operand = b.param("value", ot);
    let body = b.block(vec![]);
    let neg = b.unary_operator(operand, UnaryOp::Negate, true, ret_ty, body);

    let hundred = b.number("100", NumberKind::Int64);
    let money = b.name("Money");
    let new = b.access(money, "new");
    let value = b.call(new, vec![hundred]);
    let negated = b.unary(UnaryOp::Negate, value);
    let v = b.let_var("v", None, Some(negated));
    let ebody = b.block(vec![v]);
    let entry = b.entry(vec![], ebody);
    let ast = b.program(&[], vec![s, neg, entry]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let money = ctx.lookup(ctx.global_scope, "Money").expect("Money exists");
    assert_eq!(var_type(&ctx, "v"), Some(Type::Base(money)));
}

#[test]
fn unary_operators_without_an_overload_are_reported() {
    let mut b = AstBuilder::new("main.ql");
    let one = b.int("1");
    let bad = b.unary(UnaryOp::Not, one);
    let stmt = b.expr_stmt(bad);
    let body = b.block(vec![stmt]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![entry]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::OPERATOR_NOT_FOUND);
}

#[test]
fn builtin_string_concatenation_resolves() {
    let mut b = AstBuilder::new("main.ql");
    let hello = b.string_lit("hello ");
    let world = b.string_lit("world");
    let joined = b.binary(hello, BinaryOp::Add, world);
    let v = b.let_var("s", None, Some(joined));
    let body = b.block(vec![v]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![entry]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        var_type(&ctx, "s"),
        Some(ctx.native_type(quill_sema::NativeKind::String))
    );
}
