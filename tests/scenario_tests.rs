//! End-to-end analysis scenarios driving the full pipeline through the
//! `Analyzer` facade.

use quill::{Analyzer, SourceFile};
use quill_ast::{Ast, AstBuilder, BinaryOp, FieldMutability, NumberKind, StmtId, StructMutability};
use quill_common::{AnalyzerOptions, codes};
use quill_sema::{AnalysisContext, NativeKind, Symbol, Type};

fn analyze(asts: Vec<Ast>) -> quill::Analysis {
    let files = asts.into_iter().map(SourceFile::new).collect();
    Analyzer::new(AnalyzerOptions::default()).analyze(files)
}

fn var_type(ctx: &AnalysisContext, name: &str) -> Option<Type> {
    ctx.symbols.iter().find_map(|(_, s)| match s {
        Symbol::Var(v) if v.name == name => v.ty.clone(),
        _ => None,
    })
}

/// Scenario A: overloaded free functions.
#[test]
fn overloaded_free_functions() {
    let mut b = AstBuilder::new("main.ql");

    let t1 = b.ty_name("int");
    let t2 = b.ty_name("int");
    let r1 = b.ty_name("int");
    let x1 = b.name("x");
    let y1 = b.name("y");
    let s1 = b.binary(x1, BinaryOp::Add, y1);
    let ret1 = b.ret(Some(s1));
    let body1 = b.block(vec![ret1]);
    let p1 = b.param("x", t1);
    let p2 = b.param("y", t2);
    let add_int = b.function("add", vec![p1, p2], Some(r1), body1);

    let t3 = b.ty_name("float");
    let t4 = b.ty_name("float");
    let r2 = b.ty_name("float");
    let x2 = b.name("x");
    let y2 = b.name("y");
    let s2 = b.binary(x2, BinaryOp::Add, y2);
    let ret2 = b.ret(Some(s2));
    let body2 = b.block(vec![ret2]);
    let p3 = b.param("x", t3);
    let p4 = b.param("y", t4);
    let add_float = b.function("add", vec![p3, p4], Some(r2), body2);

    let one = b.int("1");
    let two = b.int("2");
    let add1 = b.name("add");
    let call1 = b.call(add1, vec![one, two]);
    let a = b.let_var("a", None, Some(call1));
    let f1 = b.number("1.0", NumberKind::Float32);
    let f2 = b.number("2.0", NumberKind::Float32);
    let add2 = b.name("add");
    let call2 = b.call(add2, vec![f1, f2]);
    let bv = b.let_var("b", None, Some(call2));
    let body = b.block(vec![a, bv]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![add_int, add_float, entry]);

    let analysis = analyze(vec![ast]);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics().collect::<Vec<_>>());
    let ctx = &analysis.context;
    assert_eq!(var_type(ctx, "a"), Some(ctx.native_type(NativeKind::Int32)));
    assert_eq!(
        var_type(ctx, "b"),
        Some(ctx.native_type(NativeKind::Float32))
    );
}

/// Scenario B: duplicate signature diagnostic.
#[test]
fn duplicate_signature_diagnostic() {
    let mut b = AstBuilder::new("main.ql");
    let t1 = b.ty_name("int");
    let x = b.name("x");
    let ret1 = b.ret(Some(x));
    let body1 = b.block(vec![ret1]);
    let p1 = b.param("x", t1);
    let f1 = b.function("f", vec![p1], None, body1);
    let t2 = b.ty_name("int");
    let y = b.name("y");
    let ret2 = b.ret(Some(y));
    let body2 = b.block(vec![ret2]);
    let p2 = b.param("y", t2);
    let f2 = b.function("f", vec![p2], None, body2);
    let ast = b.program(&[], vec![f1, f2]);

    let analysis = analyze(vec![ast]);
    let diagnostics: Vec<_> = analysis.collector_diagnostics.iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "Function signature matches existing function signature"
    );
}

fn vec2_struct(b: &mut AstBuilder, field_mutability: FieldMutability) -> StmtId {
    let tx = b.ty_name("float");
    let ty = b.ty_name("float");
    let fx = b.field("x", field_mutability, false, Some(tx), None);
    let fy = b.field("y", field_mutability, false, Some(ty), None);
    let tpx = b.ty_name("float");
    let tpy = b.ty_name("float");
    let px = b.param("x", tpx);
    let py = b.param("y", tpy);
    let this1 = b.this();
    let ax = b.access(this1, "x");
    let xr = b.name("x");
    let set_x = b.assign(ax, xr);
    let sx = b.expr_stmt(set_x);
    let this2 = b.this();
    let ay = b.access(this2, "y");
    let yr = b.name("y");
    let set_y = b.assign(ay, yr);
    let sy = b.expr_stmt(set_y);
    let ctor_body = b.block(vec![sx, sy]);
    let ctor = b.constructor(vec![px, py], ctor_body);
    b.struct_stmt("Vec2", StructMutability::Mutable, vec![fx, fy, ctor])
}

/// Scenario C: struct with constructor and the field mutation rule.
#[test]
fn struct_constructor_and_field_mutation() {
    // With var fields, construction and later mutation both work.
    let mut b = AstBuilder::new("main.ql");
    let s = vec2_struct(&mut b, FieldMutability::Mutable);
    let x = b.number("1.0", NumberKind::Float32);
    let y = b.number("2.0", NumberKind::Float32);
    let vec2 = b.name("Vec2");
    let new = b.access(vec2, "new");
    let call = b.call(new, vec![x, y]);
    let v = b.let_var("v", None, Some(call));
    let vr = b.name("v");
    let vx = b.access(vr, "x");
    let zero = b.number("0.0", NumberKind::Float32);
    let mutate = b.assign(vx, zero);
    let ms = b.expr_stmt(mutate);
    let body = b.block(vec![v, ms]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![s, entry]);

    let analysis = analyze(vec![ast]);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics().collect::<Vec<_>>());

    // With let fields, the constructor assignments stay accepted but the
    // later mutation is rejected.
    let mut b = AstBuilder::new("main.ql");
    let s = vec2_struct(&mut b, FieldMutability::Immutable);
    let x = b.number("1.0", NumberKind::Float32);
    let y = b.number("2.0", NumberKind::Float32);
    let vec2 = b.name("Vec2");
    let new = b.access(vec2, "new");
    let call = b.call(new, vec![x, y]);
    let v = b.let_var("v", None, Some(call));
    let vr = b.name("v");
    let vx = b.access(vr, "x");
    let zero = b.number("0.0", NumberKind::Float32);
    let mutate = b.assign(vx, zero);
    let ms = b.expr_stmt(mutate);
    let body = b.block(vec![v, ms]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![s, entry]);

    let analysis = analyze(vec![ast]);
    let diagnostics: Vec<_> = analysis.resolver_diagnostics.iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "immutable fields cannot be modified outside of a constructor"
    );
}

/// Scenario D: wildcard import with a grouping alias.
#[test]
fn wildcard_import_with_grouping_alias() {
    let mut b1 = AstBuilder::new("a.ql");
    let one = b1.int("1");
    let ret = b1.ret(Some(one));
    let r = b1.ty_name("int");
    let body = b1.block(vec![ret]);
    let foo = b1.function("foo", vec![], Some(r), body);
    let ast1 = b1.program(&["a"], vec![foo]);

    let mut b2 = AstBuilder::new("b.ql");
    let import = b2.import_wildcard(&["a"], Some("A"));
    let a_ref = b2.name("A");
    let foo_access = b2.access(a_ref, "foo");
    let call = b2.call(foo_access, vec![]);
    let stmt = b2.expr_stmt(call);
    let body = b2.block(vec![stmt]);
    let entry = b2.entry(vec![], body);
    let ast2 = b2.program(&["b"], vec![import, entry]);

    let analysis = analyze(vec![ast1, ast2]);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics().collect::<Vec<_>>());
}

/// Scenario E: operator overload resolution.
#[test]
fn operator_overload_resolution() {
    let mut b = AstBuilder::new("main.ql");
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
    let s = b.struct_stmt("Money", StructMutability::Mutable, vec![cents, ctor]);

    let lt = b.ty_name("Money");
    let rt = b.ty_name("Money");
    let ret_ty = b.ty_name("Money");
    let l = b.param("l", lt);
    let r = b.param("r", rt);
    let lr = b.name("l");
    let lc = b.access(lr, "cents");
    let rr = b.name("r");
    let rc = b.access(rr, "cents");
    let sum = b.binary(lc, BinaryOp::Add, rc);
    let money = b.name("Money");
    let new = b.access(money, "new");
    let call = b.call(new, vec![sum]);
    let ret = b.ret(Some(call));
    let op_body = b.block(vec![ret]);
    let op = b.binary_operator(l, BinaryOp::Add, r, ret_ty, op_body);

    let h = b.number("100", NumberKind::Int64);
    let m1 = b.name("Money");
    let n1 = b.access(m1, "new");
    let lhs = b.call(n1, vec![h]);
    let q = b.number("250", NumberKind::Int64);
    let m2 = b.name("Money");
    let n2 = b.access(m2, "new");
    let rhs = b.call(n2, vec![q]);
    let total_sum = b.binary(lhs, BinaryOp::Add, rhs);
    let total = b.let_var("total", None, Some(total_sum));
    let body = b.block(vec![total]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![s, op, entry]);

    let analysis = analyze(vec![ast]);
    assert!(!analysis.has_errors(), "{:?}", analysis.diagnostics().collect::<Vec<_>>());
    let ctx = &analysis.context;
    let money = ctx.lookup(ctx.global_scope, "Money").expect("Money exists");
    assert_eq!(var_type(ctx, "total"), Some(Type::Base(money)));
}

/// Scenario F: constant initializers must be constant.
#[test]
fn constant_initializer_must_be_constant() {
    let mut b = AstBuilder::new("main.ql");
    let three = b.int("3");
    let n = b.let_var("n", None, Some(three));
    let t = b.ty_name("int");
    let nr = b.name("n");
    let one = b.int("1");
    let sum = b.binary(nr, BinaryOp::Add, one);
    let k = b.const_stmt("k", Some(t), sum);
    let body = b.block(vec![n, k]);
    let entry = b.entry(vec![], body);
    let ast = b.program(&[], vec![entry]);

    let analysis = analyze(vec![ast]);
    let diagnostics: Vec<_> = analysis.resolver_diagnostics.iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::CONSTANCY_VIOLATION);
    assert_eq!(
        diagnostics[0].message,
        "Constant initializer must be a compile-time constant expression"
    );
    let ctx = &analysis.context;
    assert_eq!(var_type(ctx, "n"), Some(ctx.native_type(NativeKind::Int32)));
}
