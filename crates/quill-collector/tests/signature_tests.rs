//! Tests for Pass B signature completion: overload registration,
//! duplicate-signature detection, parameter shape rules, `this`
//! synthesis, and type evaluation.

use quill_ast::{Ast, AstBuilder, BinaryOp, StructMutability};
use quill_collector::{
    CollectedFile, Collector, overloads_of, resolve_type, signature_matches,
};
use quill_common::{AnalyzerOptions, Diagnostic, codes};
use quill_sema::{AnalysisContext, NativeKind, Symbol, SymbolId, Type};

fn analyze(asts: &[Ast]) -> (AnalysisContext, Vec<CollectedFile>, Vec<Diagnostic>) {
    let mut ctx = AnalysisContext::new(AnalyzerOptions::default());
    let mut collector = Collector::new(&mut ctx);
    let mut collected: Vec<CollectedFile> =
        asts.iter().map(|ast| collector.collect_file(ast)).collect();
    for (ast, file) in asts.iter().zip(collected.iter_mut()) {
        collector.complete_file(ast, file);
    }
    let diagnostics = collector.diagnostics.iter().cloned().collect();
    drop(collector);
    (ctx, collected, diagnostics)
}

fn find_function(ctx: &AnalysisContext, name: &str) -> SymbolId {
    ctx.symbols
        .iter()
        .find_map(|(id, s)| match s {
            Symbol::Function(f) if f.name == name => Some(id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function named '{name}'"))
}

#[test]
fn identical_signatures_are_reported_once() {
    // fun f(x:int) => x
    // fun f(y:int) => y  -- parameter names are irrelevant
    let mut b = AstBuilder::new("a.ql");
    let t1 = b.ty_name("int");
    let p1 = b.param("x", t1);
    let body1 = b.block(vec![]);
    let f1 = b.function("f", vec![p1], None, body1);
    let t2 = b.ty_name("int");
    let p2 = b.param("y", t2);
    let body2 = b.block(vec![]);
    let f2 = b.function("f", vec![p2], None, body2);
    let ast = b.program(&[], vec![f1, f2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIGNATURE_MATCHES_EXISTING);
    assert_eq!(
        diagnostics[0].message,
        "Function signature matches existing function signature"
    );
}

#[test]
fn return_type_is_not_part_of_the_signature() {
    let mut b = AstBuilder::new("a.ql");
    let t1 = b.ty_name("int");
    let r1 = b.ty_name("int");
    let p1 = b.param("x", t1);
    let body1 = b.block(vec![]);
    let f1 = b.function("f", vec![p1], Some(r1), body1);
    let t2 = b.ty_name("int");
    let r2 = b.ty_name("float");
    let p2 = b.param("x", t2);
    let body2 = b.block(vec![]);
    let f2 = b.function("f", vec![p2], Some(r2), body2);
    let ast = b.program(&[], vec![f1, f2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIGNATURE_MATCHES_EXISTING);
}

#[test]
fn distinct_signatures_join_the_overload_list() {
    let mut b = AstBuilder::new("a.ql");
    let t1 = b.ty_name("int");
    let p1 = b.param("x", t1);
    let body1 = b.block(vec![]);
    let f1 = b.function("f", vec![p1], None, body1);
    let t2 = b.ty_name("float");
    let p2 = b.param("x", t2);
    let body2 = b.block(vec![]);
    let f2 = b.function("f", vec![p2], None, body2);
    let ast = b.program(&[], vec![f1, f2]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let f = find_function(&ctx, "f");
    let overloads = overloads_of(&ctx, f);
    assert_eq!(overloads.len(), 1);
    // Every retained pair has distinct signatures.
    assert!(!signature_matches(&ctx, f, overloads[0]));
}

#[test]
fn type_aliases_participate_in_signature_identity() {
    // def Id = int32; fun f(x:Id) collides with fun f(x:int32).
    let mut b = AstBuilder::new("a.ql");
    let target = b.ty_name("int32");
    let def = b.define("Id", target);
    let t1 = b.ty_name("Id");
    let p1 = b.param("x", t1);
    let body1 = b.block(vec![]);
    let f1 = b.function("f", vec![p1], None, body1);
    let t2 = b.ty_name("int32");
    let p2 = b.param("x", t2);
    let body2 = b.block(vec![]);
    let f2 = b.function("f", vec![p2], None, body2);
    let ast = b.program(&[], vec![def, f1, f2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIGNATURE_MATCHES_EXISTING);
}

#[test]
fn variadic_parameter_must_be_last() {
    let mut b = AstBuilder::new("a.ql");
    let tv = b.ty_name("int32");
    let tva = b.ty_array(tv);
    let mut rest = b.param("rest", tva);
    rest.variadic = true;
    let t2 = b.ty_name("int32");
    let after = b.param("after", t2);
    let body = b.block(vec![]);
    let f = b.function("f", vec![rest, after], None, body);
    let ast = b.program(&[], vec![f]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::PARAMETER_SHAPE);
    assert!(diagnostics[0].message.contains("must be the last parameter"));
}

#[test]
fn variadic_parameter_must_have_an_array_type() {
    let mut b = AstBuilder::new("a.ql");
    let tv = b.ty_name("int32");
    let mut rest = b.param("rest", tv);
    rest.variadic = true;
    let body = b.block(vec![]);
    let f = b.function("f", vec![rest], None, body);
    let ast = b.program(&[], vec![f]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::PARAMETER_SHAPE);
    assert!(diagnostics[0].message.contains("array type"));
}

#[test]
fn parameters_after_a_default_must_have_defaults() {
    let mut b = AstBuilder::new("a.ql");
    let t1 = b.ty_name("int32");
    let zero = b.int("0");
    let mut first = b.param("first", t1);
    first.default = Some(zero);
    let t2 = b.ty_name("int32");
    let second = b.param("second", t2);
    let body = b.block(vec![]);
    let f = b.function("f", vec![first, second], None, body);
    let ast = b.program(&[], vec![f]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::PARAMETER_SHAPE);
    assert!(diagnostics[0].message.contains("default"));
}

#[test]
fn unresolved_parameter_type_reports_but_does_not_abort() {
    let mut b = AstBuilder::new("a.ql");
    let t = b.ty_name("Mystery");
    let p = b.param("x", t);
    let body = b.block(vec![]);
    let f = b.function("f", vec![p], None, body);
    let ast = b.program(&[], vec![f]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::UNRESOLVED_TYPE);
    assert_eq!(
        diagnostics[0].message,
        "could not find a type named 'Mystery'"
    );
    // The function itself was still registered.
    find_function(&ctx, "f");
}

#[test]
fn constructors_get_a_synthesized_this() {
    let mut b = AstBuilder::new("a.ql");
    let t = b.ty_name("float32");
    let p = b.param("x", t);
    let body = b.block(vec![]);
    let ctor = b.constructor(vec![p], body);
    let s = b.struct_stmt("Vec1", StructMutability::Mutable, vec![ctor]);
    let ast = b.program(&[], vec![s]);

    let (ctx, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let (params, owner) = ctx
        .symbols
        .iter()
        .find_map(|(_, s)| match s {
            Symbol::Constructor(c) => Some((c.params.clone(), c.owner)),
            _ => None,
        })
        .expect("constructor was completed");
    assert_eq!(params.len(), 2);
    let Symbol::Parameter(this) = ctx.symbol(params[0]) else {
        panic!("expected a parameter");
    };
    assert_eq!(this.name, "this");
    assert_eq!(this.index, 0);
    assert_eq!(this.ty, Some(Type::reference(Type::Base(owner), false)));
}

#[test]
fn second_destructor_is_rejected() {
    let mut b = AstBuilder::new("a.ql");
    let body1 = b.block(vec![]);
    let d1 = b.destructor(body1);
    let body2 = b.block(vec![]);
    let d2 = b.destructor(body2);
    let s = b.struct_stmt("S", StructMutability::Mutable, vec![d1, d2]);
    let ast = b.program(&[], vec![s]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::DUPLICATE_DECLARATION);
    assert!(diagnostics[0].message.contains("destructor"));
}

#[test]
fn second_entry_point_is_rejected() {
    let mut b1 = AstBuilder::new("a.ql");
    let body1 = b1.block(vec![]);
    let e1 = b1.entry(vec![], body1);
    let ast1 = b1.program(&[], vec![e1]);

    let mut b2 = AstBuilder::new("b.ql");
    let body2 = b2.block(vec![]);
    let e2 = b2.entry(vec![], body2);
    let ast2 = b2.program(&["other"], vec![e2]);

    let (_, _, diagnostics) = analyze(&[ast1, ast2]);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("entry point"));
}

#[test]
fn identical_cast_signatures_collide() {
    let mut b = AstBuilder::new("a.ql");
    let pt1 = b.ty_name("int32");
    let rt1 = b.ty_name("float32");
    let p1 = b.param("value", pt1);
    let body1 = b.block(vec![]);
    let c1 = b.cast(false, p1, rt1, body1);
    let pt2 = b.ty_name("int32");
    let rt2 = b.ty_name("float32");
    let p2 = b.param("value", pt2);
    let body2 = b.block(vec![]);
    let c2 = b.cast(false, p2, rt2, body2);
    let ast = b.program(&[], vec![c1, c2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIGNATURE_MATCHES_EXISTING);
    assert!(diagnostics[0].message.contains("Cast signature"));
}

#[test]
fn implicit_and_explicit_casts_do_not_collide() {
    let mut b = AstBuilder::new("a.ql");
    let pt1 = b.ty_name("int32");
    let rt1 = b.ty_name("float32");
    let p1 = b.param("value", pt1);
    let body1 = b.block(vec![]);
    let c1 = b.cast(false, p1, rt1, body1);
    let pt2 = b.ty_name("int32");
    let rt2 = b.ty_name("float32");
    let p2 = b.param("value", pt2);
    let body2 = b.block(vec![]);
    let c2 = b.cast(true, p2, rt2, body2);
    let ast = b.program(&[], vec![c1, c2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn identical_operator_signatures_collide() {
    let mut b = AstBuilder::new("a.ql");
    let s = b.struct_stmt("Money", StructMutability::Mutable, vec![]);
    let lt1 = b.ty_name("Money");
    let rt1 = b.ty_name("Money");
    let ret1 = b.ty_name("Money");
    let l1 = b.param("l", lt1);
    let r1 = b.param("r", rt1);
    let body1 = b.block(vec![]);
    let o1 = b.binary_operator(l1, BinaryOp::Add, r1, ret1, body1);
    let lt2 = b.ty_name("Money");
    let rt2 = b.ty_name("Money");
    let ret2 = b.ty_name("Money");
    let l2 = b.param("a", lt2);
    let r2 = b.param("b", rt2);
    let body2 = b.block(vec![]);
    let o2 = b.binary_operator(l2, BinaryOp::Add, r2, ret2, body2);
    let ast = b.program(&[], vec![s, o1, o2]);

    let (_, _, diagnostics) = analyze(&[ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIGNATURE_MATCHES_EXISTING);
    assert!(diagnostics[0].message.contains("Operator signature"));
}

#[test]
fn resolved_types_print_in_source_form() {
    // ResolveType over the printed forms reproduces the same type.
    let (ctx, collected, _) = analyze(&[AstBuilder::new("a.ql").program(&[], vec![])]);
    let imports = &collected[0].import_table;
    let mut b = AstBuilder::new("t.ql");
    let base = b.ty_name("int32");
    let array = b.ty_array(base);
    let nullable = b.ty_nullable(array);
    let ast = b.program(&[], vec![]);

    let ty = resolve_type(&ctx, ctx.global_scope, imports, &ast, nullable).expect("resolves");
    assert_eq!(ty.display(&ctx.symbols).to_string(), "int32[]?");
    assert_eq!(
        ty,
        Type::nullable(Type::array(ctx.native_type(NativeKind::Int32)))
    );
}
