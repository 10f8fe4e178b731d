//! Tests for Pass B import resolution: single, aggregate, and wildcard
//! imports, per-item aliases, grouping aliases, and failure cases.

use quill_ast::{Ast, AstBuilder};
use quill_collector::{CollectedFile, Collector};
use quill_common::{AnalyzerOptions, Diagnostic, codes};
use quill_sema::{AnalysisContext, Symbol};

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

/// `module a` with `fun foo()` and `fun bar()`.
fn provider_module() -> Ast {
    let mut b = AstBuilder::new("a.ql");
    let foo_body = b.block(vec![]);
    let foo = b.function("foo", vec![], None, foo_body);
    let bar_body = b.block(vec![]);
    let bar = b.function("bar", vec![], None, bar_body);
    b.program(&["a"], vec![foo, bar])
}

#[test]
fn single_import_binds_the_symbol_directly() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_single(&["a"], "foo", None);
    let ast = b.program(&["b"], vec![import]);

    let (ctx, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    assert_eq!(table.len(), 1);
    let foo = table.get("foo").copied().expect("foo imported");
    assert!(matches!(ctx.symbol(foo), Symbol::Function(_)));
}

#[test]
fn aliased_single_import_chases_to_the_target() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_single(&["a"], "foo", Some("renamed"));
    let ast = b.program(&["b"], vec![import]);

    let (ctx, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    assert!(table.get("foo").is_none());
    let renamed = table.get("renamed").copied().expect("alias imported");
    assert!(matches!(ctx.symbol(renamed), Symbol::Alias(_)));
    let target = ctx.symbols.chase_alias(renamed);
    assert!(matches!(ctx.symbol(target), Symbol::Function(f) if f.name == "foo"));
}

#[test]
fn wildcard_import_copies_every_symbol() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_wildcard(&["a"], None);
    let ast = b.program(&["b"], vec![import]);

    let (_, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    assert!(table.contains_key("foo"));
    assert!(table.contains_key("bar"));
}

#[test]
fn wildcard_grouping_alias_hides_the_members_behind_one_name() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_wildcard(&["a"], Some("A"));
    let ast = b.program(&["b"], vec![import]);

    let (ctx, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    // The outer table holds only the grouping name.
    assert_eq!(table.len(), 1);
    let group = table.get("A").copied().expect("grouping imported");
    let Symbol::ImportGroup(group) = ctx.symbol(group) else {
        panic!("expected an import grouping");
    };
    assert!(group.table.contains_key("foo"));
    assert!(group.table.contains_key("bar"));
}

#[test]
fn aggregate_import_preserves_per_item_aliases() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_aggregate(&["a"], &[("foo", None), ("bar", Some("baz"))], None);
    let ast = b.program(&["b"], vec![import]);

    let (ctx, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    assert!(table.contains_key("foo"));
    assert!(table.contains_key("baz"));
    assert!(!table.contains_key("bar"));
    let baz = ctx.symbols.chase_alias(table["baz"]);
    assert!(matches!(ctx.symbol(baz), Symbol::Function(f) if f.name == "bar"));
}

#[test]
fn aggregate_grouping_alias_wraps_the_items() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_aggregate(&["a"], &[("foo", None)], Some("G"));
    let ast = b.program(&["b"], vec![import]);

    let (ctx, collected, diagnostics) = analyze(&[provider_module(), ast]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let table = &collected[1].import_table;
    assert_eq!(table.len(), 1);
    let Symbol::ImportGroup(group) = ctx.symbol(table["G"]) else {
        panic!("expected an import grouping");
    };
    assert!(group.table.contains_key("foo"));
    assert!(!group.table.contains_key("bar"));
}

#[test]
fn missing_module_segment_is_reported() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_single(&["nope"], "foo", None);
    let ast = b.program(&["b"], vec![import]);

    let (_, _, diagnostics) = analyze(&[provider_module(), ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::MODULE_NOT_FOUND);
    assert!(diagnostics[0].message.contains("could not find a module named 'nope'"));
}

#[test]
fn missing_import_target_is_reported() {
    let mut b = AstBuilder::new("b.ql");
    let import = b.import_single(&["a"], "nope", None);
    let ast = b.program(&["b"], vec![import]);

    let (_, _, diagnostics) = analyze(&[provider_module(), ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::UNRESOLVED_NAME);
    assert!(diagnostics[0].message.contains("'nope'"));
}

#[test]
fn import_failure_does_not_block_other_files() {
    let mut b1 = AstBuilder::new("b.ql");
    let bad = b1.import_single(&["nope"], "foo", None);
    let ast1 = b1.program(&["b"], vec![bad]);

    let mut b2 = AstBuilder::new("c.ql");
    let good = b2.import_single(&["a"], "foo", None);
    let ast2 = b2.program(&["c"], vec![good]);

    let (_, collected, diagnostics) = analyze(&[provider_module(), ast1, ast2]);
    assert_eq!(diagnostics.len(), 1);
    assert!(collected[2].import_table.contains_key("foo"));
}

#[test]
fn colliding_imports_are_reported() {
    let mut b = AstBuilder::new("b.ql");
    let first = b.import_single(&["a"], "foo", None);
    let second = b.import_single(&["a"], "bar", Some("foo"));
    let ast = b.program(&["b"], vec![first, second]);

    let (_, _, diagnostics) = analyze(&[provider_module(), ast]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::DUPLICATE_DECLARATION);
    assert!(diagnostics[0].message.contains("already imported"));
}
