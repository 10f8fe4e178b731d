//! Semantic-analysis core for the Quill programming language.
//!
//! Quill's analyzer turns parsed ASTs for a set of source files into
//! resolved program trees: every name bound to a symbol, every expression
//! typed, every declaration checked against the language's structural,
//! mutability, and overload-resolution rules, with diagnostics carrying
//! precise source locations.
//!
//! Analysis runs in two globally-ordered phases over all files:
//!
//! 1. **Collector Pass A** per file (any order): scope construction and
//!    placeholder symbol insertion.
//! 2. **Collector Pass B** per file, after every Pass A: import
//!    resolution, type evaluation, signature completion, overload
//!    registration.
//! 3. **Resolver** per file, after every Pass B: the resolved trees.
//!
//! The analyzer is single-threaded with respect to a single program and
//! is used once, then discarded; lexing and parsing happen upstream.
//!
//! ```
//! use quill::{Analyzer, SourceFile};
//! use quill_ast::AstBuilder;
//! use quill_common::AnalyzerOptions;
//!
//! let mut b = AstBuilder::new("main.ql");
//! let one = b.int("1");
//! let two = b.int("2");
//! let sum = b.binary(one, quill_ast::BinaryOp::Add, two);
//! let decl = b.let_var("a", None, Some(sum));
//! let body = b.block(vec![decl]);
//! let entry = b.entry(vec![], body);
//! let ast = b.program(&[], vec![entry]);
//!
//! let analysis = Analyzer::new(AnalyzerOptions::default())
//!     .analyze(vec![SourceFile::new(ast)]);
//! assert!(!analysis.has_errors());
//! ```

use tracing::debug;

use quill_ast::Ast;
use quill_collector::{CollectedFile, Collector};
use quill_common::{AnalyzerOptions, DiagnosticList};
use quill_resolver::{ResolvedFile, Resolver};
use quill_sema::AnalysisContext;

pub use quill_ast as ast;
pub use quill_collector as collector;
pub use quill_common as common;
pub use quill_resolver as resolver;
pub use quill_sema as sema;

pub use quill_common::{AnalyzerOptions as Options, Diagnostic, Severity};

/// One parsed input file.
pub struct SourceFile {
    pub path: String,
    pub ast: Ast,
}

impl SourceFile {
    #[must_use]
    pub fn new(ast: Ast) -> Self {
        Self {
            path: ast.path.clone(),
            ast,
        }
    }
}

/// The result of analyzing a program: one resolved tree per input file,
/// the completed analysis context (symbols, scopes, types), and the three
/// diagnostic lists.
pub struct Analysis {
    pub files: Vec<ResolvedFile>,
    pub context: AnalysisContext,
    pub collector_diagnostics: DiagnosticList,
    pub resolver_diagnostics: DiagnosticList,
    /// Parser-derived diagnostics passed through by the embedder.
    pub parser_diagnostics: DiagnosticList,
}

impl Analysis {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.collector_diagnostics.is_empty()
            || !self.resolver_diagnostics.is_empty()
            || !self.parser_diagnostics.is_empty()
    }

    /// All diagnostics, collector first, then resolver, then parser.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.collector_diagnostics
            .iter()
            .chain(self.resolver_diagnostics.iter())
            .chain(self.parser_diagnostics.iter())
    }
}

/// The analysis pipeline.
pub struct Analyzer {
    options: AnalyzerOptions,
}

impl Analyzer {
    #[must_use]
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    /// Analyze a program with no upstream parser diagnostics.
    #[must_use]
    pub fn analyze(self, files: Vec<SourceFile>) -> Analysis {
        self.analyze_with_parser_diagnostics(files, DiagnosticList::new())
    }

    /// Analyze a program, carrying the parser's diagnostic list through
    /// to the result.
    #[must_use]
    pub fn analyze_with_parser_diagnostics(
        self,
        files: Vec<SourceFile>,
        parser_diagnostics: DiagnosticList,
    ) -> Analysis {
        let mut context = AnalysisContext::new(self.options);
        debug!(files = files.len(), "starting analysis");

        let mut collector = Collector::new(&mut context);
        let mut collected: Vec<CollectedFile> = files
            .iter()
            .map(|file| collector.collect_file(&file.ast))
            .collect();
        for (file, collected) in files.iter().zip(collected.iter_mut()) {
            collector.complete_file(&file.ast, collected);
        }
        let collector_diagnostics = std::mem::take(&mut collector.diagnostics);
        drop(collector);

        let mut resolver = Resolver::new(&mut context);
        let resolved: Vec<ResolvedFile> = files
            .iter()
            .zip(collected.iter())
            .map(|(file, collected)| resolver.resolve_file(&file.ast, collected))
            .collect();
        let resolver_diagnostics = std::mem::take(&mut resolver.diagnostics);
        drop(resolver);

        debug!(
            collector_diagnostics = collector_diagnostics.len(),
            resolver_diagnostics = resolver_diagnostics.len(),
            "analysis finished"
        );

        Analysis {
            files: resolved,
            context,
            collector_diagnostics,
            resolver_diagnostics,
            parser_diagnostics,
        }
    }
}
