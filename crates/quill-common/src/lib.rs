//! Common types for the Quill semantic analyzer.
//!
//! This crate provides:
//! - `Span` - byte ranges into source text
//! - `LineCol` - 1-based line/column positions
//! - `SourceBuffer` - the per-file text queries the analyzer is allowed to make
//! - `Diagnostic` - analyzer diagnostics with stable numeric codes
//! - `AnalyzerOptions` - analysis-wide configuration

pub mod diagnostics;
pub mod options;
pub mod position;
pub mod source;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticList, Severity, codes};
pub use options::{AnalyzerOptions, PointerWidth};
pub use position::LineCol;
pub use source::SourceBuffer;
pub use span::Span;
