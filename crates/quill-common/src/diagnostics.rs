//! Analyzer diagnostics.
//!
//! Each recoverable analysis error produces exactly one `Diagnostic`. The
//! analyzer keeps three separate lists: collector diagnostics, resolver
//! diagnostics, and the parser-derived list passed in by the embedder.

use serde::Serialize;

use crate::source::SourceBuffer;
use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Stable numeric codes for analyzer diagnostics.
pub mod codes {
    pub const DUPLICATE_DECLARATION: u32 = 1001;
    pub const SIGNATURE_MATCHES_EXISTING: u32 = 1002;
    pub const UNRESOLVED_TYPE: u32 = 1003;
    pub const MODULE_NOT_FOUND: u32 = 1004;
    pub const UNRESOLVED_NAME: u32 = 1005;
    pub const CONTEXT_ERROR: u32 = 1006;
    pub const MUTABILITY_VIOLATION: u32 = 1007;
    pub const CONSTANCY_VIOLATION: u32 = 1008;
    pub const OPERATOR_NOT_FOUND: u32 = 1009;
    pub const AMBIGUOUS_INVOCATION: u32 = 1010;
    pub const PARAMETER_SHAPE: u32 = 1011;
    pub const TYPE_NOT_INFERRED: u32 = 1012;
    pub const INVALID_ASSIGNMENT_TARGET: u32 = 1013;
    pub const INVALID_CALL_TARGET: u32 = 1014;
    pub const INVALID_OPERATOR_DECLARATION: u32 = 1015;
    pub const NO_MATCHING_OVERLOAD: u32 = 1016;
    /// Bug-class internal invariant violations (scope stack imbalance).
    pub const INTERNAL: u32 = 1099;
}

/// A single analyzer diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: u32,
    /// Path of the file the diagnostic belongs to.
    pub file: String,
    /// Working directory the analysis ran under, when known.
    pub working_dir: Option<String>,
    /// Source range, when a token or node is known.
    pub span: Option<Span>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: u32, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            file: file.into(),
            working_dir: None,
            span: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if !span.is_dummy() {
            self.span = Some(span);
        }
        self
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Render the message with its location prefix.
    ///
    /// When the span is known this is `[line L, column C at 'text'] message`;
    /// without a span the bare message is returned.
    #[must_use]
    pub fn rendered(&self, buffer: &SourceBuffer) -> String {
        match self.span {
            Some(span) => {
                let pos = buffer.line_col(span.start);
                format!(
                    "[line {}, column {} at '{}'] {}",
                    pos.line,
                    pos.column,
                    buffer.slice(span),
                    self.message
                )
            }
            None => self.message.clone(),
        }
    }
}

/// An append-only list of diagnostics for one phase.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DiagnosticList {
    items: Vec<Diagnostic>,
}

impl DiagnosticList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }
}

impl IntoIterator for DiagnosticList {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
