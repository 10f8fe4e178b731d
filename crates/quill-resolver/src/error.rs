//! The resolver's per-declaration error type.

use thiserror::Error;

use quill_common::{Diagnostic, Span};
use quill_collector::CollectError;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub code: u32,
    pub message: String,
    pub span: Option<Span>,
}

impl ResolveError {
    #[must_use]
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: None,
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
    pub fn into_diagnostic(self, file: &str, working_dir: Option<&str>) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code, file, self.message);
        if let Some(span) = self.span {
            diag = diag.with_span(span);
        }
        if let Some(dir) = working_dir {
            diag = diag.with_working_dir(dir);
        }
        diag
    }
}

impl From<CollectError> for ResolveError {
    fn from(error: CollectError) -> Self {
        Self {
            code: error.code,
            message: error.message,
            span: error.span,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
