//! Source buffers.
//!
//! The analyzer never re-lexes source text; the only queries it makes
//! against a buffer are character-at-offset, total length, substring for
//! a span, and line/column for an offset. `SourceBuffer` answers all four
//! over an in-memory string, with a newline index built once up front.

use crate::position::LineCol;
use crate::span::Span;

/// An in-memory source file with a precomputed newline index.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    path: String,
    text: String,
    /// Byte offset of the first character of each line.
    line_starts: Vec<u32>,
}

impl SourceBuffer {
    #[must_use]
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for nl in memchr::memchr_iter(b'\n', text.as_bytes()) {
            line_starts.push(nl as u32 + 1);
        }
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total length of the buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The character starting at a byte offset, if the offset is in bounds
    /// and on a character boundary.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(offset..).and_then(|s| s.chars().next())
    }

    /// The text covered by a span. Out-of-range or dummy spans yield "".
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        if span.is_dummy() {
            return "";
        }
        self.text
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    /// 1-based line and column of a byte offset.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        LineCol::new(
            line_idx as u32 + 1,
            offset - self.line_starts[line_idx] + 1,
        )
    }
}
