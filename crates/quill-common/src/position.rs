//! Line/column positions.
//!
//! The analyzer's AST uses byte offsets; diagnostics render 1-based
//! line/column pairs. `SourceBuffer` performs the conversion.

use serde::{Deserialize, Serialize};

/// A position in a source file, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    /// 1-based line number
    pub line: u32,
    /// 1-based column (byte offset from the line start)
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}
