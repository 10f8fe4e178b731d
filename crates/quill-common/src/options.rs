//! Analysis-wide configuration.

use serde::{Deserialize, Serialize};

/// Pointer width of the compilation target.
///
/// Drives the `nint`/`nuint` native-width integer aliases.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerWidth {
    Bits32,
    #[default]
    Bits64,
}

/// Configuration for one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    /// Target pointer width; `nint`/`nuint` alias the matching fixed-width
    /// integer natives.
    pub pointer_width: PointerWidth,
    /// Working directory recorded on collector/resolver diagnostics.
    pub working_dir: Option<String>,
}

impl AnalyzerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
