//! Resolved positions and retrieved source texts.

use serde::Serialize;

/// Where a compiled position lands in original source.
///
/// Always fully populated. When no mapping is available the compiled
/// location is carried through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub original_file_path: String,
    /// 1-based.
    pub original_file_line: u32,
    /// 1-based.
    pub original_file_column: u32,
}

impl ResolvedLocation {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        ResolvedLocation {
            original_file_path: path.into(),
            original_file_line: line,
            original_file_column: column,
        }
    }
}

/// Best-effort pair of full file contents for one module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTexts {
    pub original_source_text: Option<String>,
    pub compiled_source_text: Option<String>,
}

impl SourceTexts {
    /// Both texts are present; no further retrieval is needed.
    pub fn is_complete(&self) -> bool {
        self.original_source_text.is_some() && self.compiled_source_text.is_some()
    }
}
