//! The record handed to the error overlay.

use serde::{Deserialize, Serialize};

/// Location and plugin attribution reported by the build pipeline itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViteErrorData {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
    #[serde(default)]
    pub plugin: Option<String>,
}

impl ViteErrorData {
    /// The reported position, if it is complete and 1-based.
    pub fn position(&self) -> Option<(&str, u32, u32)> {
        let file = self.file.as_deref().filter(|f| !f.is_empty())?;
        let line = self.line.filter(|l| *l > 0)?;
        let column = self.column.filter(|c| *c > 0)?;
        Some((file, line, column))
    }
}

/// Terminal record of one request.
///
/// Serialized to the overlay verbatim. Fields that could not be determined
/// default to an empty string or 0; highlighted frames are `None` when the
/// highlighter failed or there was nothing to highlight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProcessingResult {
    pub name: String,
    pub message: String,

    pub compiled_file_path: String,
    pub compiled_line: u32,
    pub compiled_column: u32,

    pub original_file_path: String,
    pub original_line: u32,
    pub original_column: u32,

    pub original_snippet: String,
    pub compiled_snippet: String,
    pub original_code_frame_content: Option<String>,
    pub compiled_code_frame_content: Option<String>,

    pub original_stack: String,
    pub compiled_stack: String,

    /// More than one signals an aggregate.
    pub error_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    pub fix_prompt: String,
}
