//! The source map JSON document.

use serde::{Deserialize, Serialize};

use crate::SourceMapError;

/// A source map exactly as produced by a transform.
///
/// `sources` entries may be `null` in the wild, so they are optional here and
/// skipped during lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl RawSourceMap {
    pub fn from_json(text: &str) -> Result<Self, SourceMapError> {
        serde_json::from_str(text).map_err(|e| SourceMapError::Json(e.to_string()))
    }

    /// Embedded content of the first source, if the map carries it.
    pub fn first_source_content(&self) -> Option<&str> {
        self.sources_content
            .as_ref()?
            .first()?
            .as_deref()
    }

    /// Source name at `index` with `sourceRoot` applied.
    pub fn resolved_source(&self, index: usize) -> Option<String> {
        let source = self.sources.get(index)?.as_deref()?;
        let root = self.source_root.as_deref().unwrap_or_default();
        if root.is_empty() || source.contains("://") || source.starts_with('/') {
            return Some(source.to_owned());
        }
        if root.ends_with('/') {
            Some(format!("{root}{source}"))
        } else {
            Some(format!("{root}/{source}"))
        }
    }
}

#[cfg(test)]
mod tests;
