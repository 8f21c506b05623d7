//! Source map decoding errors.

use thiserror::Error;

/// Why a source map could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SourceMapError {
    #[error("invalid source map JSON: {0}")]
    Json(String),
    #[error("unsupported source map version {0}, expected 3")]
    UnsupportedVersion(u32),
    #[error("invalid base64 VLQ character {character:?} on generated line {line}")]
    InvalidCharacter { character: char, line: usize },
    #[error("truncated VLQ value on generated line {line}")]
    Truncated { line: usize },
    #[error("VLQ value overflows on generated line {line}")]
    Overflow { line: usize },
    #[error("segment with {fields} fields on generated line {line}")]
    InvalidSegment { fields: usize, line: usize },
}
