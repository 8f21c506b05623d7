//! Highlighter errors.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("language `{0}` is not supported by this highlighter")]
    UnsupportedLanguage(String),
    #[error("failed to create highlighter: {0}")]
    Create(String),
    #[error("failed to render code frame: {0}")]
    Render(String),
}
