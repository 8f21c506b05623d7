//! Syntax highlighting for overlay code frames.
//!
//! The highlighter is a collaborator the overlay only talks to through
//! [`Highlighter`]: text plus a language plus a line to mark goes in,
//! markup comes out. [`HtmlHighlighter`] is the built-in implementation.
//!
//! Highlighters are expensive to build, so they live in a [`HighlighterCache`]
//! that creates the instance on first use and loads languages as they are
//! requested. The cache is passed explicitly to whoever renders frames;
//! [`shared_html_highlighter`] is the process-wide instance for callers that
//! do not need their own.

mod cache;
mod error;
mod html;
mod lang;

use std::future::Future;

pub use cache::{shared_html_highlighter, HighlighterCache, HighlighterFactory};
pub use error::HighlightError;
pub use html::{HtmlHighlighter, HtmlHighlighterFactory};
pub use lang::{infer_language, Language};

/// Light and dark theme names handed to the highlighter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Themes {
    pub light: String,
    pub dark: String,
}

impl Default for Themes {
    fn default() -> Self {
        Themes {
            light: "github-light".to_owned(),
            dark: "github-dark".to_owned(),
        }
    }
}

/// Per-call rendering options.
#[derive(Clone, Copy, Debug)]
pub struct HighlightOptions<'a> {
    pub lang: Language,
    pub themes: &'a Themes,
    /// Line number of the first line of the snippet (1-based).
    pub start_line: u32,
    /// Absolute line number to mark as the erroring line.
    pub highlight_line: Option<u32>,
}

/// Turns text into highlighted markup.
pub trait Highlighter: Send + Sync {
    /// Make `lang` available. Called once per language by the cache.
    fn load_language(&self, lang: Language) -> Result<(), HighlightError>;

    fn code_to_html(
        &self,
        code: &str,
        options: &HighlightOptions<'_>,
    ) -> impl Future<Output = Result<String, HighlightError>> + Send;
}
