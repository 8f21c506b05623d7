//! Code frames: the snippet around an error line, highlighted.

mod prompt;

use overlay_highlight::{
    infer_language, HighlightOptions, Highlighter, HighlighterCache, HighlighterFactory, Language,
};

pub use prompt::{
    build_fix_prompt, DefaultPromptGenerator, FixPromptGenerator, PromptContext, PromptSnippets,
};

/// Lines cut out of a source text around an error line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Line number of the first line of `text` (1-based).
    pub start_line: u32,
    /// The erroring line (1-based, absolute).
    pub error_line: u32,
}

/// The lines of `source` within `context` of `line`, or `None` when `line`
/// is 0 or past the end.
pub fn extract_snippet(source: &str, line: u32, context: u32) -> Option<Snippet> {
    let index = usize::try_from(line.checked_sub(1)?).ok()?;
    let lines: Vec<&str> = source.lines().collect();
    if index >= lines.len() {
        return None;
    }
    let context = usize::try_from(context).unwrap_or(usize::MAX);
    let start = index.saturating_sub(context);
    let end = index.saturating_add(context).min(lines.len() - 1);
    Some(Snippet {
        text: lines[start..=end].join("\n"),
        start_line: u32::try_from(start + 1).ok()?,
        error_line: line,
    })
}

/// One frame to render.
#[derive(Clone, Copy, Debug)]
pub struct FrameRequest<'a> {
    pub snippet: Option<&'a Snippet>,
    pub lang: Language,
}

impl<'a> FrameRequest<'a> {
    /// Highlight `snippet` in the language inferred from `path`.
    pub fn for_path(path: &str, snippet: Option<&'a Snippet>) -> Self {
        FrameRequest {
            snippet,
            lang: infer_language(path),
        }
    }
}

/// Highlighted markup for both frames. `None` when there was nothing to
/// highlight or highlighting failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeFrames {
    pub original: Option<String>,
    pub compiled: Option<String>,
}

/// Render both frames concurrently with the erroring line marked.
///
/// Each frame loads only its own language, so a frame whose language or
/// rendering fails comes back `None` without affecting the other.
pub async fn build_code_frames<F: HighlighterFactory>(
    cache: &HighlighterCache<F>,
    original: FrameRequest<'_>,
    compiled: FrameRequest<'_>,
) -> CodeFrames {
    let (original, compiled) = tokio::join!(render(cache, original), render(cache, compiled));
    CodeFrames { original, compiled }
}

fn has_text(snippet: Option<&Snippet>) -> bool {
    snippet.is_some_and(|s| !s.text.trim().is_empty())
}

async fn render<F: HighlighterFactory>(
    cache: &HighlighterCache<F>,
    request: FrameRequest<'_>,
) -> Option<String> {
    let snippet = request.snippet.filter(|s| has_text(Some(s)))?;
    let highlighter = match cache.get(&[request.lang]).await {
        Ok(highlighter) => highlighter,
        Err(error) => {
            tracing::debug!(%error, lang = %request.lang, "highlighter unavailable; frame left plain");
            return None;
        }
    };
    let options = HighlightOptions {
        lang: request.lang,
        themes: cache.themes(),
        start_line: snippet.start_line,
        highlight_line: Some(snippet.error_line),
    };
    match highlighter.code_to_html(&snippet.text, &options).await {
        Ok(html) => Some(html),
        Err(error) => {
            tracing::debug!(%error, lang = %request.lang, "highlighting failed");
            None
        }
    }
}
