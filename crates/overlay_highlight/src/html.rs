//! Built-in HTML renderer.
//!
//! Produces escaped markup with one `<span class="line">` per source line.
//! No tokenization; theming is left to the overlay's stylesheet via the
//! theme names on the `<pre>` element.

use std::fmt::Write;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::{HighlightError, HighlightOptions, Highlighter, HighlighterFactory, Language, Themes};

/// HTML renderer that marks the erroring line.
///
/// Languages must be loaded before use, except [`Language::Text`] which is
/// always available.
#[derive(Debug, Default)]
pub struct HtmlHighlighter {
    loaded: RwLock<FxHashSet<Language>>,
}

impl HtmlHighlighter {
    pub fn new() -> Self {
        HtmlHighlighter::default()
    }

    fn is_loaded(&self, lang: Language) -> bool {
        lang == Language::Text || self.loaded.read().contains(&lang)
    }

    fn render(code: &str, options: &HighlightOptions<'_>) -> String {
        let mut html = String::with_capacity(code.len() * 2);
        let _ = write!(
            html,
            r#"<pre class="shiki shiki-themes {} {}" data-lang="{}" tabindex="0"><code>"#,
            escape_html(&options.themes.light),
            escape_html(&options.themes.dark),
            options.lang,
        );

        for (offset, line) in code.lines().enumerate() {
            if offset > 0 {
                html.push('\n');
            }
            let number = options
                .start_line
                .saturating_add(u32::try_from(offset).unwrap_or(u32::MAX));
            let class = if options.highlight_line == Some(number) {
                "line highlighted error"
            } else {
                "line"
            };
            let _ = write!(
                html,
                r#"<span class="{class}" data-line="{number}">{}</span>"#,
                escape_html(line)
            );
        }

        html.push_str("</code></pre>");
        html
    }
}

impl Highlighter for HtmlHighlighter {
    fn load_language(&self, lang: Language) -> Result<(), HighlightError> {
        self.loaded.write().insert(lang);
        Ok(())
    }

    async fn code_to_html(
        &self,
        code: &str,
        options: &HighlightOptions<'_>,
    ) -> Result<String, HighlightError> {
        if !self.is_loaded(options.lang) {
            return Err(HighlightError::UnsupportedLanguage(
                options.lang.as_str().to_owned(),
            ));
        }
        Ok(HtmlHighlighter::render(code, options))
    }
}

/// Creates [`HtmlHighlighter`]s for a [`crate::HighlighterCache`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlHighlighterFactory;

impl HighlighterFactory for HtmlHighlighterFactory {
    type Output = HtmlHighlighter;

    async fn create(&self, themes: &Themes) -> Result<HtmlHighlighter, HighlightError> {
        if themes.light.is_empty() || themes.dark.is_empty() {
            return Err(HighlightError::Create("theme names must not be empty".to_owned()));
        }
        Ok(HtmlHighlighter::new())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
