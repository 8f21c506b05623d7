//! Highlighting languages and extension-based inference.

use std::fmt;

/// A language the highlighter can be asked to render.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Vue,
    Svelte,
    Astro,
    Css,
    Scss,
    Less,
    Json,
    Html,
    Markdown,
    Mdx,
    Diff,
    /// Plain text, the fallback when nothing else fits.
    Text,
}

impl Language {
    /// The identifier highlighters use for this language.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::JavaScript => "javascript",
            Language::Jsx => "jsx",
            Language::Vue => "vue",
            Language::Svelte => "svelte",
            Language::Astro => "astro",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Less => "less",
            Language::Json => "json",
            Language::Html => "html",
            Language::Markdown => "markdown",
            Language::Mdx => "mdx",
            Language::Diff => "diff",
            Language::Text => "text",
        }
    }

    fn from_extension(ext: &str) -> Language {
        match ext {
            "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "js" | "mjs" | "cjs" => Language::JavaScript,
            "jsx" => Language::Jsx,
            "vue" => Language::Vue,
            "svelte" => Language::Svelte,
            "astro" => Language::Astro,
            "css" => Language::Css,
            "scss" => Language::Scss,
            "less" => Language::Less,
            "json" => Language::Json,
            "html" | "htm" => Language::Html,
            "md" => Language::Markdown,
            "mdx" => Language::Mdx,
            "diff" | "patch" => Language::Diff,
            _ => Language::Text,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a language from a path or URL's extension.
///
/// Query strings and fragments are ignored, so `/src/App.tsx?t=1` is `tsx`.
pub fn infer_language(path: &str) -> Language {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            Language::from_extension(&ext.to_ascii_lowercase())
        }
        _ => Language::Text,
    }
}
