//! The natural-language prompt asking for a fix.

use std::fmt::Write;

use overlay_highlight::Language;
use overlay_ir::ErrorRecord;

use super::{extract_snippet, Snippet};

/// What a prompt generator knows about the error site.
#[derive(Clone, Copy, Debug)]
pub struct PromptContext<'a> {
    pub file: &'a str,
    pub language: Language,
    pub line: u32,
    pub snippet: &'a str,
}

/// Turns an error and its site into a prompt for an assistant.
pub trait FixPromptGenerator: Send + Sync {
    fn generate(&self, error: &ErrorRecord, context: &PromptContext<'_>) -> String;
}

/// Markdown prompt: the error, where it happened, and the code around it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPromptGenerator;

impl FixPromptGenerator for DefaultPromptGenerator {
    fn generate(&self, error: &ErrorRecord, context: &PromptContext<'_>) -> String {
        let mut prompt = String::new();
        if context.file.is_empty() {
            let _ = writeln!(prompt, "Fix the following {}.", error.name);
        } else {
            let _ = writeln!(
                prompt,
                "Fix the following {} in `{}` at line {}.",
                error.name, context.file, context.line
            );
        }
        prompt.push('\n');
        if error.message.is_empty() {
            let _ = writeln!(prompt, "{}", error.name);
        } else {
            let _ = writeln!(prompt, "{}: {}", error.name, error.message);
        }
        let _ = write!(prompt, "\n```{}\n{}\n```\n", context.language, context.snippet);
        prompt
    }
}

/// Candidate code for the prompt, best first.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptSnippets<'a> {
    pub original: Option<&'a Snippet>,
    /// Full text to cut a window from when there is no original snippet.
    pub source_text: Option<&'a str>,
    /// Line the window is centered on.
    pub line: u32,
    pub context_lines: u32,
}

impl PromptSnippets<'_> {
    fn best(&self) -> Option<String> {
        if let Some(snippet) = self.original.filter(|s| !s.text.trim().is_empty()) {
            return Some(snippet.text.clone());
        }
        let window = extract_snippet(self.source_text?, self.line, self.context_lines)?;
        Some(window.text).filter(|t| !t.trim().is_empty())
    }
}

/// Ask `generator` for a prompt, using the best snippet available, or a
/// one-line description of the error when there is no code at all.
pub fn build_fix_prompt(
    generator: &dyn FixPromptGenerator,
    error: &ErrorRecord,
    file: &str,
    line: u32,
    language: Language,
    snippets: &PromptSnippets<'_>,
) -> String {
    let snippet = snippets.best().unwrap_or_else(|| describe(error, file, line));
    generator.generate(
        error,
        &PromptContext {
            file,
            language,
            line,
            snippet: &snippet,
        },
    )
}

fn describe(error: &ErrorRecord, file: &str, line: u32) -> String {
    let mut description = error.name.clone();
    if !error.message.is_empty() {
        let _ = write!(description, ": {}", error.message);
    }
    if !file.is_empty() {
        let _ = write!(description, " (at {file}:{line})");
    }
    description
}
