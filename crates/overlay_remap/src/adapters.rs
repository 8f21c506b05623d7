//! Framework-specific diagnostics.
//!
//! Template compilers report errors in their own text format, pointing
//! straight at the user's file. An adapter recognizes that format and pulls
//! out the location, which then replaces anything derived from the stack.

/// A location reported by a framework, already in original source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterLocation {
    pub file: String,
    /// 1-based.
    pub line: u32,
    /// 1-based.
    pub column: u32,
}

/// Extracts a location from a diagnostic message, or gives up.
pub type FrameworkAdapter = fn(&str) -> Option<AdapterLocation>;

/// The adapter for a framework hint such as `"vue"`. Case-insensitive.
pub fn adapter_for(framework: &str) -> Option<FrameworkAdapter> {
    match framework.trim().to_ascii_lowercase().as_str() {
        "vue" => Some(vue_location),
        "svelte" => Some(svelte_location),
        _ => None,
    }
}

const VUE_MARKER: &str = "[vue/compiler-sfc]";

/// Vue single-file-component compiler errors:
///
/// ```text
/// [vue/compiler-sfc] Unexpected token (3:9)
///
/// /home/me/app/src/App.vue
/// ```
///
/// Needs the marker, a positive `(line:column)`, and a path ending in `.vue`.
pub fn vue_location(message: &str) -> Option<AdapterLocation> {
    if !message.contains(VUE_MARKER) {
        return None;
    }
    let (line, column) = parenthesized_position(message)?;
    let file = tokens(message).find(|t| t.len() > ".vue".len() && t.ends_with(".vue"))?;
    Some(AdapterLocation {
        file: file.to_owned(),
        line,
        column,
    })
}

/// Svelte compiler errors, which carry `path.svelte:line:column` inline:
///
/// ```text
/// [plugin:vite-plugin-svelte] /src/App.svelte:4:2 Unexpected token
/// ```
pub fn svelte_location(message: &str) -> Option<AdapterLocation> {
    if !message.to_ascii_lowercase().contains("svelte") {
        return None;
    }
    tokens(message).find_map(|token| {
        let (file, line, column) = trailing_position(token)?;
        (file.len() > ".svelte".len() && file.ends_with(".svelte")).then(|| AdapterLocation {
            file: file.to_owned(),
            line,
            column,
        })
    })
}

/// Whitespace-separated words with surrounding quotes and punctuation
/// trimmed.
fn tokens(message: &str) -> impl Iterator<Item = &str> {
    message
        .split_whitespace()
        .map(|t| t.trim_start_matches(['"', '\'', '`', '(']))
        .map(|t| t.trim_end_matches(['"', '\'', '`', ')', ',', ';', ':', '.']))
        .filter(|t| !t.is_empty())
}

/// First `(line:column)` with both numbers positive.
fn parenthesized_position(message: &str) -> Option<(u32, u32)> {
    message.match_indices('(').find_map(|(open, _)| {
        let rest = &message[open + 1..];
        let inner = &rest[..rest.find(')')?];
        let (line, column) = inner.split_once(':')?;
        Some((positive(line)?, positive(column)?))
    })
}

/// `file:line:column` → parts, both numbers positive.
fn trailing_position(token: &str) -> Option<(&str, u32, u32)> {
    let mut parts = token.rsplitn(3, ':');
    let column = positive(parts.next()?)?;
    let line = positive(parts.next()?)?;
    let file = parts.next().filter(|f| !f.is_empty())?;
    Some((file, line, column))
}

fn positive(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().filter(|n| *n > 0)
}

/// The before/after diff of a hydration mismatch message, if it is one.
///
/// The message must mention hydration and contain at least one diff line
/// (`+ ` or `- ` after indentation). The block runs from the first to the
/// last diff line, context lines included.
pub fn hydration_diff(message: &str) -> Option<String> {
    if !message.to_ascii_lowercase().contains("hydrat") {
        return None;
    }
    let lines: Vec<&str> = message.lines().collect();
    let is_diff = |line: &&str| {
        let trimmed = line.trim_start();
        trimmed.starts_with("+ ") || trimmed.starts_with("- ")
    };
    let first = lines.iter().position(is_diff)?;
    let last = lines.iter().rposition(is_diff)?;
    Some(
        lines[first..=last]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
