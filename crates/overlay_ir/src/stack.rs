//! Stack trace parsing and formatting.
//!
//! Understands V8 frames (`    at fn (file:line:col)`, `    at file:line:col`)
//! and SpiderMonkey/JavaScriptCore frames (`fn@file:line:col`). Lines that are
//! not frames, such as the `Name: message` header or wrapped message text, are
//! skipped.
//!
//! Formatting always produces V8 style, so `format_stack(parse_stack(s))` is a
//! fixpoint: parsing the formatted output yields the same frames again.

use std::fmt::{self, Write};

/// One parsed entry of a formatted stack.
///
/// `line` and `column` of 0 or less are "unknown" sentinels. Use
/// [`StackFrame::position`] to get a position that is safe to map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub file: Option<String>,
    pub line: Option<i64>,
    pub column: Option<i64>,
    pub function: Option<String>,
}

impl StackFrame {
    /// A frame with a full location and no function name.
    pub fn at(file: impl Into<String>, line: i64, column: i64) -> Self {
        StackFrame {
            file: Some(file.into()),
            line: Some(line),
            column: Some(column),
            function: None,
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// The file and 1-based line/column, if all three are usable.
    pub fn position(&self) -> Option<(&str, u32, u32)> {
        let file = self.file.as_deref().filter(|f| !f.is_empty())?;
        let line = self.line.and_then(positive)?;
        let column = self.column.and_then(positive)?;
        Some((file, line, column))
    }
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

/// The `Name: message` line printed above the frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackHeader {
    pub name: String,
    pub message: String,
}

impl StackHeader {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        StackHeader {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for StackHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

/// Parse at most `frame_limit` frames out of a formatted stack.
pub fn parse_stack(stack: &str, frame_limit: usize) -> Vec<StackFrame> {
    stack
        .lines()
        .filter_map(parse_frame)
        .take(frame_limit)
        .collect()
}

fn parse_frame(line: &str) -> Option<StackFrame> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("at ") {
        return parse_v8_frame(rest.trim());
    }
    parse_gecko_frame(line)
}

fn parse_v8_frame(rest: &str) -> Option<StackFrame> {
    if rest.is_empty() {
        return None;
    }
    if let (Some(open), true) = (rest.find(" ("), rest.ends_with(')')) {
        let function = rest[..open].trim();
        let location = &rest[open + 2..rest.len() - 1];
        let mut frame = split_location(location);
        if !function.is_empty() {
            frame.function = Some(function.to_owned());
        }
        return Some(frame);
    }
    Some(split_location(rest))
}

/// `fn@file:line:col`. Requires a line number and a function name without
/// whitespace so ordinary text containing an `@` is not mistaken for a frame.
fn parse_gecko_frame(line: &str) -> Option<StackFrame> {
    let (function, location) = line.split_once('@')?;
    if function.contains(char::is_whitespace) {
        return None;
    }
    let mut frame = split_location(location);
    if frame.line.is_none() {
        return None;
    }
    if !function.is_empty() {
        frame.function = Some(function.to_owned());
    }
    Some(frame)
}

/// Split `file:line:col` from the right, so files containing `:` (URL ports,
/// drive letters) stay intact.
fn split_location(location: &str) -> StackFrame {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().unwrap_or_default();
    let middle = parts.next();
    let head = parts.next();

    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match (head, middle) {
        (Some(file), Some(line)) if numeric(line) && numeric(last) => StackFrame {
            file: Some(file.to_owned()),
            line: line.parse().ok(),
            column: last.parse().ok(),
            function: None,
        },
        (_, Some(_)) if numeric(last) => {
            let file = &location[..location.len() - last.len() - 1];
            StackFrame {
                file: Some(file.to_owned()),
                line: last.parse().ok(),
                column: None,
                function: None,
            }
        }
        _ => StackFrame {
            file: Some(location.to_owned()),
            ..StackFrame::default()
        },
    }
}

/// Serialize frames in V8 style, prefixed by `header` when given.
pub fn format_stack(frames: &[StackFrame], header: Option<&StackHeader>) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(frames.len() + 1);
    if let Some(header) = header {
        lines.push(header.to_string());
    }
    lines.extend(frames.iter().map(format_frame));
    lines.join("\n")
}

fn format_frame(frame: &StackFrame) -> String {
    let mut location = frame
        .file
        .clone()
        .unwrap_or_else(|| "<anonymous>".to_owned());
    if let Some(line) = frame.line {
        let _ = write!(location, ":{line}");
        if let Some(column) = frame.column {
            let _ = write!(location, ":{column}");
        }
    }
    match &frame.function {
        Some(function) => format!("    at {function} ({location})"),
        None => format!("    at {location}"),
    }
}
