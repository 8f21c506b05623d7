//! Decoded mappings and original-position lookup.

use crate::vlq::decode_segment;
use crate::{RawSourceMap, SourceMapError};

/// One decoded mapping segment. Original fields are absolute, not relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    generated_column: i64,
    original: Option<OriginalRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OriginalRef {
    source: i64,
    line: i64,
    column: i64,
    name: Option<i64>,
}

/// Where a generated position came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalPosition {
    /// Source name with `sourceRoot` applied.
    pub source: String,
    /// 1-based.
    pub line: u32,
    /// 0-based.
    pub column: u32,
    pub name: Option<String>,
}

/// A source map with its mappings decoded, ready for lookups.
#[derive(Clone, Debug)]
pub struct TraceMap {
    sources: Vec<Option<String>>,
    names: Vec<String>,
    /// Segments per generated line, sorted by generated column.
    lines: Vec<Vec<Segment>>,
}

impl TraceMap {
    /// Decode `raw`. Rejects anything but version 3 and malformed mappings.
    pub fn new(raw: &RawSourceMap) -> Result<Self, SourceMapError> {
        if raw.version != 3 {
            return Err(SourceMapError::UnsupportedVersion(raw.version));
        }

        let sources = (0..raw.sources.len())
            .map(|i| raw.resolved_source(i))
            .collect();

        Ok(TraceMap {
            sources,
            names: raw.names.clone(),
            lines: decode_mappings(&raw.mappings)?,
        })
    }

    /// Look up the original position of a generated position.
    ///
    /// `line` is 1-based, `column` 0-based. Picks the closest segment at or
    /// before `column` on that line. Returns `None` when there is no such
    /// segment, the segment carries no source, or the source entry is `null`.
    pub fn original_position_for(&self, line: u32, column: u32) -> Option<OriginalPosition> {
        let line_index = usize::try_from(line.checked_sub(1)?).ok()?;
        let segments = self.lines.get(line_index)?;

        let column = i64::from(column);
        let after = segments.partition_point(|s| s.generated_column <= column);
        let segment = segments.get(after.checked_sub(1)?)?;
        let original = segment.original?;

        let source = self
            .sources
            .get(usize::try_from(original.source).ok()?)?
            .clone()?;
        let name = original
            .name
            .and_then(|n| usize::try_from(n).ok())
            .and_then(|n| self.names.get(n).cloned());

        Some(OriginalPosition {
            source,
            line: u32::try_from(original.line).ok()?.checked_add(1)?,
            column: u32::try_from(original.column).ok()?,
            name,
        })
    }
}

fn decode_mappings(mappings: &str) -> Result<Vec<Vec<Segment>>, SourceMapError> {
    let mut lines = Vec::new();
    // Source, original line, original column and name are relative to the
    // previous segment across lines; the generated column resets every line.
    let mut source = 0i64;
    let mut original_line = 0i64;
    let mut original_column = 0i64;
    let mut name = 0i64;

    for (line_index, line) in mappings.split(';').enumerate() {
        let mut generated_column = 0i64;
        let mut segments = Vec::new();

        for text in line.split(',').filter(|s| !s.is_empty()) {
            let values = decode_segment(text, line_index)?;
            let first = values.first().copied().unwrap_or_default();
            accumulate(&mut generated_column, first, line_index)?;

            let original = match values.len() {
                1 => None,
                4 | 5 => {
                    accumulate(&mut source, values[1], line_index)?;
                    accumulate(&mut original_line, values[2], line_index)?;
                    accumulate(&mut original_column, values[3], line_index)?;
                    let name_index = match values.get(4) {
                        Some(&delta) => Some(accumulate(&mut name, delta, line_index)?),
                        None => None,
                    };
                    Some(OriginalRef {
                        source,
                        line: original_line,
                        column: original_column,
                        name: name_index,
                    })
                }
                fields => {
                    return Err(SourceMapError::InvalidSegment {
                        fields,
                        line: line_index,
                    })
                }
            };

            segments.push(Segment {
                generated_column,
                original,
            });
        }

        segments.sort_by_key(|s| s.generated_column);
        lines.push(segments);
    }

    Ok(lines)
}

/// Apply a relative field to its running total.
fn accumulate(total: &mut i64, delta: i64, line: usize) -> Result<i64, SourceMapError> {
    *total = total
        .checked_add(delta)
        .ok_or(SourceMapError::Overflow { line })?;
    Ok(*total)
}
