//! Base64 VLQ segment decoding.

use crate::SourceMapError;

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u32 = (1 << VLQ_BASE_SHIFT) - 1;
const VLQ_CONTINUATION_BIT: u32 = 1 << VLQ_BASE_SHIFT;
/// Largest shift whose 5-bit digit still fits in an `i64` without overflow.
const VLQ_MAX_SHIFT: u32 = 55;

fn base64_digit(byte: u8) -> Option<u32> {
    let digit = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(digit))
}

/// Decode one comma-separated segment into its signed relative values.
///
/// `line` is only used for error reporting (0-based generated line).
pub(crate) fn decode_segment(segment: &str, line: usize) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::with_capacity(5);
    let mut value: i64 = 0;
    let mut shift: u32 = 0;
    let mut pending = false;

    for byte in segment.bytes() {
        let digit = base64_digit(byte).ok_or(SourceMapError::InvalidCharacter {
            character: char::from(byte),
            line,
        })?;
        if shift > VLQ_MAX_SHIFT {
            return Err(SourceMapError::Overflow { line });
        }
        value += i64::from(digit & VLQ_BASE_MASK) << shift;

        if digit & VLQ_CONTINUATION_BIT == 0 {
            // Lowest bit carries the sign.
            let magnitude = value >> 1;
            values.push(if value & 1 == 1 { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
            pending = false;
        } else {
            shift += VLQ_BASE_SHIFT;
            pending = true;
        }
    }

    if pending {
        return Err(SourceMapError::Truncated { line });
    }
    Ok(values)
}
