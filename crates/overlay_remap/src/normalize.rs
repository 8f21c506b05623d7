//! Flattening error shapes into records.

use overlay_ir::{ErrorLike, ErrorRecord};

/// One record per error the overlay should show. Never empty.
///
/// Aggregates yield one record per direct cause; causes are not expanded
/// further. Diagnostic arrays yield one record per diagnostic. An aggregate
/// without causes, or an empty diagnostic array, yields a single record
/// built from the outer value.
pub fn normalize_errors(error: &ErrorLike) -> Vec<ErrorRecord> {
    match error {
        ErrorLike::Aggregate { causes, .. } if !causes.is_empty() => {
            causes.iter().map(ErrorLike::to_record).collect()
        }
        ErrorLike::Diagnostics(diagnostics) if !diagnostics.is_empty() => {
            diagnostics.iter().map(ErrorRecord::from).collect()
        }
        other => vec![other.to_record()],
    }
}
