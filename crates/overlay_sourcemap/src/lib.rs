//! Source map v3 support.
//!
//! Two layers:
//! - [`RawSourceMap`]: the JSON document as stored in a module's transform
//!   result, kept verbatim so it can be cached and cloned cheaply.
//! - [`TraceMap`]: the decoded mappings, built on demand from a raw map and
//!   queried with [`TraceMap::original_position_for`].
//!
//! Positions follow the usual source map conventions: lines are 1-based,
//! columns are 0-based.

mod error;
mod raw;
mod trace;
mod vlq;

pub use error::SourceMapError;
pub use raw::RawSourceMap;
pub use trace::{OriginalPosition, TraceMap};
