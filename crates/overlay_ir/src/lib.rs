//! Shared types for the error overlay.
//!
//! Everything a request produces is a plain value: built once, never mutated,
//! and owned by the request that created it. Nothing in here holds a handle to
//! a module registry or any other live object, so every output type can be
//! serialized to the overlay as-is.
//!
//! ```text
//! ErrorLike ──► ErrorRecord[] ──► StackFrame[] ──► ResolvedLocation
//!                                                      │
//!                                        SourceTexts ──┴──► ErrorProcessingResult
//! ```

mod error;
mod location;
mod result;
pub mod stack;

pub use error::{CompilerDiagnostic, DiagnosticLocation, ErrorLike, ErrorRecord, JsError};
pub use location::{ResolvedLocation, SourceTexts};
pub use result::{ErrorProcessingResult, ViteErrorData};
pub use stack::{format_stack, parse_stack, StackFrame, StackHeader};
