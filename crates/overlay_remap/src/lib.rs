//! Resolves runtime errors in compiled dev-server modules back to the
//! original source the user wrote.
//!
//! A request flows through a fixed pipeline:
//!
//! ```text
//! ErrorLike ─► normalize ─► records ─► locate compiled ─► resolve module
//!                                                              │
//!          ErrorProcessingResult ◄─ frames ◄─ texts ◄─ resolve location
//! ```
//!
//! Every stage is total: a failure inside one stage is logged at `debug` and
//! turned into an "unknown" value, so [`build_extended_error_data`] always
//! returns a result. The module graph is reached only through
//! [`ModuleRegistry`], and highlighting only through
//! [`overlay_highlight::HighlighterCache`].

mod adapters;
mod candidates;
mod config;
mod frame;
mod location;
mod normalize;
mod process;
mod registry;
mod resolve;
mod stack_remap;
mod text;

#[cfg(test)]
mod test_support;

use std::sync::Once;

pub use adapters::{
    adapter_for, hydration_diff, svelte_location, vue_location, AdapterLocation, FrameworkAdapter,
};
pub use candidates::{normalize_identifier, CandidateSet};
pub use config::{RemapConfig, ScoringConfig};
pub use frame::{
    build_code_frames, build_fix_prompt, extract_snippet, CodeFrames, DefaultPromptGenerator,
    FixPromptGenerator, FrameRequest, PromptContext, PromptSnippets, Snippet,
};
pub use location::resolve_location;
pub use normalize::normalize_errors;
pub use process::{build_extended_error_data, ErrorProcessor, ErrorRequest};
pub use registry::{MemoryRegistry, ModuleNode, ModuleRegistry, RegistryError, TransformResult};
pub use resolve::{resolve_module, ModuleMatch};
pub use stack_remap::remap_stack;
pub use text::retrieve_source_texts;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only installs once per process.
/// Embedders that configure their own subscriber should skip this.
///
/// ```text
/// RUST_LOG=overlay_remap=debug     # fallback decisions per stage
/// RUST_LOG=overlay_remap=trace     # every candidate and strategy tried
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }

        // `try_init` so an embedder's subscriber wins instead of panicking.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .try_init();
    });
}
