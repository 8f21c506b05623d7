//! Rewriting a whole stack to original locations.

use overlay_ir::{format_stack, parse_stack, StackHeader};

use crate::{normalize_identifier, resolve_location, resolve_module, ModuleRegistry, RemapConfig};

/// Parse `stack`, point every resolvable frame at its original location, and
/// format it again under `header`.
///
/// Frames without a usable position, or whose module cannot be found, are
/// kept as they are. Frame order never changes. Remapping a stack that
/// already points at unmapped original files returns it unchanged.
pub async fn remap_stack<R: ModuleRegistry>(
    registry: &R,
    stack: &str,
    header: Option<&StackHeader>,
    config: &RemapConfig,
) -> String {
    let mut frames = parse_stack(stack, config.frame_limit);
    for frame in &mut frames {
        let Some((file, line, column)) = frame.position() else {
            continue;
        };
        let file = file.to_owned();
        let candidates = normalize_identifier(&file, &config.virtual_fs_prefix);
        let Some(found) = resolve_module(registry, &candidates, &config.scoring) else {
            tracing::trace!(file, "frame left unmapped; no module");
            continue;
        };
        let location = resolve_location(registry, &found.module, &file, line, column).await;
        frame.file = Some(location.original_file_path);
        frame.line = Some(i64::from(location.original_file_line));
        frame.column = Some(i64::from(location.original_file_column));
    }
    format_stack(&frames, header)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
