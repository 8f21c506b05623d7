//! Compiled position → original position.

use std::borrow::Cow;

use overlay_ir::ResolvedLocation;
use overlay_sourcemap::{RawSourceMap, TraceMap};

use crate::candidates::url::{is_http_url, join, parse_http_url};
use crate::{ModuleNode, ModuleRegistry};

/// Map `line`/`column` (both 1-based) in the compiled text of `module` to
/// the original source.
///
/// Uses the module's cached source map, or requests a transform for one.
/// Without a usable map, or when the lookup lands nowhere, the compiled
/// location comes back unchanged. When `path` is an http(s) URL, the mapped
/// source is resolved against it so the result is fetchable from the dev
/// server.
pub async fn resolve_location<R: ModuleRegistry>(
    registry: &R,
    module: &ModuleNode,
    path: &str,
    line: u32,
    column: u32,
) -> ResolvedLocation {
    let unchanged = || ResolvedLocation::new(path, line, column);
    if line == 0 || column == 0 {
        return unchanged();
    }

    let Some(map) = source_map(registry, module).await else {
        tracing::debug!(path, "no source map; location left unmapped");
        return unchanged();
    };
    let trace = match TraceMap::new(&map) {
        Ok(trace) => trace,
        Err(error) => {
            tracing::debug!(path, %error, "unusable source map");
            return unchanged();
        }
    };
    let Some(position) = trace.original_position_for(line, column - 1) else {
        tracing::debug!(path, line, column, "position not covered by source map");
        return unchanged();
    };

    let source = if is_http_url(path) {
        parse_http_url(path).map_or_else(|| position.source.clone(), |url| join(&url, &position.source))
    } else {
        position.source
    };
    ResolvedLocation::new(source, position.line, position.column.saturating_add(1))
}

async fn source_map<'m, R: ModuleRegistry>(
    registry: &R,
    module: &'m ModuleNode,
) -> Option<Cow<'m, RawSourceMap>> {
    if let Some(map) = module.cached_map() {
        return Some(Cow::Borrowed(map));
    }
    let key = module.transform_key()?;
    match registry.transform_request(key).await {
        Ok(result) => result?.map.map(Cow::Owned),
        Err(error) => {
            tracing::debug!(key, %error, "transform for source map failed");
            None
        }
    }
}
