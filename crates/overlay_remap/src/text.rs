//! Fetching compiled and original text for a module.
//!
//! Retrieval walks [`STRATEGIES`] in order and stops as soon as both texts
//! are known. Each strategy only fills fields that are still empty, so an
//! earlier, cheaper source always wins over a later one. A failing strategy
//! is logged and skipped.

use overlay_ir::SourceTexts;
use smallvec::{smallvec, SmallVec};

use crate::candidates::url::{is_http_url, parse_http_url, percent_decode};
use crate::{CandidateSet, ModuleNode, ModuleRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// `sourcesContent[0]` of the cached source map.
    CachedMap,
    /// Code of the cached transform.
    CachedCode,
    /// A fresh transform, keyed by id, url or first candidate.
    Transform,
    /// The file on disk.
    Disk,
}

const STRATEGIES: [Strategy; 4] = [
    Strategy::CachedMap,
    Strategy::CachedCode,
    Strategy::Transform,
    Strategy::Disk,
];

struct Lookup<'a, R> {
    registry: &'a R,
    module: Option<&'a ModuleNode>,
    file_path: &'a str,
    candidates: &'a CandidateSet,
}

/// Best-effort original and compiled text for `module` (or, without a
/// module, for `file_path`). Either field may stay `None`.
pub async fn retrieve_source_texts<R: ModuleRegistry>(
    registry: &R,
    module: Option<&ModuleNode>,
    file_path: &str,
    candidates: &CandidateSet,
) -> SourceTexts {
    let lookup = Lookup {
        registry,
        module,
        file_path,
        candidates,
    };
    let mut texts = SourceTexts::default();
    for strategy in STRATEGIES {
        if texts.is_complete() {
            break;
        }
        strategy.apply(&lookup, &mut texts).await;
    }
    if !texts.is_complete() {
        tracing::debug!(
            file_path,
            original = texts.original_source_text.is_some(),
            compiled = texts.compiled_source_text.is_some(),
            "source text retrieval exhausted"
        );
    }
    texts
}

impl Strategy {
    async fn apply<R: ModuleRegistry>(self, lookup: &Lookup<'_, R>, texts: &mut SourceTexts) {
        match self {
            Strategy::CachedMap => {
                let content = lookup
                    .module
                    .and_then(ModuleNode::cached_map)
                    .and_then(|map| map.first_source_content());
                fill(&mut texts.original_source_text, content);
            }
            Strategy::CachedCode => {
                let code = lookup.module.and_then(ModuleNode::cached_code);
                fill(&mut texts.compiled_source_text, code);
            }
            Strategy::Transform => {
                let key = lookup
                    .module
                    .and_then(ModuleNode::transform_key)
                    .or_else(|| lookup.candidates.first());
                let Some(key) = key else {
                    return;
                };
                match lookup.registry.transform_request(key).await {
                    Ok(Some(result)) => {
                        let original = result.map.as_ref().and_then(|m| m.first_source_content());
                        fill(&mut texts.original_source_text, original);
                        fill(&mut texts.compiled_source_text, Some(result.code.as_str()));
                    }
                    Ok(None) => tracing::trace!(key, "transform found no module"),
                    Err(error) => tracing::debug!(key, %error, "transform strategy failed"),
                }
            }
            Strategy::Disk => {
                if texts.original_source_text.is_some() {
                    return;
                }
                let root = lookup.registry.root();
                for path in disk_paths(lookup.module, lookup.file_path, root) {
                    match lookup.registry.read_file(&path).await {
                        Ok(text) => {
                            texts.original_source_text = Some(text);
                            return;
                        }
                        Err(error) => tracing::trace!(%error, "disk strategy miss"),
                    }
                }
            }
        }
    }
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = value.map(str::to_owned);
    }
}

/// Files to try reading, in order. The module's recorded file when it has
/// one; otherwise `file_path` itself and `file_path` under `root`.
fn disk_paths(module: Option<&ModuleNode>, file_path: &str, root: &str) -> SmallVec<[String; 2]> {
    if let Some(file) = module.and_then(|m| m.file.as_deref()).filter(|f| !f.is_empty()) {
        return smallvec![file.to_owned()];
    }

    let mut paths = SmallVec::new();
    let path = if is_http_url(file_path) {
        let Some(url) = parse_http_url(file_path) else {
            return paths;
        };
        percent_decode(url.path()).unwrap_or_else(|| url.path().to_owned())
    } else {
        let path = file_path.split_once('?').map_or(file_path, |(path, _)| path);
        if path.is_empty() {
            return paths;
        }
        paths.push(path.to_owned());
        path.to_owned()
    };
    if path.starts_with('/') && !root.is_empty() {
        paths.push(format!("{}{path}", root.trim_end_matches('/')));
    }
    paths
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
