//! Finding the registry module behind a set of candidate keys.

use std::sync::Arc;

use crate::{CandidateSet, ModuleNode, ModuleRegistry, ScoringConfig};

/// A module found for a candidate set, with how well it matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMatch {
    pub module: Arc<ModuleNode>,
    pub score: u32,
}

/// Find the module for `candidates`.
///
/// Direct lookups come first: for each candidate in order, by id and then by
/// url. The first hit wins with the exact score and nothing else is tried.
/// Only when no candidate hits directly is every module scanned and scored
/// with `scoring`; the best positive score wins, ties going to the module
/// the registry lists first.
///
/// Registry errors count as misses.
pub fn resolve_module<R: ModuleRegistry>(
    registry: &R,
    candidates: &CandidateSet,
    scoring: &ScoringConfig,
) -> Option<ModuleMatch> {
    if candidates.is_empty() {
        return None;
    }

    for candidate in candidates.iter() {
        if let Some(module) = direct_lookup(registry, candidate) {
            tracing::trace!(candidate, "direct module hit");
            return Some(ModuleMatch {
                module,
                score: scoring.exact,
            });
        }
    }

    scan(registry, candidates, scoring)
}

/// One lookup attempt: by id, then by url only if the id missed.
fn direct_lookup<R: ModuleRegistry>(registry: &R, candidate: &str) -> Option<Arc<ModuleNode>> {
    match registry.get_module_by_id(candidate) {
        Ok(Some(module)) => return Some(module),
        Ok(None) => {}
        Err(error) => tracing::debug!(candidate, %error, "module lookup by id failed"),
    }
    match registry.get_module_by_url(candidate) {
        Ok(found) => found,
        Err(error) => {
            tracing::debug!(candidate, %error, "module lookup by url failed");
            None
        }
    }
}

fn scan<R: ModuleRegistry>(
    registry: &R,
    candidates: &CandidateSet,
    scoring: &ScoringConfig,
) -> Option<ModuleMatch> {
    let mut best: Option<ModuleMatch> = None;
    for module in registry.modules() {
        let score = module
            .paths()
            .flat_map(|path| candidates.iter().map(move |c| scoring.score(path, c)))
            .max()
            .unwrap_or(0);
        if score > best.as_ref().map_or(0, |b| b.score) {
            best = Some(ModuleMatch { module, score });
        }
    }
    match &best {
        Some(found) => tracing::trace!(url = %found.module.url, score = found.score, "scored module match"),
        None => tracing::debug!(first = candidates.first(), "no module matches candidates"),
    }
    best
}
