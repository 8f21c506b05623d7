//! Tunables for a remapping request.

/// Scores for the registry scan in [`crate::resolve_module`].
///
/// A module's score is the best score of any of its paths against any
/// candidate. The scan keeps the highest-scoring module; ties go to the
/// module seen first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringConfig {
    /// A module path equal to a candidate.
    pub exact: u32,
    /// A module path containing a candidate, or contained by one.
    pub substring: u32,
    /// Paths or candidates shorter than this never score a substring match.
    pub min_substring_len: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            exact: 100,
            substring: 50,
            min_substring_len: 3,
        }
    }
}

impl ScoringConfig {
    /// Score `path` against `candidate`; 0 means no match.
    pub fn score(&self, path: &str, candidate: &str) -> u32 {
        if path.is_empty() || candidate.is_empty() {
            return 0;
        }
        if path == candidate {
            return self.exact;
        }
        if path.len() < self.min_substring_len || candidate.len() < self.min_substring_len {
            return 0;
        }
        if path.contains(candidate) || candidate.contains(path) {
            self.substring
        } else {
            0
        }
    }
}

/// Configuration for [`crate::ErrorProcessor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemapConfig {
    /// Frames kept from each stack; the rest are dropped.
    pub frame_limit: usize,
    /// Lines of context above and below the error line in code frames.
    pub snippet_context_lines: u32,
    /// Lines of context in the fallback snippet of the fix prompt.
    pub prompt_context_lines: u32,
    pub scoring: ScoringConfig,
    /// Prefix the dev server puts in front of files outside the project root.
    pub virtual_fs_prefix: String,
}

impl Default for RemapConfig {
    fn default() -> Self {
        RemapConfig {
            frame_limit: 50,
            snippet_context_lines: 2,
            prompt_context_lines: 5,
            scoring: ScoringConfig::default(),
            virtual_fs_prefix: "/@fs".to_owned(),
        }
    }
}

impl RemapConfig {
    /// Only exact path matches count in the registry scan.
    pub fn exact_only() -> Self {
        RemapConfig {
            scoring: ScoringConfig {
                substring: 0,
                ..ScoringConfig::default()
            },
            ..RemapConfig::default()
        }
    }
}
