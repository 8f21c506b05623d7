//! Lookup keys for a file path or URL.
//!
//! The same module shows up under many spellings: with and without the
//! dev server's query, with and without a leading slash, percent-encoded,
//! behind the virtual file system prefix, or as a full URL. Rather than
//! guess which one the registry indexes, [`normalize_identifier`] emits all
//! of them, most specific first.

pub(crate) mod url;

use smallvec::SmallVec;

use self::url::{is_http_url, origin_and_path, parse_http_url, path_and_query, percent_decode};

/// Ordered, de-duplicated lookup keys. Never contains an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateSet(SmallVec<[String; 8]>);

impl CandidateSet {
    pub(crate) fn push(&mut self, candidate: &str) {
        if !candidate.is_empty() && !self.contains(candidate) {
            self.0.push(candidate.to_owned());
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.0.iter().any(|c| c == candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Every plausible registry key for `raw`, most specific first.
///
/// For an http(s) URL the order is: path with query, path, both without
/// the leading slash, path without `virtual_fs_prefix`, the percent-decoded
/// forms, then the full URL and the URL without its query. For anything else:
/// the input, without the leading slash, without the query, then the
/// prefix-stripped and decoded forms.
///
/// Never fails; a malformed URL or an empty input gives an empty set.
pub fn normalize_identifier(raw: &str, virtual_fs_prefix: &str) -> CandidateSet {
    let mut set = CandidateSet::default();
    if raw.is_empty() {
        return set;
    }

    if is_http_url(raw) {
        let Some(url) = parse_http_url(raw) else {
            tracing::trace!(raw, "malformed module url; no candidates");
            return set;
        };
        let path = url.path();
        let path_and_query = path_and_query(&url);
        set.push(&path_and_query);
        set.push(path);
        set.push(without_leading_slash(&path_and_query));
        set.push(without_leading_slash(path));
        if let Some(stripped) = strip_virtual_fs(path, virtual_fs_prefix) {
            set.push(stripped);
        }
        if let Some(decoded) = percent_decode(&path_and_query) {
            set.push(&decoded);
        }
        if let Some(decoded) = percent_decode(path) {
            set.push(&decoded);
        }
        set.push(raw);
        set.push(origin_and_path(&url));
        return set;
    }

    let without_query = raw.split_once('?').map_or(raw, |(path, _)| path);
    set.push(raw);
    set.push(without_leading_slash(raw));
    set.push(without_query);
    if let Some(stripped) = strip_virtual_fs(without_query, virtual_fs_prefix) {
        set.push(stripped);
    }
    if let Some(decoded) = percent_decode(raw) {
        set.push(&decoded);
    }
    if let Some(decoded) = percent_decode(without_query) {
        set.push(&decoded);
    }
    set
}

fn without_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// `/@fs/home/me/x.ts` → `/home/me/x.ts`. Only strips a whole segment.
fn strip_virtual_fs<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    rest.starts_with('/').then_some(rest)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
