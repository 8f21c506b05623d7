//! Dev-server module URLs.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::{Position, Url};

/// Whether `text` claims to be an http(s) URL. It may still fail to parse.
pub(crate) fn is_http_url(text: &str) -> bool {
    ["http://", "https://"].into_iter().any(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Parse an absolute http(s) URL with a host. `None` for anything else.
pub(crate) fn parse_http_url(text: &str) -> Option<Url> {
    Url::parse(text)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// The query without its `?`; `None` when absent or empty.
pub(crate) fn query(url: &Url) -> Option<&str> {
    url.query().filter(|q| !q.is_empty())
}

/// Path plus `?query` when there is one.
pub(crate) fn path_and_query(url: &Url) -> String {
    match query(url) {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

/// `scheme://host[:port]/path`, without query or fragment.
pub(crate) fn origin_and_path(url: &Url) -> &str {
    &url[..Position::AfterPath]
}

/// Resolve `reference` against `base` the way a browser resolves a relative
/// link. Absolute URLs come back as themselves; a reference that cannot be
/// joined is returned untouched.
pub(crate) fn join(base: &Url, reference: &str) -> String {
    base.join(reference)
        .map_or_else(|_| reference.to_owned(), String::from)
}

/// Percent-decode `text`. `None` when the decoded bytes are not UTF-8.
pub(crate) fn percent_decode(text: &str) -> Option<String> {
    percent_decode_str(text)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}
