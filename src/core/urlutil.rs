//! Small helpers layered on top of the `url` crate's `Url` type.
//!
//! The archiver never reimplements RFC 3986 resolution itself; `Url::join`
//! already does it. This module only adds the handful of operations the
//! writers and coordinator need repeatedly: data-URL detection, last-segment
//! filename extraction, and resolving a possibly-relative reference string
//! against a base URL.

use percent_encoding::percent_decode_str;
use url::Url;

/// `true` for `data:` URLs, which are never fetched or rewritten.
pub fn is_data(url: &Url) -> bool {
    url.scheme() == "data"
}

/// Last non-empty path segment, if any, percent-decoded so it makes a
/// sensible on-disk filename (mirrors `QUrl::fileName`'s implicit decoding
/// in the browser this was ported from).
///
/// `http://example.com/` has no segments worth keeping, so this returns
/// `None` rather than an empty string; callers fall back to `"asset"`.
pub fn file_name(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()?;
    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

/// Resolve `reference` against `base`, per RFC 3986.
///
/// `reference` may itself already be absolute, in which case `base` is
/// ignored by `Url::join`'s own semantics.
pub fn resolve(base: &Url, reference: &str) -> Result<Url, url::ParseError> {
    base.join(reference)
}
