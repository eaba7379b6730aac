//! CSS reference scanning and rewriting (C1).
//!
//! `scan` tries the structured, parser-based back-end first and falls back
//! to the always-available regex back-end when the input doesn't parse as
//! valid CSS. Both back-ends honor the same contract: return the (possibly
//! rewritten) text plus the URLs found, in source order, skipping empty
//! `url()` values.

mod regex_backend;
mod structured_backend;

/// Result of a scan: the text (rewritten if a `rewrite` callback was given)
/// and the URLs discovered, in source order.
#[derive(Debug, PartialEq, Eq)]
pub struct Scanned {
    pub text: String,
    pub urls: Vec<String>,
}

/// Scan `text` for URL references.
///
/// `inline` selects declaration-list mode (an HTML `style` attribute) over
/// full-stylesheet mode. `rewrite`, if given, is invoked once per discovered
/// URL (in source order) with the raw matched URL string and must return its
/// replacement.
pub fn scan(
    text: &str,
    inline: bool,
    mut rewrite: Option<&mut dyn FnMut(&str) -> String>,
) -> Scanned {
    let reborrowed = rewrite.as_mut().map(|r| &mut **r);
    if let Some(scanned) = structured_backend::try_scan(text, inline, reborrowed) {
        return scanned;
    }
    regex_backend::scan(text, inline, rewrite)
}
