//! Regex-based CSS URL scanner/rewriter — the always-available fallback
//! back-end described by the five ordered patterns.

use regex::Regex;
use std::sync::LazyLock;

use super::Scanned;

struct Pattern {
    regex: Regex,
}

/// The five patterns, tried in order. Each subsequent pattern runs over the
/// text already mutated by the previous one.
static PATTERNS: LazyLock<[Pattern; 5]> = LazyLock::new(|| {
    [
        Pattern {
            regex: Regex::new(r"@import\s+'(?P<url>[^']*)'").unwrap(),
        },
        Pattern {
            regex: Regex::new(r#"@import\s+"(?P<url>[^"]*)""#).unwrap(),
        },
        // Unquoted url(...): first byte inside the parens must not itself be
        // a quote, which is what keeps this pattern from also matching the
        // quoted forms handled by the two patterns below.
        Pattern {
            regex: Regex::new(r#"url\((?P<url>[^'")][^)]*)\)"#).unwrap(),
        },
        Pattern {
            regex: Regex::new(r#"url\("(?P<url>[^"]*)"\)"#).unwrap(),
        },
        Pattern {
            regex: Regex::new(r"url\('(?P<url>[^']*)'\)").unwrap(),
        },
    ]
});

pub fn scan(text: &str, _inline: bool, mut rewrite: Option<&mut dyn FnMut(&str) -> String>) -> Scanned {
    let mut current = text.to_string();
    let mut urls = Vec::new();

    for pattern in PATTERNS.iter() {
        current = pattern
            .regex
            .replace_all(&current, |caps: &regex::Captures| {
                let matched = caps.get(0).unwrap().as_str();
                let url = &caps["url"];
                if url.is_empty() {
                    return matched.to_string();
                }
                urls.push(url.to_string());
                let replacement = match rewrite.as_deref_mut() {
                    Some(f) => f(url),
                    None => return matched.to_string(),
                };
                let url_start = caps.name("url").unwrap().start() - caps.get(0).unwrap().start();
                let url_end = url_start + url.len();
                format!("{}{}{}", &matched[..url_start], replacement, &matched[url_end..])
            })
            .into_owned();
    }

    Scanned {
        text: current,
        urls,
    }
}
