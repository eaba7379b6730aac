//! Structured CSS URL scanner/rewriter, backed by `lightningcss`'s parser and
//! visitor API. Parse errors are swallowed (per contract) and signalled to
//! the caller as `None` so it can fall back to the regex back-end.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::visitor::{Visit, VisitTypes, Visitor};
use std::convert::Infallible;

use super::Scanned;

struct UrlCollector<'a> {
    urls: Vec<String>,
    rewrite: Option<&'a mut dyn FnMut(&str) -> String>,
}

impl<'i, 'a> Visitor<'i> for UrlCollector<'a> {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        VisitTypes::URLS
    }

    fn visit_url(&mut self, url: &mut lightningcss::values::url::Url<'i>) -> Result<(), Self::Error> {
        let original = url.url.as_ref().to_string();
        if original.is_empty() {
            return Ok(());
        }
        self.urls.push(original.clone());
        if let Some(rewrite) = self.rewrite.as_deref_mut() {
            url.url = rewrite(&original).into();
        }
        Ok(())
    }
}

/// Attempt the structured scan; `None` means "parsing failed, use the
/// regex back-end instead" — never a hard error.
pub fn try_scan(
    text: &str,
    inline: bool,
    rewrite: Option<&mut dyn FnMut(&str) -> String>,
) -> Option<Scanned> {
    // lightningcss has no public "parse a bare declaration list" entry
    // point, so an inline style attribute is wrapped in a throwaway rule
    // and unwrapped again after printing.
    let wrapped = inline.then(|| format!("a{{{text}}}"));
    let source = wrapped.as_deref().unwrap_or(text);

    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;

    let mut collector = UrlCollector {
        urls: Vec::new(),
        rewrite,
    };
    stylesheet.visit(&mut collector).ok()?;

    let printed = stylesheet.to_css(PrinterOptions::default()).ok()?;
    let code = printed.code;

    let out_text = if inline {
        let start = code.find('{')? + 1;
        let end = code.rfind('}')?;
        if start > end {
            return None;
        }
        code[start..end].trim().to_string()
    } else {
        code
    };

    Some(Scanned {
        text: out_text,
        urls: collector.urls,
    })
}
