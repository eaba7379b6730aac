//! Download coordinator (C5): walks the DOM once, then drains concurrent
//! fetches until every discovered reference is accounted for.
//!
//! Fetches are modeled as plain futures pushed onto a `FuturesUnordered`
//! rather than externally-signaled handles, so there is no separate
//! zombie-collection step: a future that already resolved is simply ready
//! the first time the drain loop polls it.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use url::Url;

use crate::core::{self, ArchiveError};
use crate::css;
use crate::dom::{DomDocument, ElementId};
use crate::download::{FetchError, Fetched, Fetcher};
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Finished,
}

type PendingFuture<'a> = Pin<Box<dyn Future<Output = (Url, Result<Fetched, FetchError>)> + Send + 'a>>;

pub struct Coordinator<D, F> {
    dom: D,
    fetcher: F,
    page_url: Url,
    writer: Writer,
    state: State,
}

impl<D: DomDocument, F: Fetcher> Coordinator<D, F> {
    pub fn new(dom: D, fetcher: F, page_url: Url, writer: Writer) -> Self {
        Self {
            dom,
            fetcher,
            page_url,
            writer,
            state: State::Fresh,
        }
    }

    /// Archive the page. Consumes the coordinator: a second call is a usage
    /// error precisely because there is no coordinator left to call it on.
    pub async fn run(self) -> Result<(), ArchiveError> {
        let Coordinator {
            mut dom,
            fetcher,
            page_url,
            mut writer,
            state,
        } = self;
        if state != State::Fresh {
            return Err(ArchiveError::usage("coordinator already running"));
        }

        let mut loaded: HashSet<Url> = HashSet::new();
        let mut pending: futures::stream::FuturesUnordered<PendingFuture<'_>> =
            futures::stream::FuturesUnordered::new();

        dom_pass(&mut dom, &mut writer, &page_url, &fetcher, &mut loaded, &mut pending);
        writer.set_root_content(dom.serialize());

        use futures::StreamExt;
        while let Some((url, outcome)) = pending.next().await {
            match outcome {
                Ok(fetched) => on_finish(url, fetched, &mut writer, &fetcher, &mut loaded, &mut pending)?,
                Err(_) => on_error(url, &mut writer)?,
            }
        }

        writer.write()
    }
}

fn enqueue_fetch<'a, F: Fetcher>(
    url: Url,
    fetcher: &'a F,
    loaded: &mut HashSet<Url>,
    pending: &mut futures::stream::FuturesUnordered<PendingFuture<'a>>,
) {
    if core::is_data(&url) || loaded.contains(&url) {
        return;
    }
    loaded.insert(url.clone());
    let for_fetch = url.clone();
    pending.push(Box::pin(async move {
        let result = fetcher.fetch(&for_fetch).await;
        (url, result)
    }));
}

fn dom_pass<'a, D: DomDocument, F: Fetcher>(
    dom: &mut D,
    writer: &mut Writer,
    page_url: &Url,
    fetcher: &'a F,
    loaded: &mut HashSet<Url>,
    pending: &mut futures::stream::FuturesUnordered<PendingFuture<'a>>,
) {
    for id in dom.query_tags(&["link", "script", "img"]) {
        let Some((attr_name, raw)) = source_attr(dom, id) else {
            continue;
        };
        let Ok(absolute) = core::resolve(page_url, &raw) else {
            continue;
        };
        let rewritten = writer.rewrite_url(&absolute, None);
        dom.set_attr(id, attr_name, &rewritten);
        enqueue_fetch(absolute, fetcher, loaded, pending);
    }

    for id in dom.query_tags(&["style"]) {
        let is_css = dom.get_attr(id, "type").map_or(true, |t| t == "text/css");
        if !is_css {
            continue;
        }
        let text = dom.inner_html(id);
        let rewritten = scan_and_enqueue(&text, false, writer, page_url, fetcher, loaded, pending);
        dom.set_inner_html(id, &rewritten.text);
    }

    for id in dom.elements_with_style_attr() {
        let Some(text) = dom.get_attr(id, "style") else {
            continue;
        };
        let rewritten = scan_and_enqueue(&text, true, writer, page_url, fetcher, loaded, pending);
        dom.set_attr(id, "style", &rewritten.text);
    }
}

fn source_attr<D: DomDocument>(dom: &D, id: ElementId) -> Option<(&'static str, String)> {
    if let Some(src) = dom.get_attr(id, "src") {
        return Some(("src", src));
    }
    dom.get_attr(id, "href").map(|href| ("href", href))
}

fn scan_and_enqueue<'a, F: Fetcher>(
    text: &str,
    inline: bool,
    writer: &mut Writer,
    base: &Url,
    fetcher: &'a F,
    loaded: &mut HashSet<Url>,
    pending: &mut futures::stream::FuturesUnordered<PendingFuture<'a>>,
) -> css::Scanned {
    let mut rewrite = |raw: &str| -> String {
        match core::resolve(base, raw) {
            Ok(resolved) => writer.rewrite_url(&resolved, Some(base)),
            Err(_) => raw.to_string(),
        }
    };
    let scanned = css::scan(text, inline, Some(&mut rewrite));
    for raw in &scanned.urls {
        if let Ok(resolved) = core::resolve(base, raw) {
            enqueue_fetch(resolved, fetcher, loaded, pending);
        }
    }
    scanned
}

fn on_finish<'a, F: Fetcher>(
    url: Url,
    fetched: Fetched,
    writer: &mut Writer,
    fetcher: &'a F,
    loaded: &mut HashSet<Url>,
    pending: &mut futures::stream::FuturesUnordered<PendingFuture<'a>>,
) -> Result<(), ArchiveError> {
    let is_css = fetched
        .content_type
        .as_deref()
        .map(|ct| ct.to_lowercase() == "text/css")
        .unwrap_or(false);

    let content = if is_css {
        let text = String::from_utf8_lossy(&fetched.content).into_owned();
        let scanned = scan_and_enqueue(&text, false, writer, &url, fetcher, loaded, pending);
        scanned.text.into_bytes()
    } else {
        fetched.content
    };

    writer.add_file(&url, content, fetched.content_type)
}

fn on_error(url: Url, writer: &mut Writer) -> Result<(), ArchiveError> {
    writer.add_file(&url, Vec::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::test_double::{TestDocument, TestElement};
    use crate::download::test_double::StaticFetcher;
    use std::path::PathBuf;

    fn page_url() -> Url {
        Url::parse("http://example.com/page.html").unwrap()
    }

    #[tokio::test]
    async fn test_run_downloads_linked_assets_and_writes_folder() {
        let mut dom = TestDocument::default();
        dom.push(TestElement::new("img").attr("src", "assets/logo.png"));
        dom.push(TestElement::new("link").attr("href", "style.css"));

        let fetcher = StaticFetcher::new()
            .with("http://example.com/assets/logo.png", b"png-bytes", "image/png")
            .with("http://example.com/style.css", b"body { color: red }", "text/css");

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("page.html");
        let writer = Writer::new_folder(Vec::new(), page_url(), dest.clone());

        let coordinator = Coordinator::new(dom, fetcher, page_url(), writer);
        coordinator.run().await.unwrap();

        assert!(dest.exists());
        let folder = crate::writer::asset_folder_path(&dest);
        assert_eq!(std::fs::read(folder.join("logo.png")).unwrap(), b"png-bytes");
        assert!(folder.join("style.css").exists());
    }

    #[tokio::test]
    async fn test_run_fails_if_called_twice_worth_of_state() {
        // A fresh coordinator always starts `Fresh`; this asserts the guard
        // itself fires rather than silently double-running.
        let dom = TestDocument::default();
        let fetcher = StaticFetcher::new();
        let writer = Writer::new_folder(Vec::new(), page_url(), PathBuf::from("/tmp/never-read"));
        let mut coordinator = Coordinator::new(dom, fetcher, page_url(), writer);
        coordinator.state = State::Running;
        assert!(coordinator.run().await.is_err());
    }

    #[tokio::test]
    async fn test_css_import_chain_is_followed() {
        let mut dom = TestDocument::default();
        dom.push(TestElement::new("link").attr("href", "main.css"));

        let fetcher = StaticFetcher::new()
            .with("http://example.com/main.css", b"@import url(\"sub.css\");", "text/css")
            .with("http://example.com/sub.css", b"body { color: blue }", "text/css");

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("page.html");
        let writer = Writer::new_folder(Vec::new(), page_url(), dest.clone());

        let coordinator = Coordinator::new(dom, fetcher, page_url(), writer);
        coordinator.run().await.unwrap();

        let folder = crate::writer::asset_folder_path(&dest);
        assert!(folder.join("main.css").exists());
        assert!(folder.join("sub.css").exists());
    }

    #[tokio::test]
    async fn test_failed_fetch_still_finalizes() {
        let mut dom = TestDocument::default();
        dom.push(TestElement::new("img").attr("src", "missing.png"));

        let fetcher = StaticFetcher::new();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("page.html");
        let writer = Writer::new_folder(Vec::new(), page_url(), dest.clone());

        let coordinator = Coordinator::new(dom, fetcher, page_url(), writer);
        coordinator.run().await.unwrap();
        assert!(dest.exists());
    }
}
