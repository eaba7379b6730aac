//! `tl`-backed `DomDocument`. `tl` parses into an arena and hands out
//! `NodeHandle`s; attribute and inner-HTML writes are tracked in overlay
//! maps keyed by the `ElementId`s we allocate, and folded back in during
//! `serialize`, since the arena itself is only ever read through `&Parser`.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{DomDocument, ElementId};
use crate::core::ArchiveError;

pub struct TlDocument<'a> {
    dom: tl::VDom<'a>,
    registry: RefCell<Vec<tl::NodeHandle>>,
    attr_overrides: HashMap<usize, Vec<(String, String)>>,
    inner_overrides: HashMap<usize, String>,
}

impl<'a> TlDocument<'a> {
    pub fn parse(html: &'a str) -> Result<Self, ArchiveError> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|_| ArchiveError::usage("failed to parse HTML document".to_string()))?;
        Ok(Self {
            dom,
            registry: RefCell::new(Vec::new()),
            attr_overrides: HashMap::new(),
            inner_overrides: HashMap::new(),
        })
    }

    fn register(&self, handle: tl::NodeHandle) -> ElementId {
        let mut registry = self.registry.borrow_mut();
        registry.push(handle);
        ElementId(registry.len() - 1)
    }

    fn handle(&self, id: ElementId) -> tl::NodeHandle {
        self.registry.borrow()[id.0]
    }

    /// Overrides recorded for a handle, merged across every registry index
    /// that ever pointed at it. A single element can be visited by more than
    /// one query pass (e.g. an `<img>` matched by both `query_tags` and
    /// `elements_with_style_attr`), each registering its own `ElementId`; if
    /// overrides were looked up by a single winning index the earlier pass's
    /// write would be silently dropped.
    fn merged_attr_overrides(&self, ids: &[usize]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();
        for i in ids {
            let Some(overrides) = self.attr_overrides.get(i) else {
                continue;
            };
            for (key, value) in overrides {
                match merged.iter_mut().find(|(k, _)| k == key) {
                    Some(existing) => existing.1 = value.clone(),
                    None => merged.push((key.clone(), value.clone())),
                }
            }
        }
        merged
    }

    fn merged_inner_override(&self, ids: &[usize]) -> Option<&String> {
        ids.iter().rev().find_map(|i| self.inner_overrides.get(i))
    }

    fn render_node(&self, handle: tl::NodeHandle, reverse: &HashMap<tl::NodeHandle, Vec<usize>>, out: &mut String) {
        let Some(node) = handle.get(self.dom.parser()) else {
            return;
        };
        match node {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str();
                let reg_ids = reverse.get(&handle).map(Vec::as_slice).unwrap_or(&[]);
                let overrides = self.merged_attr_overrides(reg_ids);

                out.push('<');
                out.push_str(&name);
                for (key, value) in tag.attributes().iter() {
                    let key_str: &str = key.as_ref();
                    let override_value = overrides.iter().find(|(k, _)| k == key_str);
                    let value_str = match override_value {
                        Some((_, v)) => v.clone(),
                        None => value.map(|v| v.to_string()).unwrap_or_default(),
                    };
                    out.push(' ');
                    out.push_str(key_str);
                    out.push_str("=\"");
                    out.push_str(&value_str);
                    out.push('"');
                }
                for (key, value) in &overrides {
                    if tag.attributes().get(key.as_str()).is_none() {
                        out.push(' ');
                        out.push_str(key);
                        out.push_str("=\"");
                        out.push_str(value);
                        out.push('"');
                    }
                }
                out.push('>');

                match self.merged_inner_override(reg_ids) {
                    Some(inner) => out.push_str(inner),
                    None => {
                        for child in tag.children().top().iter() {
                            self.render_node(*child, reverse, out);
                        }
                    }
                }

                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            tl::Node::Raw(bytes) => out.push_str(&bytes.as_utf8_str()),
            tl::Node::Comment(bytes) => {
                out.push_str("<!--");
                out.push_str(&bytes.as_utf8_str());
                out.push_str("-->");
            }
        }
    }
}

impl<'a> DomDocument for TlDocument<'a> {
    fn query_tags(&self, tags: &[&str]) -> Vec<ElementId> {
        let mut out = Vec::new();
        for tag in tags {
            if let Some(iter) = self.dom.query_selector(tag) {
                for handle in iter {
                    out.push(self.register(handle));
                }
            }
        }
        out
    }

    fn elements_with_style_attr(&self) -> Vec<ElementId> {
        match self.dom.query_selector("[style]") {
            Some(iter) => iter.map(|h| self.register(h)).collect(),
            None => Vec::new(),
        }
    }

    fn get_attr(&self, id: ElementId, name: &str) -> Option<String> {
        if let Some(overrides) = self.attr_overrides.get(&id.0) {
            if let Some((_, v)) = overrides.iter().find(|(k, _)| k == name) {
                return Some(v.clone());
            }
        }
        match self.handle(id).get(self.dom.parser())? {
            tl::Node::Tag(tag) => tag.attributes().get(name).flatten().map(|v| v.to_string()),
            _ => None,
        }
    }

    fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
        let entry = self.attr_overrides.entry(id.0).or_default();
        match entry.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => entry.push((name.to_string(), value.to_string())),
        }
    }

    fn inner_html(&self, id: ElementId) -> String {
        if let Some(html) = self.inner_overrides.get(&id.0) {
            return html.clone();
        }
        match self.handle(id).get(self.dom.parser()) {
            Some(tl::Node::Tag(tag)) => tag.inner_html(self.dom.parser()).into_owned(),
            _ => String::new(),
        }
    }

    fn set_inner_html(&mut self, id: ElementId, html: &str) {
        self.inner_overrides.insert(id.0, html.to_string());
    }

    fn serialize(&self) -> Vec<u8> {
        let mut reverse: HashMap<tl::NodeHandle, Vec<usize>> = HashMap::new();
        for (i, handle) in self.registry.borrow().iter().enumerate() {
            reverse.entry(*handle).or_default().push(i);
        }
        let mut out = String::new();
        for handle in self.dom.children() {
            self.render_node(*handle, &reverse, &mut out);
        }
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_tags_finds_links_and_images() {
        let html = r#"<html><body><link href="a.css"><img src="b.png"></body></html>"#;
        let doc = TlDocument::parse(html).unwrap();
        let ids = doc.query_tags(&["link", "img"]);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_set_attr_round_trips_through_serialize() {
        let html = r#"<img src="old.png">"#;
        let mut doc = TlDocument::parse(html).unwrap();
        let id = doc.query_tags(&["img"])[0];
        assert_eq!(doc.get_attr(id, "src"), Some("old.png".to_string()));
        doc.set_attr(id, "src", "new.png");
        assert_eq!(doc.get_attr(id, "src"), Some("new.png".to_string()));
        let serialized = String::from_utf8(doc.serialize()).unwrap();
        assert!(serialized.contains("new.png"));
        assert!(!serialized.contains("old.png"));
    }

    #[test]
    fn test_elements_with_style_attr() {
        let html = r#"<div style="color: red"><p>text</p></div>"#;
        let doc = TlDocument::parse(html).unwrap();
        assert_eq!(doc.elements_with_style_attr().len(), 1);
    }

    #[test]
    fn test_set_inner_html_round_trips() {
        let html = r#"<style>body { color: red; }</style>"#;
        let mut doc = TlDocument::parse(html).unwrap();
        let id = doc.query_tags(&["style"])[0];
        doc.set_inner_html(id, "body { color: blue; }");
        let serialized = String::from_utf8(doc.serialize()).unwrap();
        assert!(serialized.contains("color: blue"));
        assert!(!serialized.contains("color: red"));
    }

    #[test]
    fn test_overrides_from_two_query_passes_both_survive() {
        let html = r#"<img src="old.png" style="background: url(old-bg.png)">"#;
        let mut doc = TlDocument::parse(html).unwrap();
        let by_tag = doc.query_tags(&["img"])[0];
        doc.set_attr(by_tag, "src", "new.png");
        let by_style = doc.elements_with_style_attr()[0];
        doc.set_attr(by_style, "style", "background: url(new-bg.png)");

        let serialized = String::from_utf8(doc.serialize()).unwrap();
        assert!(serialized.contains(r#"src="new.png""#));
        assert!(serialized.contains("new-bg.png"));
        assert!(!serialized.contains("old.png"));
        assert!(!serialized.contains("old-bg.png"));
    }
}
