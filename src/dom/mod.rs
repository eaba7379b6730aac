//! DOM consumer interface (§6): the external collaborator that would
//! normally be a live rendering engine. Expressed as a trait so the
//! coordinator is agnostic of where the document tree came from; the `tl`
//! adapter in `tl_dom` is the concrete implementation used by the CLI.

mod tl_dom;

pub use tl_dom::TlDocument;

/// Opaque handle to an element within a `DomDocument`. Meaning is entirely
/// up to the implementation; the coordinator only ever passes these back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

pub trait DomDocument {
    /// Elements matching any of the given lowercase tag names, in document
    /// order. `"[style]"` is not a tag name — callers that need "any element
    /// with a `style` attribute" use `elements_with_style_attr` instead.
    fn query_tags(&self, tags: &[&str]) -> Vec<ElementId>;

    /// All elements carrying a `style` attribute, in document order.
    fn elements_with_style_attr(&self) -> Vec<ElementId>;

    fn get_attr(&self, id: ElementId, name: &str) -> Option<String>;
    fn set_attr(&mut self, id: ElementId, name: &str, value: &str);

    fn inner_html(&self, id: ElementId) -> String;
    fn set_inner_html(&mut self, id: ElementId, html: &str);

    /// Serialize the whole document to UTF-8 bytes.
    fn serialize(&self) -> Vec<u8>;
}

#[cfg(test)]
pub mod test_double {
    //! A minimal in-memory `DomDocument` used by coordinator unit tests, so
    //! those tests don't depend on real HTML parsing.
    use super::{DomDocument, ElementId};

    #[derive(Debug, Clone)]
    pub struct TestElement {
        pub tag: String,
        pub attrs: Vec<(String, String)>,
        pub inner_html: String,
        pub has_style_attr: bool,
    }

    impl TestElement {
        pub fn new(tag: &str) -> Self {
            Self {
                tag: tag.to_string(),
                attrs: Vec::new(),
                inner_html: String::new(),
                has_style_attr: false,
            }
        }

        pub fn attr(mut self, name: &str, value: &str) -> Self {
            if name == "style" {
                self.has_style_attr = true;
            }
            self.attrs.push((name.to_string(), value.to_string()));
            self
        }

        pub fn with_inner_html(mut self, html: &str) -> Self {
            self.inner_html = html.to_string();
            self
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct TestDocument {
        pub elements: Vec<TestElement>,
    }

    impl TestDocument {
        pub fn push(&mut self, element: TestElement) -> ElementId {
            self.elements.push(element);
            ElementId(self.elements.len() - 1)
        }
    }

    impl DomDocument for TestDocument {
        fn query_tags(&self, tags: &[&str]) -> Vec<ElementId> {
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| tags.contains(&e.tag.as_str()))
                .map(|(i, _)| ElementId(i))
                .collect()
        }

        fn elements_with_style_attr(&self) -> Vec<ElementId> {
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.has_style_attr)
                .map(|(i, _)| ElementId(i))
                .collect()
        }

        fn get_attr(&self, id: ElementId, name: &str) -> Option<String> {
            self.elements[id.0]
                .attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }

        fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
            let element = &mut self.elements[id.0];
            if let Some(existing) = element.attrs.iter_mut().find(|(k, _)| k == name) {
                existing.1 = value.to_string();
            } else {
                element.attrs.push((name.to_string(), value.to_string()));
            }
        }

        fn inner_html(&self, id: ElementId) -> String {
            self.elements[id.0].inner_html.clone()
        }

        fn set_inner_html(&mut self, id: ElementId, html: &str) {
            self.elements[id.0].inner_html = html.to_string();
        }

        fn serialize(&self) -> Vec<u8> {
            let mut out = String::new();
            for element in &self.elements {
                out.push_str(&format!("<{}", element.tag));
                for (k, v) in &element.attrs {
                    out.push_str(&format!(" {k}=\"{v}\""));
                }
                out.push('>');
                out.push_str(&element.inner_html);
                out.push_str(&format!("</{}>", element.tag));
            }
            out.into_bytes()
        }
    }
}
