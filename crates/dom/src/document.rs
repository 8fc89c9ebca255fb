//! DOM Document implementation.

use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

use crate::element::Element;
use crate::events::{Event, EventListeners, EventType};

new_key_type! {
    /// Handle to an element owned by a [`Document`].
    pub struct NodeId;
}

/// Name of the meta element carrying a declared policy.
pub const CSP_HTTP_EQUIV: &str = "Content-Security-Policy";

/// Runs against the target element of every `input` event, before listeners.
pub trait InputHook: Send + Sync {
    fn on_input(&self, element: &mut Element);
}

/// Where an attached element lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Head,
    Body,
}

/// DOM Document.
#[derive(Default)]
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    head: Vec<NodeId>,
    body: Vec<NodeId>,
    input_hooks: Vec<Arc<dyn InputHook>>,
    listeners: EventListeners,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.nodes.insert(element)
    }

    pub fn append_to_head(&mut self, element: Element) -> NodeId {
        let id = self.create_element(element);
        self.head.push(id);
        id
    }

    pub fn append_to_body(&mut self, element: Element) -> NodeId {
        let id = self.create_element(element);
        self.body.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id)
    }

    fn section_of(&self, id: NodeId) -> Option<Section> {
        if self.head.contains(&id) {
            Some(Section::Head)
        } else if self.body.contains(&id) {
            Some(Section::Body)
        } else {
            None
        }
    }

    /// Whether the element is attached to the document.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.section_of(id).is_some()
    }

    /// Attached elements in document order (head first).
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.head
            .iter()
            .chain(self.body.iter())
            .filter_map(|&id| self.nodes.get(id).map(|el| (id, el)))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .find(|(_, el)| el.id() == Some(id))
            .map(|(node, _)| node)
    }

    /// Detach and drop an element.
    pub fn remove(&mut self, id: NodeId) -> Option<Element> {
        match self.section_of(id)? {
            Section::Head => self.head.retain(|&n| n != id),
            Section::Body => self.body.retain(|&n| n != id),
        }
        self.nodes.remove(id)
    }

    /// First `<meta http-equiv=...>` in the head with the given name.
    pub fn meta_http_equiv(&self, name: &str) -> Option<NodeId> {
        self.head.iter().copied().find(|&id| {
            self.nodes.get(id).is_some_and(|el| {
                el.tag_name() == "meta"
                    && el
                        .get_attribute("http-equiv")
                        .is_some_and(|v| v.eq_ignore_ascii_case(name))
            })
        })
    }

    /// Content of the declared policy meta element, if any.
    pub fn declared_policy(&self) -> Option<&str> {
        self.meta_http_equiv(CSP_HTTP_EQUIV)
            .and_then(|id| self.nodes.get(id))
            .and_then(|el| el.get_attribute("content"))
    }

    /// Append a policy meta element to the head.
    pub fn install_policy(&mut self, policy: &str) -> NodeId {
        self.append_to_head(
            Element::new("meta")
                .with_attribute("http-equiv", CSP_HTTP_EQUIV)
                .with_attribute("content", policy),
        )
    }

    pub fn add_input_hook(&mut self, hook: Arc<dyn InputHook>) {
        self.input_hooks.push(hook);
    }

    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    /// Simulate the user editing `target`: store the new value, then raise
    /// an `input` event. Returns `false` if the element is not attached.
    pub fn input(&mut self, target: NodeId, value: impl Into<String>) -> bool {
        if !self.is_connected(target) {
            return false;
        }
        let Some(element) = self.nodes.get_mut(target) else {
            return false;
        };

        element.set_value(value);
        for hook in &self.input_hooks {
            hook.on_input(element);
        }

        let event = Event::new(EventType::Input).with_target(target).trusted();
        self.listeners.dispatch(&event);
        true
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("head", &self.head.len())
            .field("body", &self.body.len())
            .field("input_hooks", &self.input_hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Upper;

    impl InputHook for Upper {
        fn on_input(&self, element: &mut Element) {
            let upper = element.value().to_uppercase();
            element.set_value(upper);
        }
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        doc.append_to_body(Element::new("div").with_attribute("id", "main"));
        let script = doc.append_to_body(Element::new("script").with_attribute("id", "guard"));

        assert_eq!(doc.get_element_by_id("guard"), Some(script));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }

    #[test]
    fn test_remove_detaches() {
        let mut doc = Document::new();
        let id = doc.append_to_body(Element::new("script").with_attribute("id", "guard"));

        assert!(doc.remove(id).is_some());
        assert!(!doc.is_connected(id));
        assert!(doc.get_element_by_id("guard").is_none());
        assert!(doc.remove(id).is_none());
    }

    #[test]
    fn test_declared_policy() {
        let mut doc = Document::new();
        assert_eq!(doc.declared_policy(), None);

        doc.append_to_head(Element::new("meta").with_attribute("charset", "utf-8"));
        doc.append_to_head(
            Element::new("meta")
                .with_attribute("http-equiv", "content-security-policy")
                .with_attribute("content", "default-src 'self'"),
        );
        assert_eq!(doc.declared_policy(), Some("default-src 'self'"));
    }

    #[test]
    fn test_install_policy() {
        let mut doc = Document::new();
        let id = doc.install_policy("default-src 'self' https://example.com;");

        assert_eq!(doc.meta_http_equiv(CSP_HTTP_EQUIV), Some(id));
        assert_eq!(doc.declared_policy(), Some("default-src 'self' https://example.com;"));
    }

    #[test]
    fn test_input_runs_hooks_then_listeners() {
        let mut doc = Document::new();
        let field = doc.append_to_body(Element::new("input"));
        doc.add_input_hook(Arc::new(Upper));

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        doc.listeners().add(EventType::Input, move |event| {
            assert!(event.is_trusted);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(doc.input(field, "hello"));
        assert_eq!(doc.get(field).unwrap().value(), "HELLO");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_input_on_detached_element() {
        let mut doc = Document::new();
        let detached = doc.create_element(Element::new("input"));
        assert!(!doc.input(detached, "x"));
    }
}
