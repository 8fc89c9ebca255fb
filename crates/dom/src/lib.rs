//! Page object model.
//!
//! A small document tree: enough structure for the page guard to find
//! policy meta elements, watch editable fields, and remove its own marker.

pub mod attributes;
pub mod element;
pub mod document;
pub mod events;

pub use attributes::AttributeMap;
pub use element::Element;
pub use document::{Document, InputHook, NodeId, CSP_HTTP_EQUIV};
pub use events::{Event, EventListeners, EventType};
