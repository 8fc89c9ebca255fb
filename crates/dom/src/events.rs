//! DOM events and listener registries.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::document::NodeId;

/// Event types the page guard produces or observes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Input,
    Load,
    ReadyStateChange,
    Error,
    Custom(String),
}

impl EventType {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "input" => EventType::Input,
            "load" => EventType::Load,
            "readystatechange" => EventType::ReadyStateChange,
            "error" => EventType::Error,
            other => EventType::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Input => "input",
            EventType::Load => "load",
            EventType::ReadyStateChange => "readystatechange",
            EventType::Error => "error",
            EventType::Custom(s) => s,
        }
    }
}

/// DOM Event.
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    /// Target element, for events raised inside a document.
    pub target: Option<NodeId>,
    /// Error message, for synthesized error events.
    pub message: Option<String>,
    /// Whether the event came from the user agent rather than a script.
    pub is_trusted: bool,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            target: None,
            message: None,
            is_trusted: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(EventType::Error)
        }
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn trusted(mut self) -> Self {
        self.is_trusted = true;
        self
    }
}

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Listeners attached to one event target.
#[derive(Clone, Default)]
pub struct EventListeners {
    listeners: Arc<RwLock<Vec<(EventType, Listener)>>>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event_type: EventType, listener: impl Fn(&Event) + Send + Sync + 'static) {
        self.listeners.write().push((event_type, Arc::new(listener)));
    }

    /// Invoke every listener registered for the event's type. Returns how
    /// many ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        // Snapshot so listeners may register further listeners.
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(ty, _)| *ty == event.event_type)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &matching {
            listener(event);
        }
        matching.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners").field("len", &self.len()).finish()
    }
}
