//! DOM Events
//!
//! Event objects, listener identity and listener options.

use std::cell::Cell;
use std::rc::Rc;

use crate::NodeId;

/// Dispatch phase of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) phase: EventPhase,
    pub(crate) in_passive_listener: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl DomEvent {
    /// Create a non-bubbling, non-cancelable event
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            cancelable: false,
            target: NodeId::NONE,
            current_target: NodeId::NONE,
            phase: EventPhase::None,
            in_passive_listener: false,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Create a bubbling, cancelable event (e.g. `click`)
    pub fn bubbling(event_type: impl Into<String>) -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            ..Self::new(event_type)
        }
    }

    /// Event type name
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> Option<NodeId> {
        self.target.some()
    }

    /// Node whose listeners are currently running
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.some()
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// Prevent default action; ignored for non-cancelable events and
    /// inside passive listeners
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further nodes
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip the remaining listeners on this node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

/// Event listener callback
///
/// Identity is the allocation: clones compare equal, two separately created
/// listeners never do, even when built from the same closure.
#[derive(Clone)]
pub struct EventListener(Rc<dyn Fn(&mut DomEvent)>);

impl EventListener {
    pub fn new(f: impl Fn(&mut DomEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub(crate) fn call(&self, event: &mut DomEvent) {
        (self.0)(event)
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for EventListener {}

impl std::fmt::Debug for EventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EventListener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self { capture: true, ..Default::default() }
    }

    pub fn once() -> Self {
        Self { once: true, ..Default::default() }
    }

    pub fn passive() -> Self {
        Self { passive: true, ..Default::default() }
    }
}

/// Legacy `useCapture` boolean
impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self { capture, ..Default::default() }
    }
}

/// Listener registration stored on a node
#[derive(Debug, Clone)]
pub(crate) struct RegisteredListener {
    pub event_type: String,
    pub listener: EventListener,
    pub options: ListenerOptions,
    /// Set on removal so an in-flight dispatch skips it
    pub removed: Rc<Cell<bool>>,
}

impl RegisteredListener {
    pub fn new(event_type: &str, listener: EventListener, options: ListenerOptions) -> Self {
        Self {
            event_type: event_type.to_string(),
            listener,
            options,
            removed: Rc::new(Cell::new(false)),
        }
    }

    pub fn matches(&self, event_type: &str, listener: &EventListener, capture: bool) -> bool {
        self.event_type == event_type && &self.listener == listener && self.options.capture == capture
    }
}
