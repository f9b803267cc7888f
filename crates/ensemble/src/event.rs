//! Event wrapper
//!
//! Registers listeners by name on a resolved target. No record of the
//! registered listeners is kept: removing one takes the same
//! `EventListener` that was added.

use std::any::Any;

use ensemble_dom::{Dom, DomEvent, EventListener, ListenerOptions, NodeId};

use crate::{Composition, Ensemble, Result};

/// Where an `Event` listens
#[derive(Debug, Clone, Copy, Default)]
pub enum EventTarget<'a> {
    /// The document root
    #[default]
    Document,
    Node(NodeId),
    /// A composition, unwrapped to its node
    Compo(&'a Composition),
}

impl From<NodeId> for EventTarget<'_> {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Option<NodeId>> for EventTarget<'_> {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(Self::Document, Self::Node)
    }
}

impl<'a> From<&'a Composition> for EventTarget<'a> {
    fn from(compo: &'a Composition) -> Self {
        Self::Compo(compo)
    }
}

/// Named event bound to one target
#[derive(Debug, Clone)]
pub struct Event {
    dom: Dom,
    name: String,
    target: NodeId,
}

impl Event {
    pub fn new<'a>(ensemble: &Ensemble, name: &str, target: impl Into<EventTarget<'a>>) -> Self {
        let target = match target.into() {
            EventTarget::Document => NodeId::ROOT,
            EventTarget::Node(node) => node,
            EventTarget::Compo(compo) => compo.id(),
        };
        Self {
            dom: ensemble.dom().clone(),
            name: name.to_string(),
            target,
        }
    }

    /// Wrap a closure as a listener; keep it to remove it later
    pub fn listener(f: impl Fn(&mut DomEvent) + 'static) -> EventListener {
        EventListener::new(f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved target node
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Register `listener`; a plain `bool` is taken as `capture`
    ///
    /// Returns `false` when the same registration already exists.
    pub fn add(&self, listener: &EventListener, options: impl Into<ListenerOptions>) -> Result<bool> {
        let added = self.dom.borrow_mut().add_event_listener(
            self.target,
            &self.name,
            listener.clone(),
            options,
        )?;
        tracing::trace!("Listener for '{}' on {} added: {}", self.name, self.target, added);
        Ok(added)
    }

    /// Unregister a non-capture `listener`
    pub fn remove(&self, listener: &EventListener) -> Result<bool> {
        self.remove_with(listener, false)
    }

    /// Unregister `listener` registered with matching `capture`
    pub fn remove_with(
        &self,
        listener: &EventListener,
        options: impl Into<ListenerOptions>,
    ) -> Result<bool> {
        let capture = options.into().capture;
        Ok(self
            .dom
            .borrow_mut()
            .remove_event_listener(self.target, &self.name, listener, capture)?)
    }

    /// Dispatch `event` on the target; `false` when default was prevented
    pub fn dispatch(&self, event: &mut DomEvent) -> Result<bool> {
        Ok(self.dom.dispatch_event(self.target, event)?)
    }

    /// Dispatch a fresh bubbling event of this name
    pub fn fire(&self) -> Result<bool> {
        self.dispatch(&mut DomEvent::bubbling(self.name.as_str()))
    }

    pub fn prevent(event: &mut DomEvent) {
        event.prevent_default();
    }

    /// Focus the event's current target
    pub fn focus(ensemble: &Ensemble, event: &DomEvent) -> bool {
        event
            .current_target()
            .is_some_and(|node| ensemble.dom().borrow_mut().focus(node))
    }

    /// Blur the event's current target
    pub fn blur(ensemble: &Ensemble, event: &DomEvent) -> bool {
        event
            .current_target()
            .is_some_and(|node| ensemble.dom().borrow_mut().blur(node))
    }

    /// Type check for values of unknown type
    pub fn is_event(obj: &dyn Any) -> bool {
        obj.is::<Event>()
    }
}
