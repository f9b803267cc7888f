//! Shared document handle and event dispatch
//!
//! `Dom` is the single-threaded handle every wrapper holds. Borrows of the
//! underlying `Document` are kept short, and none is held while listeners
//! run, so listeners are free to mutate the tree.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::events::RegisteredListener;
use crate::{ClassTokens, Document, DomEvent, DomResult, EventPhase, NodeId};

/// Shared handle to a `Document`
#[derive(Clone, Default)]
pub struct Dom(Rc<RefCell<Document>>);

impl Dom {
    pub fn new(document: Document) -> Self {
        Self(Rc::new(RefCell::new(document)))
    }

    /// Borrow the document
    ///
    /// # Panics
    /// If the document is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Document> {
        self.0.borrow()
    }

    /// Mutably borrow the document
    ///
    /// # Panics
    /// If the document is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Document> {
        self.0.borrow_mut()
    }

    /// Mutable borrow that fails instead of panicking
    pub fn try_borrow_mut(&self) -> Option<RefMut<'_, Document>> {
        self.0.try_borrow_mut().ok()
    }

    /// Whether both handles point at the same document
    pub fn ptr_eq(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Live class list handle for an element
    pub fn class_list(&self, node: NodeId) -> ClassList {
        ClassList { dom: self.clone(), node }
    }

    /// Dispatch an event to `target`
    ///
    /// Runs capture listeners from the top of the tree down, the target's own
    /// listeners, then (for bubbling events) non-capture listeners back up.
    /// `on<type>` handler properties run after the listeners of each node.
    /// Returns `false` if a listener prevented the default action.
    pub fn dispatch_event(&self, target: NodeId, event: &mut DomEvent) -> DomResult<bool> {
        let path = {
            let doc = self.borrow();
            if !doc.contains(target) {
                return Err(crate::DomError::NotFound(target));
            }
            doc.ancestors(target)
        };
        tracing::trace!("Dispatching '{}' to {}", event.event_type(), target);

        event.target = target;

        event.phase = EventPhase::Capturing;
        for &node in path.iter().rev() {
            if event.is_propagation_stopped() {
                break;
            }
            self.invoke(node, event, Some(true));
        }

        if !event.is_propagation_stopped() {
            event.phase = EventPhase::AtTarget;
            self.invoke(target, event, None);
        }

        if event.bubbles {
            event.phase = EventPhase::Bubbling;
            for &node in &path {
                if event.is_propagation_stopped() {
                    break;
                }
                self.invoke(node, event, Some(false));
            }
        }

        event.phase = EventPhase::None;
        event.current_target = NodeId::NONE;
        Ok(!event.is_default_prevented())
    }

    /// Run listeners of one node; `capture` filters by phase, `None` runs
    /// capture listeners then the rest (at-target)
    fn invoke(&self, node: NodeId, event: &mut DomEvent, capture: Option<bool>) {
        let (registered, handler) = {
            let doc = self.borrow();
            let mut registered = doc.listeners_for(node, event.event_type());
            registered.sort_by_key(|r| !r.options.capture);
            if let Some(capture) = capture {
                registered.retain(|r| r.options.capture == capture);
            }
            let handler = match capture {
                Some(true) => None,
                _ => doc.event_handler(node, event.event_type()),
            };
            (registered, handler)
        };

        event.current_target = node;
        for registration in registered {
            if event.is_immediate_propagation_stopped() {
                return;
            }
            self.run(node, event, &registration);
        }
        if let Some(handler) = handler {
            if !event.is_immediate_propagation_stopped() {
                handler.call(event);
            }
        }
    }

    fn run(&self, node: NodeId, event: &mut DomEvent, registration: &RegisteredListener) {
        if registration.removed.get() {
            return;
        }
        if registration.options.once {
            self.borrow_mut().drop_listener(node, registration);
        }
        event.in_passive_listener = registration.options.passive;
        registration.listener.call(event);
        event.in_passive_listener = false;
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(doc) => f.debug_struct("Dom").field("nodes", &doc.len()).finish(),
            Err(_) => f.write_str("Dom { <borrowed> }"),
        }
    }
}

/// Live `classList` of an element
///
/// Reads and writes go straight to the document; operations on a
/// non-element are no-ops.
#[derive(Debug, Clone)]
pub struct ClassList {
    dom: Dom,
    node: NodeId,
}

impl ClassList {
    fn read<T>(&self, f: impl FnOnce(&ClassTokens) -> T) -> Option<T> {
        self.dom.borrow().class_list(self.node).map(f)
    }

    fn write<T>(&self, f: impl FnOnce(&mut ClassTokens) -> T) -> Option<T> {
        self.dom.borrow_mut().class_list_mut(self.node).ok().map(f)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.read(|l| l.contains(token)).unwrap_or(false)
    }

    pub fn add(&self, tokens: &[&str]) {
        self.write(|l| l.add(tokens));
    }

    pub fn remove(&self, tokens: &[&str]) {
        self.write(|l| l.remove(tokens));
    }

    /// Toggle token, returns new state
    pub fn toggle(&self, token: &str, force: Option<bool>) -> bool {
        self.write(|l| l.toggle(token, force)).unwrap_or(false)
    }

    pub fn replace(&self, old_token: &str, new_token: &str) -> bool {
        self.write(|l| l.replace(old_token, new_token)).unwrap_or(false)
    }

    pub fn length(&self) -> usize {
        self.read(ClassTokens::len).unwrap_or(0)
    }

    pub fn value(&self) -> String {
        self.read(ClassTokens::value).unwrap_or_default()
    }

    /// Snapshot of the current tokens
    pub fn tokens(&self) -> Vec<String> {
        self.read(|l| l.iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
