//! Ensemble context
//!
//! Holds the shared `Dom`, the configuration and the side table mapping a
//! node back to the composition that owns it. The side table only holds
//! weak references and is used for lookups, never for lifetime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use ensemble_dom::{Document, Dom, NodeId};

use crate::compo::CompoInner;
use crate::{Composition, CompositionBuilder, Config, Data, Event, EventTarget, Result};

struct Shared {
    dom: Dom,
    config: Config,
    registry: RefCell<HashMap<NodeId, Weak<CompoInner>>>,
}

/// Entry point: a document plus the compositions built on top of it
#[derive(Clone)]
pub struct Ensemble {
    shared: Rc<Shared>,
}

impl Ensemble {
    /// Fresh document with an `html`/`head`/`body` skeleton
    pub fn new(config: Config) -> Self {
        Self::with_dom(Dom::new(Document::new()), config)
    }

    /// Build on an existing document
    pub fn with_dom(dom: Dom, config: Config) -> Self {
        tracing::debug!("Ensemble created with namespace '{}'", config.namespace);
        Self {
            shared: Rc::new(Shared {
                dom,
                config,
                registry: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.shared.dom
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn namespace(&self) -> &str {
        &self.shared.config.namespace
    }

    /// Document body, if the document has one
    pub fn body(&self) -> Option<NodeId> {
        self.shared.dom.borrow().body()
    }

    /// Builder in the configured namespace
    pub fn builder(&self) -> CompositionBuilder<'_> {
        CompositionBuilder::new(self, self.namespace())
    }

    /// Element composition in the configured namespace
    pub fn compo(
        &self,
        tag: &str,
        name: impl Into<crate::Name>,
        props: crate::Props,
    ) -> Result<Composition> {
        self.builder().tag(tag).name(name).props(props).build()
    }

    /// Empty fragment composition in the configured namespace
    pub fn fragment(&self) -> Result<Composition> {
        Composition::fragment(self, self.namespace())
    }

    /// Slot table in the configured namespace
    pub fn data(&self) -> Data {
        Data::new(self, self.namespace())
    }

    /// Event wrapper bound to `target`
    pub fn event<'a>(&self, name: &str, target: impl Into<EventTarget<'a>>) -> Event {
        Event::new(self, name, target)
    }

    /// Simple-selector query within `node` (the document when `None`)
    ///
    /// With `all` unset at most one node is returned.
    pub fn selector(&self, query: &str, node: Option<NodeId>, all: bool) -> Vec<NodeId> {
        let doc = self.shared.dom.borrow();
        let root = node.unwrap_or(NodeId::ROOT);
        if all {
            doc.query_selector_all(root, query)
        } else {
            doc.query_selector(root, query).into_iter().collect()
        }
    }

    /// Computed time of a style property in milliseconds
    ///
    /// Defaults to `transition-duration`.
    pub fn timing(&self, node: NodeId, prop: Option<&str>) -> u64 {
        let value = self
            .shared
            .dom
            .borrow()
            .computed_style(node)
            .get(prop.unwrap_or("transitionDuration"))
            .to_string();
        crate::compo::parse_time(&value)
    }

    /// Composition owning `node`, if it is still alive
    pub fn compo_for(&self, node: NodeId) -> Option<Composition> {
        self.resolve(node).map(|inner| Composition { inner })
    }

    /// Number of live compositions
    pub fn live_compositions(&self) -> usize {
        self.shared
            .registry
            .borrow()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub(crate) fn register(&self, node: NodeId, inner: &Rc<CompoInner>) {
        self.shared
            .registry
            .borrow_mut()
            .insert(node, Rc::downgrade(inner));
    }

    pub(crate) fn unregister(&self, node: NodeId) {
        if let Ok(mut registry) = self.shared.registry.try_borrow_mut() {
            registry.remove(&node);
        }
    }

    pub(crate) fn resolve(&self, node: NodeId) -> Option<Rc<CompoInner>> {
        self.shared
            .registry
            .borrow()
            .get(&node)
            .and_then(Weak::upgrade)
    }

    pub(crate) fn same(&self, other: &Ensemble) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble")
            .field("namespace", &self.namespace())
            .field("dom", &self.shared.dom)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Props;

    #[test]
    fn test_compo_for_round_trip() {
        let ensemble = Ensemble::default();
        let compo = ensemble.compo("section", "panel", Props::new()).unwrap();
        let found = ensemble.compo_for(compo.id()).unwrap();
        assert_eq!(found, compo);
    }

    #[test]
    fn test_registry_is_weak() {
        let ensemble = Ensemble::default();
        let compo = ensemble.compo("div", "box", Props::new()).unwrap();
        let node = compo.id();
        assert_eq!(ensemble.live_compositions(), 1);

        drop(compo);
        assert!(ensemble.compo_for(node).is_none());
        assert_eq!(ensemble.live_compositions(), 0);
    }

    #[test]
    fn test_selector() {
        let ensemble = Ensemble::default();
        let body = ensemble.body().unwrap();
        let a = ensemble.compo("p", "note", Props::new()).unwrap();
        let b = ensemble.compo("p", "note", Props::new()).unwrap();
        a.install(body).unwrap();
        b.install(body).unwrap();

        assert_eq!(ensemble.selector(".ensemble-note", None, true), vec![a.id(), b.id()]);
        assert_eq!(ensemble.selector("p", Some(body), false), vec![a.id()]);
        assert!(ensemble.selector("p > a", None, true).is_empty());
    }

    #[test]
    fn test_timing_of_raw_node() {
        let ensemble = Ensemble::default();
        let node = {
            let mut doc = ensemble.dom().borrow_mut();
            let node = doc.create_element("div");
            doc.set_attribute(node, "style", "transition-duration: 0.25s").unwrap();
            node
        };
        assert_eq!(ensemble.timing(node, None), 250);
        assert_eq!(ensemble.timing(node, Some("animationDuration")), 0);
    }
}
