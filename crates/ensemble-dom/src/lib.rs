//! ensemble DOM - Document Object Model
//!
//! Arena-backed, single-threaded DOM used as the native runtime underneath
//! ensemble compositions: node creation, tree mutation, attributes,
//! computed style and event dispatch.

mod attributes;
mod classlist;
mod document;
mod dom;
mod events;
mod node;
mod operations;
mod style;

pub use attributes::AttributeMap;
pub use classlist::ClassTokens;
pub use document::Document;
pub use dom::{ClassList, Dom};
pub use events::{DomEvent, EventListener, EventPhase, ListenerOptions};
pub use node::{ElementData, Node, NodeData, PropertyValue, TextData};
pub use operations::{DomError, DomResult};
pub use style::{ComputedStyle, SimpleSelector, to_kebab_case};

/// Node identifier: arena slot plus the generation of that slot
///
/// A slot is reused after its node is released, under a new generation, so
/// an id kept past `release` never resolves to the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId::new(0, 0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId::new(u32::MAX, 0);

    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self.index != Self::NONE.index
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    /// Convert a sentinel-encoded link into an `Option`
    #[inline]
    pub(crate) fn some(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.generation {
            0 => write!(f, "#{}", self.index),
            generation => write!(f, "#{}/{}", self.index, generation),
        }
    }
}
