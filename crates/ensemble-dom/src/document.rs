//! Document - arena DOM with tree mutation
//!
//! Nodes live in generation-stamped arena slots addressed by `NodeId`.
//! Released slots go on a free list and are handed out again under the next
//! generation, so a stale `NodeId` resolves to nothing rather than to an
//! unrelated node. A slot whose generation is spent is retired.

use crate::events::{EventListener, ListenerOptions, RegisteredListener};
use crate::style::StyleRule;
use crate::{ClassTokens, DomError, DomResult, ElementData, Node, NodeData, NodeId, PropertyValue};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    active_element: NodeId,
    pub(crate) rules: Vec<StyleRule>,
}

impl Document {
    /// Create a document with an `<html>`, `<head>` and `<body>` skeleton
    pub fn new() -> Self {
        let mut doc = Self::empty();

        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");

        doc.link(NodeId::ROOT, html, None);
        doc.link(html, head, None);
        doc.link(html, body, None);

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create a document holding only the document node
    pub fn empty() -> Self {
        Self {
            nodes: vec![Slot {
                generation: 0,
                node: Some(Node::document()),
            }],
            free: Vec::new(),
            live: 1,
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            active_element: NodeId::NONE,
            rules: Vec::new(),
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element.some()
    }

    /// Get `<head>` element
    pub fn head(&self) -> Option<NodeId> {
        self.head_element.some()
    }

    /// Get `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element.some()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the arena holds no live nodes
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.nodes.len();
        assert!(index < NodeId::NONE.index(), "node arena is full");
        self.nodes.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index as u32, 0)
    }

    /// Empty the slot of `id` and hand it back under the next generation
    fn free(&mut self, id: NodeId) {
        let Some(slot) = self
            .nodes
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation && s.node.is_some())
        else {
            return;
        };
        slot.node = None;
        self.live -= 1;
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(id.index);
        }
    }

    /// Create a detached HTML element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(Node::element(tag_name, None))
    }

    /// Create a detached namespaced element (e.g. SVG content)
    pub fn create_element_ns(&mut self, namespace_uri: &str, qualified_name: &str) -> NodeId {
        self.alloc(Node::element(qualified_name, Some(namespace_uri)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content.to_string()))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(Node::fragment())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.as_element().ok_or(DomError::InvalidNodeType(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))
    }

    /// Whether `id` refers to a live node of this document
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_fragment)
    }

    /// Tag name of an element (lowercase for HTML elements)
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag_name.as_str())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.some()
    }

    /// Parent, if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.some()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.some()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.some()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.some()
    }

    /// All child nodes in order
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.first_child(id);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.next_sibling(child);
        }
        out
    }

    /// Element children in order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.child_nodes(id)
            .into_iter()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.first_child(id);
        while let Some(child) = cursor {
            if self.is_element(child) {
                return Some(child);
            }
            cursor = self.next_sibling(child);
        }
        None
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.last_child(id);
        while let Some(child) = cursor {
            if self.is_element(child) {
                return Some(child);
            }
            cursor = self.previous_sibling(child);
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.next_sibling(id);
        while let Some(sibling) = cursor {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            cursor = self.next_sibling(sibling);
        }
        None
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.previous_sibling(id);
        while let Some(sibling) = cursor {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            cursor = self.previous_sibling(sibling);
        }
        None
    }

    /// Descendants in tree order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_nodes(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_nodes(next).into_iter().rev());
        }
        out
    }

    /// Ancestors from the parent up to the top of the tree
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            out.push(p);
            cursor = self.parent(p);
        }
        out
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).contains(&ancestor)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a child node; an attached child is moved
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert before a reference child (or append when `None`)
    ///
    /// Inserting a fragment moves its children and leaves it empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if matches!(self.node(child)?.data, NodeData::Document)
            || self.is_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(r) = reference {
            if self.node(r)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: r });
            }
        }

        if self.is_fragment(child) {
            for moved in self.child_nodes(child) {
                self.detach(moved);
                self.link(parent, moved, reference);
            }
            return Ok(child);
        }

        let reference = match reference {
            Some(r) if r == child => self.next_sibling(child),
            other => other,
        };
        self.detach(child);
        self.link(parent, child, reference);
        Ok(child)
    }

    /// Remove a child node; it stays alive, detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Replace `old_child` of `parent` with `new_child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.node(old_child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child: old_child });
        }
        if new_child == old_child {
            return Ok(old_child);
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.detach(old_child);
        Ok(old_child)
    }

    /// Put `new` where `old` is; returns `false` when `old` is detached
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> DomResult<bool> {
        self.node(new)?;
        match self.node(old)?.parent.some() {
            Some(parent) => self.replace_child(parent, new, old).map(|_| true),
            None => Ok(false),
        }
    }

    /// Detach and free a subtree, returns the number of freed nodes
    pub fn release(&mut self, id: NodeId) -> DomResult<usize> {
        if id == NodeId::ROOT {
            return Err(DomError::InvalidNodeType(id));
        }
        self.node(id)?;
        self.detach(id);

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for &gone in &doomed {
            self.free(gone);
            if self.active_element == gone {
                self.active_element = NodeId::NONE;
            }
        }
        tracing::trace!("Released {} nodes from {}", doomed.len(), id);
        Ok(doomed.len())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(node) = self.get(child) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let (prev, next) = match reference {
            Some(r) => (self.get(r).map_or(NodeId::NONE, |n| n.prev_sibling), r),
            None => (self.get(parent).map_or(NodeId::NONE, |n| n.last_child), NodeId::NONE),
        };

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = child;
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = child;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = child;
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = child;
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.element(id).ok()?.get_attr(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute, returns whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_ok_and(|e| e.has_attr(name))
    }

    /// Class attribute value (empty when unset)
    pub fn class_name(&self, id: NodeId) -> String {
        self.element(id)
            .map(|e| e.class_list.value())
            .unwrap_or_default()
    }

    pub fn set_class_name(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        self.element_mut(id)?.class_list.assign(value);
        Ok(())
    }

    pub fn class_list(&self, id: NodeId) -> Option<&ClassTokens> {
        self.element(id).ok().map(|e| &e.class_list)
    }

    pub fn class_list_mut(&mut self, id: NodeId) -> DomResult<&mut ClassTokens> {
        Ok(&mut self.element_mut(id)?.class_list)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attribute(id, "hidden")
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> DomResult<()> {
        self.element_mut(id)?.attrs.set_flag("hidden", hidden);
        Ok(())
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, "disabled")
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) -> DomResult<()> {
        self.element_mut(id)?.attrs.set_flag("disabled", disabled);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// Set an element property
    ///
    /// Common IDL properties reflect onto attributes; anything else is kept
    /// as an expando value on the element.
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> DomResult<()> {
        let value = value.into();
        match name {
            "hidden" => self.set_hidden(id, value.is_truthy()),
            "disabled" => self.set_disabled(id, value.is_truthy()),
            "textContent" | "innerText" => self.set_text_content(id, &value.to_text()),
            "className" => self.set_class_name(id, &value.to_text()),
            _ => match reflected_attribute(name) {
                Some(attr) => self.set_attribute(id, attr, &value.to_text()),
                None => {
                    self.element_mut(id)?.properties.insert(name.to_string(), value);
                    Ok(())
                }
            },
        }
    }

    /// Read an element property
    pub fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
        let element = self.element(id).ok()?;
        match name {
            "hidden" | "disabled" => Some(PropertyValue::Bool(element.has_attr(name))),
            "textContent" | "innerText" => Some(PropertyValue::Text(self.text_content(id))),
            "className" => Some(PropertyValue::Text(element.class_list.value())),
            "tabIndex" => {
                let index = element
                    .get_attr("tabindex")
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(-1.0);
                Some(PropertyValue::Number(index))
            }
            _ => match reflected_attribute(name) {
                Some(attr) => Some(PropertyValue::Text(element.get_attr(attr).unwrap_or_default())),
                None => element.properties.get(name).cloned(),
            },
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children with a single text node
    ///
    /// Former children are released; detach any that must outlive this.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        if !self.node(id)?.is_container() {
            if let NodeData::Text(data) = &mut self.node_mut(id)?.data {
                data.content = text.to_string();
            }
            return Ok(());
        }
        for child in self.child_nodes(id) {
            self.release(child)?;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.link(id, node, None);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event handlers and listeners
    // ------------------------------------------------------------------

    /// Set or clear the `on<type>` handler property of an element
    pub fn set_event_handler(
        &mut self,
        id: NodeId,
        event_type: &str,
        handler: Option<EventListener>,
    ) -> DomResult<()> {
        let handlers = &mut self.element_mut(id)?.handlers;
        match handler {
            Some(h) => {
                handlers.insert(event_type.to_string(), h);
            }
            None => {
                handlers.remove(event_type);
            }
        }
        Ok(())
    }

    pub fn event_handler(&self, id: NodeId, event_type: &str) -> Option<EventListener> {
        self.element(id).ok()?.handlers.get(event_type).cloned()
    }

    /// Register a listener; returns `false` when an identical
    /// `(type, listener, capture)` registration already exists
    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        event_type: &str,
        listener: EventListener,
        options: impl Into<ListenerOptions>,
    ) -> DomResult<bool> {
        let options = options.into();
        let node = self.node_mut(id)?;
        if node
            .listeners
            .iter()
            .any(|r| r.matches(event_type, &listener, options.capture))
        {
            return Ok(false);
        }
        node.listeners
            .push(RegisteredListener::new(event_type, listener, options));
        Ok(true)
    }

    /// Unregister a listener; returns whether one was removed
    pub fn remove_event_listener(
        &mut self,
        id: NodeId,
        event_type: &str,
        listener: &EventListener,
        capture: bool,
    ) -> DomResult<bool> {
        let node = self.node_mut(id)?;
        let Some(pos) = node
            .listeners
            .iter()
            .position(|r| r.matches(event_type, listener, capture))
        else {
            return Ok(false);
        };
        node.listeners.remove(pos).removed.set(true);
        Ok(true)
    }

    /// Number of listeners registered on a node
    pub fn listener_count(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.listeners.len())
    }

    pub(crate) fn listeners_for(&self, id: NodeId, event_type: &str) -> Vec<RegisteredListener> {
        self.get(id).map_or_else(Vec::new, |n| {
            n.listeners
                .iter()
                .filter(|r| r.event_type == event_type)
                .cloned()
                .collect()
        })
    }

    pub(crate) fn drop_listener(&mut self, id: NodeId, registration: &RegisteredListener) {
        registration.removed.set(true);
        if let Some(node) = self.get_mut(id) {
            node.listeners
                .retain(|r| !std::rc::Rc::ptr_eq(&r.removed, &registration.removed));
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.some()
    }

    /// Focus an enabled element
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) || self.is_disabled(id) {
            return false;
        }
        self.active_element = id;
        true
    }

    /// Blur `id` if it holds focus
    pub fn blur(&mut self, id: NodeId) -> bool {
        if self.active_element != id {
            return false;
        }
        self.active_element = NodeId::NONE;
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Attribute reflected by an IDL property name
fn reflected_attribute(property: &str) -> Option<&'static str> {
    Some(match property {
        "id" => "id",
        "title" => "title",
        "lang" => "lang",
        "dir" => "dir",
        "tabIndex" => "tabindex",
        "htmlFor" => "for",
        "role" => "role",
        "type" => "type",
        "name" => "name",
        "value" => "value",
        "href" => "href",
        "src" => "src",
        "alt" => "alt",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::new();
        let html = doc.document_element().unwrap();
        assert_eq!(doc.parent(html), Some(doc.root()));
        assert_eq!(doc.element_children(html), vec![doc.head().unwrap(), doc.body().unwrap()]);
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn test_insert_before_and_move() {
        let mut doc = Document::empty();
        let ul = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        let c = doc.create_element("li");

        doc.append_child(ul, a).unwrap();
        doc.append_child(ul, c).unwrap();
        doc.insert_before(ul, b, Some(c)).unwrap();
        assert_eq!(doc.child_nodes(ul), vec![a, b, c]);

        doc.append_child(ul, a).unwrap();
        assert_eq!(doc.child_nodes(ul), vec![b, c, a]);
        assert_eq!(doc.first_child(ul), Some(b));
        assert_eq!(doc.last_child(ul), Some(a));
    }

    #[test]
    fn test_hierarchy_request() {
        let mut doc = Document::empty();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert!(matches!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
        assert!(matches!(
            doc.append_child(outer, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_fragment_insertion_moves_children() {
        let mut doc = Document::empty();
        let frag = doc.create_fragment();
        let target = doc.create_element("div");
        let a = doc.create_element("span");
        let b = doc.create_text("b");
        doc.append_child(frag, a).unwrap();
        doc.append_child(frag, b).unwrap();

        doc.append_child(target, frag).unwrap();
        assert_eq!(doc.child_nodes(target), vec![a, b]);
        assert!(doc.child_nodes(frag).is_empty());
        assert_eq!(doc.parent(frag), None);
    }

    #[test]
    fn test_remove_child_not_a_child() {
        let mut doc = Document::empty();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        assert_eq!(
            doc.remove_child(a, b),
            Err(DomError::NotAChild { parent: a, child: b })
        );
    }

    #[test]
    fn test_replace_with() {
        let mut doc = Document::empty();
        let parent = doc.create_element("div");
        let placeholder = doc.create_element("template");
        let real = doc.create_element("section");
        let loose = doc.create_element("p");
        doc.append_child(parent, placeholder).unwrap();

        assert_eq!(doc.replace_with(placeholder, real), Ok(true));
        assert_eq!(doc.child_nodes(parent), vec![real]);
        assert_eq!(doc.parent(placeholder), None);
        assert_eq!(doc.replace_with(loose, placeholder), Ok(false));
    }

    #[test]
    fn test_release_subtree() {
        let mut doc = Document::empty();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(NodeId::ROOT, div).unwrap();
        doc.append_child(div, span).unwrap();

        assert_eq!(doc.release(div), Ok(2));
        assert!(!doc.contains(div));
        assert!(!doc.contains(span));
        assert!(doc.child_nodes(NodeId::ROOT).is_empty());
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.release(NodeId::ROOT), Err(DomError::InvalidNodeType(NodeId::ROOT)));
    }

    #[test]
    fn test_released_slot_reused_under_new_generation() {
        let mut doc = Document::empty();
        let old = doc.create_element("div");
        doc.release(old).unwrap();
        let fresh = doc.create_element("div");

        assert_eq!(fresh.index, old.index);
        assert_eq!(fresh.generation, old.generation + 1);
        assert!(doc.get(old).is_none());
        assert!(doc.get(fresh).is_some());
    }

    #[test]
    fn test_spent_generation_retires_slot() {
        let mut doc = Document::empty();
        let id = doc.create_element("div");
        doc.nodes[id.index()].generation = u32::MAX;
        let id = NodeId::new(id.index, u32::MAX);
        doc.release(id).unwrap();

        let next = doc.create_element("div");
        assert_ne!(next.index, id.index);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_element_navigation_skips_text() {
        let mut doc = Document::empty();
        let div = doc.create_element("div");
        let t1 = doc.create_text("x");
        let a = doc.create_element("a");
        let t2 = doc.create_text("y");
        let b = doc.create_element("b");
        for n in [t1, a, t2, b] {
            doc.append_child(div, n).unwrap();
        }

        assert_eq!(doc.first_element_child(div), Some(a));
        assert_eq!(doc.last_element_child(div), Some(b));
        assert_eq!(doc.next_element_sibling(a), Some(b));
        assert_eq!(doc.previous_element_sibling(b), Some(a));
        assert_eq!(doc.previous_element_sibling(a), None);
        assert_eq!(doc.text_content(div), "xy");
    }

    #[test]
    fn test_property_reflection() {
        let mut doc = Document::empty();
        let button = doc.create_element("button");

        doc.set_property(button, "id", "go").unwrap();
        doc.set_property(button, "tabIndex", 2).unwrap();
        doc.set_property(button, "disabled", true).unwrap();
        doc.set_property(button, "custom", 1.5).unwrap();

        assert_eq!(doc.get_attribute(button, "id").as_deref(), Some("go"));
        assert_eq!(doc.get_attribute(button, "tabindex").as_deref(), Some("2"));
        assert!(doc.is_disabled(button));
        assert_eq!(doc.property(button, "tabIndex"), Some(PropertyValue::Number(2.0)));
        assert_eq!(doc.property(button, "custom"), Some(PropertyValue::Number(1.5)));
        assert_eq!(doc.property(button, "missing"), None);
    }

    #[test]
    fn test_text_content_property() {
        let mut doc = Document::empty();
        let p = doc.create_element("p");
        doc.set_property(p, "textContent", "hello").unwrap();
        assert_eq!(doc.text_content(p), "hello");
        doc.set_text_content(p, "").unwrap();
        assert!(doc.child_nodes(p).is_empty());
    }

    #[test]
    fn test_attributes_on_non_element() {
        let mut doc = Document::empty();
        let text = doc.create_text("t");
        assert_eq!(
            doc.set_attribute(text, "id", "x"),
            Err(DomError::InvalidNodeType(text))
        );
        assert!(!doc.has_attribute(text, "id"));
    }

    #[test]
    fn test_duplicate_listener_ignored() {
        let mut doc = Document::empty();
        let div = doc.create_element("div");
        let listener = EventListener::new(|_| {});

        assert_eq!(doc.add_event_listener(div, "click", listener.clone(), false), Ok(true));
        assert_eq!(doc.add_event_listener(div, "click", listener.clone(), false), Ok(false));
        assert_eq!(doc.add_event_listener(div, "click", listener.clone(), true), Ok(true));
        assert_eq!(doc.listener_count(div), 2);

        assert_eq!(doc.remove_event_listener(div, "click", &listener, false), Ok(true));
        assert_eq!(doc.remove_event_listener(div, "click", &listener, false), Ok(false));
        assert_eq!(doc.listener_count(div), 1);
    }

    #[test]
    fn test_focus_and_blur() {
        let mut doc = Document::empty();
        let input = doc.create_element("input");
        let other = doc.create_element("input");
        doc.set_disabled(other, true).unwrap();

        assert!(doc.focus(input));
        assert_eq!(doc.active_element(), Some(input));
        assert!(!doc.focus(other));
        assert!(!doc.blur(other));
        assert!(doc.blur(input));
        assert_eq!(doc.active_element(), None);
    }
}
