//! Composition wrapper
//!
//! A `Composition` owns exactly one DOM node, an element or a document
//! fragment, and mediates access to it. Child compositions adopted through
//! `append`, `prepend`, `install` or a `children` prop are owned by their
//! parent composition, so a tree of compositions stays alive as long as its
//! root does. Dropping the last handle to a detached composition releases
//! its node subtree from the document.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ensemble_dom::{ClassList, Document, EventListener, NodeId};

use crate::props::{ChildSpec, Prop};
use crate::{Ensemble, Error, Name, Props, Result};

/// Structural and meta tags a composition may not manage
const REJECTED_TAGS: &[&str] = &["html", "head", "body", "meta", "link", "style", "script"];

/// Exact, case-insensitive match against the rejected tags
pub(crate) fn is_rejected_tag(tag: &str) -> bool {
    let local = tag.rsplit(':').next().unwrap_or(tag);
    REJECTED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(local))
}

/// Parse a CSS time (`0.3s`, `150ms`) into milliseconds
///
/// Only the first value of a list is read; anything unparsable is 0.
pub(crate) fn parse_time(value: &str) -> u64 {
    let value = value.split(',').next().unwrap_or_default().trim();
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1e3)
    } else {
        (value, 1.0)
    };
    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => (n * scale).round() as u64,
        _ => 0,
    }
}

/// What kind of node a composition owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    Element,
    /// Document fragment; inserting it moves its children out
    Fragment,
}

/// Options passed to element creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationOptions {
    /// Customized built-in name, set as the `is` attribute
    pub is: Option<String>,
    /// Initial class string, kept after the generated class names
    pub class: Option<String>,
}

impl CreationOptions {
    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }
}

/// Namespaced element creation, e.g. SVG content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNs {
    pub namespace_uri: String,
    pub qualified_name: String,
}

impl ElementNs {
    pub fn new(namespace_uri: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            qualified_name: qualified_name.into(),
        }
    }

    pub fn svg(qualified_name: impl Into<String>) -> Self {
        Self::new("http://www.w3.org/2000/svg", qualified_name)
    }
}

pub(crate) struct CompoInner {
    ensemble: Ensemble,
    node: NodeId,
    namespace: String,
    tag: String,
    name: Name,
    kind: CompositionKind,
    /// Composition that adopted this one; `Some` with a dead reference
    /// while the owner is being dropped
    owner: RefCell<Option<Weak<CompoInner>>>,
    owned: RefCell<Vec<Composition>>,
}

impl Drop for CompoInner {
    fn drop(&mut self) {
        self.ensemble.unregister(self.node);
        let Some(mut doc) = self.ensemble.dom().try_borrow_mut() else {
            tracing::debug!("Document busy, leaving {} in place", self.node);
            return;
        };
        if !doc.contains(self.node) || doc.parent(self.node).is_some() {
            return;
        }

        // Descendants still referenced from outside this subtree survive,
        // detached, with their own subtree.
        let mut survivors: Vec<NodeId> = Vec::new();
        for id in doc.descendants(self.node) {
            if survivors.iter().any(|&s| doc.is_inclusive_ancestor(s, id)) {
                continue;
            }
            if let Some(inner) = self.ensemble.resolve(id) {
                let owned_refs = usize::from(inner.owner.borrow().is_some());
                if Rc::strong_count(&inner) > 1 + owned_refs {
                    survivors.push(id);
                }
            }
        }
        for &id in &survivors {
            if let Some(parent) = doc.parent(id) {
                doc.remove_child(parent, id).ok();
            }
        }

        match doc.release(self.node) {
            Ok(count) => tracing::trace!(
                "Released {} nodes of '{}' ({} kept)",
                count,
                self.tag,
                survivors.len()
            ),
            Err(err) => tracing::debug!("Could not release {}: {}", self.node, err),
        }
    }
}

/// Wrapper owning one DOM node
///
/// Cloning yields another handle to the same composition; equality is
/// identity.
#[derive(Clone)]
pub struct Composition {
    pub(crate) inner: Rc<CompoInner>,
}

impl Composition {
    /// Start building an element composition
    pub fn builder<'a>(ensemble: &'a Ensemble, namespace: &str) -> CompositionBuilder<'a> {
        CompositionBuilder::new(ensemble, namespace)
    }

    /// Empty document fragment composition
    pub fn fragment(ensemble: &Ensemble, namespace: &str) -> Result<Self> {
        if namespace.is_empty() {
            return Err(Error::BadInvocation("a namespace is required"));
        }
        let node = ensemble.dom().borrow_mut().create_fragment();
        let compo = Self::wrap(
            ensemble,
            node,
            namespace,
            "#document-fragment",
            Name::None,
            CompositionKind::Fragment,
        );
        tracing::debug!("Created {} fragment as {}", namespace, node);
        Ok(compo)
    }

    fn wrap(
        ensemble: &Ensemble,
        node: NodeId,
        namespace: &str,
        tag: &str,
        name: Name,
        kind: CompositionKind,
    ) -> Self {
        let inner = Rc::new(CompoInner {
            ensemble: ensemble.clone(),
            node,
            namespace: namespace.to_string(),
            tag: tag.to_string(),
            name,
            kind,
            owner: RefCell::new(None),
            owned: RefCell::new(Vec::new()),
        });
        ensemble.register(node, &inner);
        Self { inner }
    }

    /// Type check for values of unknown type
    pub fn is_composition(obj: &dyn Any) -> bool {
        obj.is::<Composition>()
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.inner.ensemble
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn name(&self) -> &Name {
        &self.inner.name
    }

    pub fn kind(&self) -> CompositionKind {
        self.inner.kind
    }

    pub fn is_fragment(&self) -> bool {
        self.inner.kind == CompositionKind::Fragment
    }

    /// The owned node
    ///
    /// Going around the wrapper is discouraged and logged.
    pub fn node(&self) -> NodeId {
        tracing::warn!(
            "{} ({})",
            self.ensemble().config().locale.direct_node_access,
            self.inner.node
        );
        self.inner.node
    }

    pub(crate) fn id(&self) -> NodeId {
        self.inner.node
    }

    /// Number of child compositions this one keeps alive
    pub fn owned_len(&self) -> usize {
        self.inner.owned.borrow().len()
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Take ownership of `child`; a fragment hands over its own children
    fn adopt(&self, child: &Composition) {
        if child.is_fragment() {
            let moved = std::mem::take(&mut *child.inner.owned.borrow_mut());
            for grandchild in &moved {
                *grandchild.inner.owner.borrow_mut() = None;
                self.adopt(grandchild);
            }
            return;
        }
        child.leave_owner();
        *child.inner.owner.borrow_mut() = Some(Rc::downgrade(&self.inner));
        self.inner.owned.borrow_mut().push(child.clone());
    }

    /// Drop the owner's reference to this composition
    fn leave_owner(&self) {
        let owner = self.inner.owner.borrow_mut().take();
        if let Some(owner) = owner.and_then(|w| w.upgrade()) {
            let released: Vec<Composition> = {
                let mut owned = owner.owned.borrow_mut();
                let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *owned)
                    .into_iter()
                    .partition(|c| c == self);
                *owned = kept;
                gone
            };
            drop(released);
        }
    }

    /// Hand ownership to whatever composition now wraps the parent node
    fn adopt_into_parent(&self, parent: NodeId) {
        match self.ensemble().resolve(parent) {
            Some(inner) => Composition { inner }.adopt(self),
            None if self.is_fragment() => {}
            None => self.leave_owner(),
        }
    }

    fn compatible(&self, other: &Composition) -> bool {
        let ok = self.namespace() == other.namespace() && self.ensemble().same(other.ensemble());
        if !ok {
            tracing::trace!(
                "Namespace mismatch: '{}' vs '{}'",
                self.namespace(),
                other.namespace()
            );
        }
        ok
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Append to `root`
    pub fn install(&self, root: NodeId) -> Result<bool> {
        self.ensemble()
            .dom()
            .borrow_mut()
            .append_child(root, self.id())?;
        self.adopt_into_parent(root);
        tracing::trace!("Installed '{}' into {}", self.tag(), root);
        Ok(true)
    }

    /// Run `f` with this composition, then install it
    pub fn install_with(&self, root: NodeId, f: impl FnOnce(&Composition)) -> Result<bool> {
        f(self);
        self.install(root)
    }

    /// Remove from `root`
    pub fn uninstall(&self, root: NodeId) -> Result<bool> {
        self.ensemble()
            .dom()
            .borrow_mut()
            .remove_child(root, self.id())?;
        self.leave_owner();
        tracing::trace!("Uninstalled '{}' from {}", self.tag(), root);
        Ok(true)
    }

    /// Run `f` with this composition, then uninstall it
    pub fn uninstall_with(&self, root: NodeId, f: impl FnOnce(&Composition)) -> Result<bool> {
        f(self);
        self.uninstall(root)
    }

    /// Take the place of `placeholder`
    ///
    /// Returns `false` when the placeholder is detached. A composition
    /// wrapping the placeholder loses its owner.
    pub fn up(&self, placeholder: NodeId) -> Result<bool> {
        let parent = {
            let mut doc = self.ensemble().dom().borrow_mut();
            let parent = doc.parent(placeholder);
            if !doc.replace_with(placeholder, self.id())? {
                return Ok(false);
            }
            parent
        };
        if let Some(old) = self.ensemble().compo_for(placeholder) {
            old.leave_owner();
        }
        if let Some(parent) = parent {
            self.adopt_into_parent(parent);
        }
        tracing::trace!("'{}' took the place of {}", self.tag(), placeholder);
        Ok(true)
    }

    /// Run `f` with this composition, then take the place of `placeholder`
    pub fn up_with(&self, placeholder: NodeId, f: impl FnOnce(&Composition)) -> Result<bool> {
        f(self);
        self.up(placeholder)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append `compo` as the last child
    ///
    /// `Ok(false)` when the namespaces differ.
    pub fn append(&self, compo: &Composition) -> Result<bool> {
        if !self.compatible(compo) {
            return Ok(false);
        }
        self.ensemble()
            .dom()
            .borrow_mut()
            .append_child(self.id(), compo.id())?;
        self.adopt(compo);
        Ok(true)
    }

    /// Insert `compo` as the first child
    pub fn prepend(&self, compo: &Composition) -> Result<bool> {
        if !self.compatible(compo) {
            return Ok(false);
        }
        {
            let mut doc = self.ensemble().dom().borrow_mut();
            let first = doc.first_child(self.id());
            doc.insert_before(self.id(), compo.id(), first)?;
        }
        self.adopt(compo);
        Ok(true)
    }

    /// Detach the child `compo`
    ///
    /// Once the caller drops its last handle, the child's node is released.
    pub fn remove(&self, compo: &Composition) -> Result<bool> {
        if !self.compatible(compo) {
            return Ok(false);
        }
        self.ensemble()
            .dom()
            .borrow_mut()
            .remove_child(self.id(), compo.id())?;
        compo.leave_owner();
        Ok(true)
    }

    /// Replace all element children with `node`
    ///
    /// `node` must be a live element of this document that is not a
    /// rejected tag, holds no rejected descendant, and does not contain this
    /// composition. Nothing changes when validation fails.
    pub fn fill(&self, node: NodeId) -> Result<bool> {
        {
            let doc = self.ensemble().dom().borrow();
            let trusted = doc.is_element(node)
                && !doc.is_inclusive_ancestor(node, self.id())
                && std::iter::once(node)
                    .chain(doc.descendants(node))
                    .filter_map(|id| doc.tag_name(id))
                    .all(|tag| !is_rejected_tag(tag));
            if !trusted {
                tracing::debug!("Refused to fill '{}' with {}", self.tag(), node);
                return Err(Error::UntrustedNode);
            }
        }

        // `node` may sit inside the children about to be emptied; hold its
        // composition and lift it out first so it outlives them.
        let keep = self.ensemble().compo_for(node);
        {
            let mut doc = self.ensemble().dom().borrow_mut();
            if let Some(parent) = doc.parent(node) {
                doc.remove_child(parent, node)?;
            }
        }
        self.empty()?;
        self.ensemble()
            .dom()
            .borrow_mut()
            .append_child(self.id(), node)?;
        if let Some(child) = keep {
            self.adopt(&child);
        }
        Ok(true)
    }

    /// Remove every element child
    ///
    /// Wrapped children go through `remove`; ones from another namespace are
    /// removed directly. Unwrapped children are released unless a live
    /// composition sits somewhere in their subtree.
    pub fn empty(&self) -> Result<()> {
        loop {
            let Some(first) = self.ensemble().dom().borrow().first_element_child(self.id()) else {
                break;
            };
            let child = self.ensemble().compo_for(first);
            if let Some(child) = &child {
                if self.remove(child)? {
                    continue;
                }
            }
            self.ensemble()
                .dom()
                .borrow_mut()
                .remove_child(self.id(), first)?;
            match child {
                Some(child) => child.leave_owner(),
                None => self.release_unwrapped(first)?,
            }
        }
        Ok(())
    }

    fn release_unwrapped(&self, node: NodeId) -> Result<()> {
        let mut doc = self.ensemble().dom().borrow_mut();
        let wrapped = doc
            .descendants(node)
            .into_iter()
            .any(|id| self.ensemble().resolve(id).is_some());
        if !wrapped {
            doc.release(node)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes and style
    // ------------------------------------------------------------------

    pub fn has_attr(&self, attr: &str) -> bool {
        self.ensemble().dom().borrow().has_attribute(self.id(), attr)
    }

    pub fn get_attr(&self, attr: &str) -> Option<String> {
        self.ensemble().dom().borrow().get_attribute(self.id(), attr)
    }

    pub fn set_attr(&self, attr: &str, value: &str) -> Result<()> {
        self.ensemble()
            .dom()
            .borrow_mut()
            .set_attribute(self.id(), attr, value)?;
        Ok(())
    }

    /// Remove an attribute, returns whether it was present
    pub fn del_attr(&self, attr: &str) -> Result<bool> {
        Ok(self
            .ensemble()
            .dom()
            .borrow_mut()
            .remove_attribute(self.id(), attr)?)
    }

    /// Computed (not inline) value of a style property
    pub fn get_style(&self, prop: &str) -> String {
        self.ensemble()
            .dom()
            .borrow()
            .computed_style(self.id())
            .get(prop)
            .to_string()
    }

    /// Computed time of a style property in milliseconds
    ///
    /// Defaults to `transition-duration`.
    pub fn timing(&self, prop: Option<&str>) -> u64 {
        self.ensemble().timing(self.id(), prop)
    }

    pub fn show(&self) -> Result<()> {
        self.ensemble().dom().borrow_mut().set_hidden(self.id(), false)?;
        Ok(())
    }

    pub fn hide(&self) -> Result<()> {
        self.ensemble().dom().borrow_mut().set_hidden(self.id(), true)?;
        Ok(())
    }

    pub fn is_hidden(&self) -> bool {
        self.ensemble().dom().borrow().is_hidden(self.id())
    }

    pub fn enable(&self) -> Result<()> {
        self.ensemble().dom().borrow_mut().set_disabled(self.id(), false)?;
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        self.ensemble().dom().borrow_mut().set_disabled(self.id(), true)?;
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.ensemble().dom().borrow().is_disabled(self.id())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn lookup(&self, f: impl FnOnce(&Document, NodeId) -> Option<NodeId>) -> Option<Self> {
        let id = {
            let doc = self.ensemble().dom().borrow();
            f(&doc, self.id())?
        };
        self.ensemble().compo_for(id)
    }

    /// Composition wrapping the parent element
    pub fn parent(&self) -> Option<Self> {
        self.lookup(|doc, id| doc.parent_element(id))
    }

    pub fn first(&self) -> Option<Self> {
        self.lookup(|doc, id| doc.first_element_child(id))
    }

    pub fn last(&self) -> Option<Self> {
        self.lookup(|doc, id| doc.last_element_child(id))
    }

    pub fn previous(&self) -> Option<Self> {
        self.lookup(|doc, id| doc.previous_element_sibling(id))
    }

    pub fn next(&self) -> Option<Self> {
        self.lookup(|doc, id| doc.next_element_sibling(id))
    }

    /// Wrapped element children in tree order; unwrapped ones are skipped
    pub fn children(&self) -> Vec<Self> {
        let ids = self.ensemble().dom().borrow().element_children(self.id());
        ids.into_iter()
            .filter_map(|id| self.ensemble().compo_for(id))
            .collect()
    }

    /// Live class list
    pub fn class_list(&self) -> ClassList {
        self.ensemble().dom().class_list(self.id())
    }
}

impl PartialEq for Composition {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Composition {}

impl std::fmt::Debug for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composition")
            .field("namespace", &self.inner.namespace)
            .field("tag", &self.inner.tag)
            .field("name", &self.inner.name)
            .field("node", &self.inner.node)
            .finish()
    }
}

/// Validated construction of an element composition
pub struct CompositionBuilder<'a> {
    ensemble: &'a Ensemble,
    namespace: String,
    tag: Option<String>,
    name: Name,
    props: Props,
    options: CreationOptions,
    element_ns: Option<ElementNs>,
}

impl<'a> CompositionBuilder<'a> {
    pub fn new(ensemble: &'a Ensemble, namespace: &str) -> Self {
        Self {
            ensemble,
            namespace: namespace.to_string(),
            tag: None,
            name: Name::None,
            props: Props::new(),
            options: CreationOptions::default(),
            element_ns: None,
        }
    }

    /// Element kind; empty means the configured default
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn name(mut self, name: impl Into<Name>) -> Self {
        self.name = name.into();
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn options(mut self, options: CreationOptions) -> Self {
        self.options = options;
        self
    }

    /// Create the element in a namespace; its qualified name is the tag
    pub fn element_ns(mut self, element_ns: ElementNs) -> Self {
        self.element_ns = Some(element_ns);
        self
    }

    pub fn build(self) -> Result<Composition> {
        if self.namespace.is_empty() {
            return Err(Error::BadInvocation("a namespace is required"));
        }
        let tag = match (&self.element_ns, self.tag.as_deref()) {
            (Some(ns), _) => ns.qualified_name.clone(),
            (None, Some(tag)) if !tag.is_empty() => tag.to_string(),
            _ => self.ensemble.config().default_tag.clone(),
        };
        if is_rejected_tag(&tag) {
            return Err(Error::InvalidTagName(tag));
        }
        self.props.validate()?;

        let node = {
            let mut doc = self.ensemble.dom().borrow_mut();
            let node = match &self.element_ns {
                Some(ns) => doc.create_element_ns(&ns.namespace_uri, &ns.qualified_name),
                None => doc.create_element(&tag),
            };
            if let Some(is) = &self.options.is {
                doc.set_attribute(node, "is", is)?;
            }
            if let Some(class) = &self.options.class {
                doc.set_class_name(node, class)?;
            }
            node
        };

        let compo = Composition::wrap(
            self.ensemble,
            node,
            &self.namespace,
            &tag,
            self.name.clone(),
            CompositionKind::Element,
        );
        apply_props(&compo, &self.props)?;

        if let Some(class) = self.name.class_name(&self.namespace) {
            let mut doc = self.ensemble.dom().borrow_mut();
            let existing = doc.class_name(node);
            let value = if existing.is_empty() {
                class
            } else {
                format!("{class} {existing}")
            };
            doc.set_class_name(node, &value)?;
        }

        tracing::debug!("Created {} composition <{}> as {}", self.namespace, tag, node);
        Ok(compo)
    }
}

/// Apply a validated property bag in order
fn apply_props(compo: &Composition, props: &Props) -> Result<()> {
    for (key, prop) in props.iter() {
        match prop {
            Prop::Handler(handler) => {
                let event_type = key.strip_prefix("on").unwrap_or(key);
                let weak = Rc::downgrade(&compo.inner);
                let handler = handler.clone();
                let listener = EventListener::new(move |event| {
                    if let Some(inner) = weak.upgrade() {
                        handler(&Composition { inner }, event);
                    }
                });
                compo
                    .ensemble()
                    .dom()
                    .borrow_mut()
                    .set_event_handler(compo.id(), event_type, Some(listener))?;
            }
            Prop::Value(value) => {
                if matches!(key, "textContent" | "innerText") {
                    compo.empty()?;
                }
                compo
                    .ensemble()
                    .dom()
                    .borrow_mut()
                    .set_property(compo.id(), key, value.clone())?;
            }
            Prop::Children(children) => {
                for ChildSpec { tag, name, props } in children {
                    let child = Composition::builder(compo.ensemble(), compo.namespace())
                        .tag(tag.as_deref().unwrap_or_default())
                        .name(name.clone())
                        .props(props.clone())
                        .build()?;
                    compo.append(&child)?;
                }
            }
        }
    }
    Ok(())
}
