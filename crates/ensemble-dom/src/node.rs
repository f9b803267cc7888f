//! DOM Node
//!
//! Nodes link to their relatives through `NodeId`s into the document arena
//! instead of pointers, so a node never owns another node.

use std::collections::HashMap;

use crate::events::{EventListener, RegisteredListener};
use crate::{AttributeMap, ClassTokens, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
    /// Registered event listeners
    pub(crate) listeners: Vec<RegisteredListener>,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
            listeners: Vec::new(),
        }
    }

    /// Create a new element node
    pub fn element(tag_name: &str, namespace_uri: Option<&str>) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag_name, namespace_uri)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Create a document fragment node
    pub fn fragment() -> Self {
        Self::with_data(NodeData::Fragment)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Check if this is a document fragment
    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::Fragment)
    }

    /// Whether this node may hold children
    #[inline]
    pub fn is_container(&self) -> bool {
        !self.is_text()
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Document fragment (children move out on insertion)
    Fragment,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Local tag name, lowercased for HTML elements
    pub tag_name: String,
    /// Namespace URI for elements created with `create_element_ns`
    pub namespace_uri: Option<String>,
    /// Attributes other than `class`
    pub attrs: AttributeMap,
    /// Class tokens (backs the `class` attribute)
    pub class_list: ClassTokens,
    /// Expando properties with no attribute reflection
    pub properties: HashMap<String, PropertyValue>,
    /// `on<type>` event handler properties
    pub(crate) handlers: HashMap<String, EventListener>,
}

impl ElementData {
    pub fn new(tag_name: &str, namespace_uri: Option<&str>) -> Self {
        let tag_name = if namespace_uri.is_some() {
            tag_name.to_string()
        } else {
            tag_name.to_ascii_lowercase()
        };
        Self {
            tag_name,
            namespace_uri: namespace_uri.map(str::to_string),
            attrs: AttributeMap::new(),
            class_list: ClassTokens::new(),
            properties: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Local part of the tag name (drops any `prefix:`)
    pub fn local_name(&self) -> &str {
        self.tag_name
            .rsplit_once(':')
            .map_or(self.tag_name.as_str(), |(_, local)| local)
    }

    /// Get an attribute value; `class` is served from the class list
    pub fn get_attr(&self, name: &str) -> Option<String> {
        if name == "class" {
            return (!self.class_list.is_empty()).then(|| self.class_list.value());
        }
        self.attrs.get(name).map(str::to_string)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name == "class" {
            self.class_list.assign(value);
        } else {
            self.attrs.set(name, value);
        }
    }

    /// Remove an attribute, returns whether it was present
    pub fn remove_attr(&mut self, name: &str) -> bool {
        if name == "class" {
            let had = !self.class_list.is_empty();
            self.class_list.assign("");
            had
        } else {
            self.attrs.remove(name).is_some()
        }
    }

    /// Check for an attribute
    pub fn has_attr(&self, name: &str) -> bool {
        if name == "class" {
            !self.class_list.is_empty()
        } else {
            self.attrs.contains(name)
        }
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Scalar value assignable to an element property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl PropertyValue {
    /// String form, as the value would be reflected onto an attribute
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Truthiness of the value
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tag_lowercased() {
        let node = Node::element("DIV", None);
        assert_eq!(node.as_element().unwrap().tag_name, "div");
        assert!(node.is_element());
        assert!(node.is_container());
    }

    #[test]
    fn test_namespaced_tag_kept() {
        let data = ElementData::new("svg:linearGradient", Some("http://www.w3.org/2000/svg"));
        assert_eq!(data.tag_name, "svg:linearGradient");
        assert_eq!(data.local_name(), "linearGradient");
    }

    #[test]
    fn test_class_attribute_backed_by_token_list() {
        let mut data = ElementData::new("span", None);
        assert!(!data.has_attr("class"));
        data.set_attr("class", "a  b");
        assert_eq!(data.get_attr("class").as_deref(), Some("a b"));
        assert!(data.class_list.contains("b"));
        assert!(data.remove_attr("class"));
        assert_eq!(data.get_attr("class"), None);
    }

    #[test]
    fn test_property_value_text() {
        assert_eq!(PropertyValue::from(1).to_text(), "1");
        assert_eq!(PropertyValue::from(1.5).to_text(), "1.5");
        assert_eq!(PropertyValue::from(true).to_text(), "true");
        assert!(!PropertyValue::from("").is_truthy());
        assert!(PropertyValue::from(-1).is_truthy());
    }
}
