//! Computed style
//!
//! Cascade order: inherited values, UA defaults, author rules in source
//! order, then the inline `style` attribute. No specificity; later
//! declarations win.

use std::collections::HashMap;

use crate::{Document, NodeId};

/// Properties whose computed value is taken from the parent when unset
const INHERITED: &[&str] = &["color", "cursor", "font-family", "font-size", "visibility"];

/// Initial values for properties with no UA or author declaration
const INITIAL: &[(&str, &str)] = &[
    ("visibility", "visible"),
    ("opacity", "1"),
    ("transition-duration", "0s"),
    ("transition-delay", "0s"),
    ("animation-duration", "0s"),
    ("animation-delay", "0s"),
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main",
    "nav", "ol", "p", "pre", "section", "ul",
];

const HIDDEN_TAGS: &[&str] = &["head", "link", "meta", "script", "style", "template", "title"];

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Universal,
}

impl SimpleSelector {
    /// Parse a simple selector string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.contains(char::is_whitespace) {
            return None;
        }

        if s == "*" {
            Some(Self::Universal)
        } else if let Some(id) = s.strip_prefix('#') {
            (!id.is_empty()).then(|| Self::Id(id.to_string()))
        } else if let Some(class) = s.strip_prefix('.') {
            (!class.is_empty()).then(|| Self::Class(class.to_string()))
        } else {
            Some(Self::Tag(s.to_ascii_lowercase()))
        }
    }

    /// Check if an element matches this selector
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        match self {
            Self::Universal => true,
            Self::Tag(tag) => element.local_name().eq_ignore_ascii_case(tag),
            Self::Id(want) => element.attrs.get("id") == Some(want.as_str()),
            Self::Class(class) => element.class_list.contains(class),
        }
    }
}

/// Author style rule
#[derive(Debug, Clone)]
pub(crate) struct StyleRule {
    pub selector: SimpleSelector,
    pub declarations: Vec<(String, String)>,
}

/// Resolved style of an element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    values: HashMap<String, String>,
}

impl ComputedStyle {
    /// Computed value of a property, empty when unknown
    ///
    /// Accepts camelCase (`transitionDuration`) or kebab-case names.
    pub fn get(&self, property: &str) -> &str {
        self.values
            .get(&to_kebab_case(property))
            .map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `transitionDuration` -> `transition-duration`; kebab-case passes through
pub fn to_kebab_case(property: &str) -> String {
    let property = property.trim();
    if let Some(rest) = property.strip_prefix("--") {
        return format!("--{rest}");
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse `a: b; c: d` into ordered declarations
pub(crate) fn parse_declarations(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty() && !value.is_empty())
                .then(|| (to_kebab_case(name), value.to_string()))
        })
        .collect()
}

impl Document {
    /// Add an author rule, e.g. `add_rule(".ui-panel", "transition-duration: .3s")`
    ///
    /// Returns `false` when the selector is not a simple selector.
    pub fn add_rule(&mut self, selector: &str, declarations: &str) -> bool {
        let Some(selector) = SimpleSelector::parse(selector) else {
            return false;
        };
        self.rules.push(StyleRule {
            selector,
            declarations: parse_declarations(declarations),
        });
        true
    }

    /// Resolve the computed style of an element
    pub fn computed_style(&self, id: NodeId) -> ComputedStyle {
        let Some(element) = self.get(id).and_then(|n| n.as_element()) else {
            return ComputedStyle::default();
        };

        let mut values: HashMap<String, String> = INITIAL
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if let Some(parent) = self.parent_element(id) {
            let inherited = self.computed_style(parent);
            for property in INHERITED {
                let value = inherited.get(property);
                if !value.is_empty() {
                    values.insert(property.to_string(), value.to_string());
                }
            }
        }

        let tag = element.local_name();
        let display = if element.has_attr("hidden") || HIDDEN_TAGS.contains(&tag) {
            "none"
        } else if BLOCK_TAGS.contains(&tag) {
            "block"
        } else if tag == "li" {
            "list-item"
        } else {
            "inline"
        };
        values.insert("display".into(), display.into());

        for rule in self.rules.iter().filter(|r| r.selector.matches(self, id)) {
            for (name, value) in &rule.declarations {
                values.insert(name.clone(), value.clone());
            }
        }

        if let Some(inline) = element.attrs.get("style") {
            values.extend(parse_declarations(inline));
        }

        ComputedStyle { values }
    }

    /// First element in `root`'s subtree matching a simple selector
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let selector = SimpleSelector::parse(selector)?;
        self.descendants(root)
            .into_iter()
            .find(|&id| selector.matches(self, id))
    }

    /// All elements in `root`'s subtree matching a simple selector
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = SimpleSelector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }
}
