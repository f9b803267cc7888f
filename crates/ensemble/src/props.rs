//! Composition names and property bags

use std::rc::Rc;

use ensemble_dom::{DomEvent, PropertyValue};

use crate::{Composition, Error, Result};

/// DOM accessors that must not be set through a property bag
const DENIED_PROPS: &[&str] = &[
    "attributes",
    "classList",
    "innerHTML",
    "outerHTML",
    "nodeName",
    "nodeType",
];

/// Event handler bound to its composition
pub type Handler = Rc<dyn Fn(&Composition, &mut DomEvent)>;

/// Composition name, used to build CSS class names
///
/// `Flag` values are sentinels: the name slot is occupied but no class
/// naming is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Name {
    #[default]
    None,
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl Name {
    /// `{namespace}-{name}` for each name, space separated
    ///
    /// `None` when naming does not apply: no name, a sentinel, or empty.
    pub fn class_name(&self, namespace: &str) -> Option<String> {
        match self {
            Self::None | Self::Flag(_) => None,
            Self::One(name) if name.is_empty() => None,
            Self::One(name) => Some(format!("{namespace}-{name}")),
            Self::Many(names) if names.is_empty() => None,
            Self::Many(names) => Some(
                names
                    .iter()
                    .map(|name| format!("{namespace}-{name}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<bool> for Name {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for Name {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for Name {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Name {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Option<&str>> for Name {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::None, Self::from)
    }
}

/// Single property bag entry
#[derive(Clone)]
pub enum Prop {
    /// Scalar assigned as a DOM property
    Value(PropertyValue),
    /// `on<type>` handler
    Handler(Handler),
    /// Nested compositions built and appended at construction
    Children(Vec<ChildSpec>),
}

impl std::fmt::Debug for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Children(c) => f.debug_tuple("Children").field(c).finish(),
        }
    }
}

/// Ordered property bag applied at construction
///
/// Setting a key twice replaces the earlier value in place.
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: Vec<(String, Prop)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: String, prop: Prop) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = prop,
            None => self.entries.push((key, prop)),
        }
    }

    /// Set a scalar property, e.g. `set("tabIndex", 1)`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key.into(), Prop::Value(value.into()));
        self
    }

    /// Bind an event handler; stored under `on<event>`
    pub fn on(
        mut self,
        event: &str,
        handler: impl Fn(&Composition, &mut DomEvent) + 'static,
    ) -> Self {
        self.insert(format!("on{event}"), Prop::Handler(Rc::new(handler)));
        self
    }

    /// Bind an already shared handler
    pub fn on_shared(mut self, event: &str, handler: Handler) -> Self {
        self.insert(format!("on{event}"), Prop::Handler(handler));
        self
    }

    /// Declare nested compositions
    pub fn children(mut self, children: Vec<ChildSpec>) -> Self {
        self.insert("children".to_string(), Prop::Children(children));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject reserved keys, including those of nested children
    pub(crate) fn validate(&self) -> Result<()> {
        for (key, prop) in &self.entries {
            if DENIED_PROPS.contains(&key.as_str()) {
                return Err(Error::InvalidPropertyName(key.clone()));
            }
            if let Prop::Children(children) = prop {
                for child in children {
                    child.props.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Declared child: `(tag, name, props)`
#[derive(Debug, Clone, Default)]
pub struct ChildSpec {
    pub tag: Option<String>,
    pub name: Name,
    pub props: Props,
}

impl ChildSpec {
    pub fn new(tag: &str, name: impl Into<Name>, props: Props) -> Self {
        Self {
            tag: Some(tag.to_string()),
            name: name.into(),
            props,
        }
    }
}
