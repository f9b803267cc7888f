//! Ensemble configuration and locale tables

use serde::{Deserialize, Serialize};

/// Construction-time options shared by every composition of an `Ensemble`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for generated CSS class names
    pub namespace: String,

    /// Tag used when a composition is created without one
    pub default_tag: String,

    /// Message table for errors and warnings
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "ensemble".to_string(),
            default_tag: "div".to_string(),
            locale: Locale::default(),
        }
    }
}

impl Config {
    /// Default configuration with another namespace
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}

/// Translated message table
///
/// Passed around as a value inside `Config` rather than looked up from a
/// global "current language".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub lang: String,
    pub bad_invocation: String,
    /// May hold a `{name}` slot for the rejected tag
    pub invalid_tag: String,
    /// May hold a `{name}` slot for the rejected key
    pub invalid_property: String,
    pub untrusted_node: String,
    pub unknown_slot: String,
    pub direct_node_access: String,
}

impl Locale {
    /// English table
    pub fn en() -> Self {
        Self {
            lang: "en".to_string(),
            bad_invocation: "Bad invocation. A namespace is required.".to_string(),
            invalid_tag: "Provided tag name \"{name}\" is not a valid name.".to_string(),
            invalid_property: "Provided property name \"{name}\" is not a valid name.".to_string(),
            untrusted_node: "Object cannot be resolved into a valid node.".to_string(),
            unknown_slot: "Provided slot is not described.".to_string(),
            direct_node_access: "Direct access to the node is discouraged.".to_string(),
        }
    }

    /// Marker table: every message is its own key, for translation tooling
    pub fn markers() -> Self {
        Self {
            lang: String::new(),
            bad_invocation: "EBADH".to_string(),
            invalid_tag: "ETAGN".to_string(),
            invalid_property: "EPROP".to_string(),
            untrusted_node: "EMTAG".to_string(),
            unknown_slot: "ESLOT".to_string(),
            direct_node_access: "DOM".to_string(),
        }
    }

    /// Built-in table for `lang`, falling back to English
    pub fn for_lang(lang: &str) -> Self {
        match lang.split(['-', '_']).next().unwrap_or_default() {
            "en" => Self::en(),
            other => {
                tracing::debug!("No built-in locale for '{}', using en", other);
                Self::en()
            }
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en()
    }
}
