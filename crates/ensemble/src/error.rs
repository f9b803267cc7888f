//! Error types

use ensemble_dom::DomError;

use crate::Locale;

/// Result alias for ensemble operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ensemble error
///
/// Construction errors are fatal to the composition being built; nothing
/// half-built is handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Structural or meta tag requested (`html`, `script`, ...)
    #[error("Provided tag name \"{0}\" is not a valid name")]
    InvalidTagName(String),

    /// Reserved DOM accessor used as a property key
    #[error("Provided property name \"{0}\" is not a valid name")]
    InvalidPropertyName(String),

    /// `fill` was handed a node that fails provenance or content checks
    #[error("Object cannot be resolved into a valid node")]
    UntrustedNode,

    /// Construction protocol violated
    #[error("Bad invocation: {0}")]
    BadInvocation(&'static str),

    /// Slot key that was never described
    #[error("No slot named \"{0}\"")]
    UnknownSlot(String),

    /// Failure raised by the DOM itself
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl Error {
    /// Message text from a locale table
    pub fn localized(&self, locale: &Locale) -> String {
        match self {
            Self::InvalidTagName(tag) => with_name(&locale.invalid_tag, tag),
            Self::InvalidPropertyName(prop) => with_name(&locale.invalid_property, prop),
            Self::UntrustedNode => locale.untrusted_node.clone(),
            Self::BadInvocation(_) => locale.bad_invocation.clone(),
            Self::UnknownSlot(_) => locale.unknown_slot.clone(),
            Self::Dom(err) => err.to_string(),
        }
    }
}

/// Put `name` in the `{name}` slot of a message, or after it when the
/// message has none
fn with_name(message: &str, name: &str) -> String {
    if message.contains("{name}") {
        message.replace("{name}", name)
    } else {
        format!("{message}: {name}")
    }
}

#[cfg(test)]
mod tests {
    use ensemble_dom::NodeId;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::InvalidTagName("script".into()).to_string(),
            "Provided tag name \"script\" is not a valid name"
        );
        assert_eq!(
            Error::from(DomError::NotFound(NodeId::ROOT)).to_string(),
            "Node #0 not found"
        );
    }

    #[test]
    fn test_localized() {
        let err = Error::UntrustedNode;
        assert_eq!(err.localized(&Locale::markers()), "EMTAG");
        assert_eq!(err.localized(&Locale::en()), "Object cannot be resolved into a valid node.");
    }

    #[test]
    fn test_localized_keeps_name() {
        let tag = Error::InvalidTagName("script".into());
        assert_eq!(
            tag.localized(&Locale::en()),
            "Provided tag name \"script\" is not a valid name."
        );
        assert_eq!(tag.localized(&Locale::markers()), "ETAGN: script");

        let prop = Error::InvalidPropertyName("innerHTML".into());
        assert_eq!(
            prop.localized(&Locale::en()),
            "Provided property name \"innerHTML\" is not a valid name."
        );
        assert_eq!(prop.localized(&Locale::markers()), "EPROP: innerHTML");
    }
}
