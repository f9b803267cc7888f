//! ensemble - thin wrappers around DOM primitives
//!
//! Gives ad-hoc UI components one constructor shape, a CSS naming
//! convention and a few lifecycle shorthands:
//!
//! - [`Composition`]: owns one element or fragment node
//! - [`Data`]: named slots that build their composition on first render
//! - [`Event`]: listener registration on a composition or a raw node
//!
//! Everything hangs off an [`Ensemble`], which holds the document, the
//! configuration and the node-to-composition lookup table.
//!
//! ```
//! use ensemble::{Config, Ensemble, Props};
//!
//! let ensemble = Ensemble::new(Config::with_namespace("ui"));
//! let button = ensemble.compo("button", "primary", Props::new()).unwrap();
//! assert_eq!(button.get_attr("class").as_deref(), Some("ui-primary"));
//! ```

mod compo;
mod config;
mod context;
mod data;
mod error;
mod event;
mod props;

pub use compo::{Composition, CompositionBuilder, CompositionKind, CreationOptions, ElementNs};
pub use config::{Config, Locale};
pub use context::Ensemble;
pub use data::{Data, Slot, SlotCallback, SlotParams};
pub use error::{Error, Result};
pub use event::{Event, EventTarget};
pub use props::{ChildSpec, Handler, Name, Prop, Props};

pub use ensemble_dom as dom;
pub use ensemble_dom::{DomEvent, EventListener, ListenerOptions, NodeId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
