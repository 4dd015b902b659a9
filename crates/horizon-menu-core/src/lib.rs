//! Core systems for Horizon Menu.
//!
//! This crate provides the generic building blocks the menu item engine is
//! made of. None of them know anything about menus:
//!
//! - **Signals**: Named, synchronous notification sources ([`Signal`])
//! - **Configuration store**: Validated, observable properties with change
//!   handlers, deferred delivery and a transition table ([`ConfigStore`])
//! - **Logging**: `tracing` target and span names ([`logging`])
//!
//! # Example
//!
//! ```
//! use horizon_menu_core::{ConfigStore, PropertySpec};
//!
//! struct Label;
//!
//! let config = ConfigStore::<Label, String>::new();
//! config.add_property(
//!     "text",
//!     PropertySpec::new(String::new()).handler(|_label: &Label, event| {
//!         println!("text is now {:?}", event.value);
//!     }),
//! );
//!
//! config.set_property(&Label, "text", "Open".to_string(), false);
//! assert_eq!(config.get_property("text").as_deref(), Some("Open"));
//! ```

pub mod config;
mod error;
pub mod logging;
pub mod signal;

pub use config::{ConfigStore, PropertyEvent, PropertySpec, Transition, Validator};
pub use error::{PropertyError, Result};
pub use signal::{ConnectionId, Signal, SignalEmitter};
