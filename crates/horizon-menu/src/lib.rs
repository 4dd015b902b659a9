//! Reactive menu items.
//!
//! This crate keeps a menu item's configuration and its visual representation
//! in sync. The pieces:
//!
//! - **Items** ([`MenuItem`]): validated properties (`text`, `url`,
//!   `checked`, `disabled`, `selected`, `submenu`, ...) whose handlers update
//!   the item's nodes, with disable-clears-selection and emphasis exclusion
//!   enforced before any handler runs
//! - **Containers** ([`Menu`], [`MenuContainer`]): sparse groups of items,
//!   built directly, from item data, or from markup
//! - **Surface** ([`Surface`], [`MemorySurface`]): the node tree items render
//!   into
//! - **Navigation**: [`MenuItem::next_enabled_sibling`] and
//!   [`MenuItem::previous_enabled_sibling`] walk a menu circularly, skipping
//!   disabled and hidden items
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_menu::prelude::*;
//!
//! let surface = Arc::new(MemorySurface::new());
//! let ctx = ItemContext::new(surface.clone());
//!
//! let menu = Menu::new(ctx.clone(), "edit");
//! for label in ["Undo", "Redo", "Cut"] {
//!     menu.add_item(MenuItem::new(ctx.clone(), label, ItemConfig::new()).unwrap());
//! }
//!
//! let redo = menu.item_at(0, 1).unwrap();
//! redo.set_property("disabled", true);
//!
//! let undo = menu.item_at(0, 0).unwrap();
//! assert_eq!(undo.next_enabled_sibling().unwrap().text(), "Cut");
//! ```

pub mod assets;
mod error;
pub mod item;
pub mod menu;
pub mod prelude;
pub mod source;
pub mod surface;
pub mod value;

pub use assets::{AltTexts, IconSet, IconVariant, ItemAssets};
pub use error::{MenuError, Result};
pub use item::{ItemConfig, ItemContext, ItemEvents, ItemPosition, MenuItem};
pub use menu::{DefaultMenuFactory, Menu, MenuContainer, MenuFactory, MenuSource, SubmenuConfig};
pub use source::{AttributeBag, ItemSource, NormalizedSource, SourceKind};
pub use surface::{MemorySurface, NodeId, Surface, SurfaceError, SurfaceResult};
pub use value::{ItemData, ItemValue, MenuDescriptor};
