//! Prelude module for Horizon Menu.
//!
//! Re-exports the types most callers need:
//!
//! ```
//! use horizon_menu::prelude::*;
//! ```

// ============================================================================
// Items and Containers
// ============================================================================

pub use crate::item::{ItemConfig, ItemContext, MenuItem};
pub use crate::menu::{Menu, MenuContainer};

// ============================================================================
// Values
// ============================================================================

pub use crate::value::{ItemData, ItemValue, MenuDescriptor};

// ============================================================================
// Surface
// ============================================================================

pub use crate::surface::{MemorySurface, Surface};
