//! Error types for the menu item engine.

use crate::surface::SurfaceError;

/// Result type alias for menu construction.
pub type Result<T> = std::result::Result<T, MenuError>;

/// Errors raised while building items and menus.
///
/// Once an item exists, state changes never fail; only construction does.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// The source node is not an `option`, `optgroup`, `li` (or `div` for menus).
    #[error("Unsupported source node <{tag}>")]
    UnsupportedSource {
        /// Tag name of the rejected node, or `#text`.
        tag: String,
    },

    /// A surface mutation failed.
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// The asset configuration could not be parsed.
    #[error("Invalid asset configuration: {0}")]
    Assets(#[from] toml::de::Error),

    /// A list-item source has neither an anchor nor a text child.
    #[error("List item has no text to build an item from")]
    MissingText,
}

impl MenuError {
    /// Create an unsupported-source error.
    pub fn unsupported(tag: impl Into<String>) -> Self {
        Self::UnsupportedSource { tag: tag.into() }
    }
}
