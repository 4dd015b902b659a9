//! Error types for Horizon Menu core systems.

/// Result type alias for configuration store operations.
pub type Result<T> = std::result::Result<T, PropertyError>;

/// Errors returned by [`ConfigStore::try_set_property`](crate::ConfigStore::try_set_property).
///
/// The tolerant [`set_property`](crate::ConfigStore::set_property) entry point
/// collapses every variant into a `false` return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property was never registered.
    #[error("Property '{name}' not found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// The registered validator rejected the value.
    #[error("Invalid value for property '{name}'")]
    Invalid {
        /// The property being written.
        name: String,
    },

    /// A transition rule refused the write because of another property's state.
    #[error("Property '{name}' cannot change while '{guard}' is set")]
    Blocked {
        /// The property being written.
        name: String,
        /// The property whose value blocked the write.
        guard: String,
    },
}

impl PropertyError {
    /// Create a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a validation error.
    pub fn invalid(name: impl Into<String>) -> Self {
        Self::Invalid { name: name.into() }
    }

    /// Create a blocked-write error.
    pub fn blocked(name: impl Into<String>, guard: impl Into<String>) -> Self {
        Self::Blocked {
            name: name.into(),
            guard: guard.into(),
        }
    }
}
