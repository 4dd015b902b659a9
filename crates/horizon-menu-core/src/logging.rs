//! Logging facilities for Horizon Menu.
//!
//! Horizon Menu uses the `tracing` crate for instrumentation. Nothing in the
//! library installs a subscriber; install one in your application to see logs:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_menu=debug,horizon_menu_core::config=trace")
//!     .init();
//! ```

/// Span names used throughout Horizon Menu for tracing.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_menu::signal";
    /// Deferred queue flush span.
    pub const FIRE_QUEUE: &str = "horizon_menu::fire_queue";
    /// Item construction span.
    pub const ITEM_INIT: &str = "horizon_menu::item_init";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_menu_core";
    /// Configuration store target.
    pub const CONFIG: &str = "horizon_menu_core::config";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_menu_core::signal";
    /// Menu item target.
    pub const ITEM: &str = "horizon_menu::item";
    /// Presentation surface target.
    pub const SURFACE: &str = "horizon_menu::surface";
    /// Owning container target.
    pub const MENU: &str = "horizon_menu::menu";
    /// Sibling navigation target.
    pub const NAVIGATE: &str = "horizon_menu::navigate";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_crate_prefix() {
        for target in [targets::CONFIG, targets::SIGNAL] {
            assert!(target.starts_with(targets::CORE));
        }
        for target in [targets::ITEM, targets::SURFACE, targets::MENU, targets::NAVIGATE] {
            assert!(target.starts_with("horizon_menu::"));
        }
    }
}
