//! Icon and alt-text configuration for menu items.
//!
//! All the image paths, alt texts and class names an item renders with live
//! in [`ItemAssets`]. The defaults reproduce the classic menu look; a theme
//! can override any subset of them from TOML:
//!
//! ```
//! use horizon_menu::ItemAssets;
//!
//! let assets = ItemAssets::from_toml_str(r#"
//! secure = true
//! css_class_name = "menuitem"
//!
//! [alt]
//! checked = "Selected."
//! "#).unwrap();
//!
//! assert_eq!(assets.css_class_name, "menuitem");
//! assert_eq!(assets.alt.checked, "Selected.");
//! assert!(assets.image_url("x.gif").starts_with("https://"));
//! ```

use serde::Deserialize;

use crate::error::MenuError;

/// Which variant of an icon to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconVariant {
    /// Default look.
    Normal,
    /// The item is selected (hovered or expanded).
    Selected,
    /// The item is disabled.
    Disabled,
}

/// Image paths for the three variants of one icon, relative to the image root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconSet {
    /// Path of the normal variant.
    pub normal: String,
    /// Path of the selected variant.
    pub selected: String,
    /// Path of the disabled variant.
    pub disabled: String,
}

impl IconSet {
    fn new(normal: &str, selected: &str, disabled: &str) -> Self {
        Self {
            normal: normal.to_string(),
            selected: selected.to_string(),
            disabled: disabled.to_string(),
        }
    }

    /// The path for `variant`.
    pub fn path(&self, variant: IconVariant) -> &str {
        match variant {
            IconVariant::Normal => &self.normal,
            IconVariant::Selected => &self.selected,
            IconVariant::Disabled => &self.disabled,
        }
    }

    /// All three paths, normal first.
    pub fn paths(&self) -> [&str; 3] {
        [&self.normal, &self.selected, &self.disabled]
    }
}

/// Alternative texts for the item's icons.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AltTexts {
    /// Submenu indicator while collapsed.
    pub collapsed: String,
    /// Submenu indicator while expanded.
    pub expanded: String,
    /// Submenu indicator while the item is disabled.
    pub disabled: String,
    /// Check mark.
    pub checked: String,
    /// Check mark while the item is disabled.
    pub disabled_checked: String,
}

impl Default for AltTexts {
    fn default() -> Self {
        Self {
            collapsed: "Collapsed.  Click to expand.".to_string(),
            expanded: "Expanded.  Click to collapse.".to_string(),
            disabled: "Disabled.".to_string(),
            checked: "Checked.".to_string(),
            disabled_checked: "Checked. (Item disabled.)".to_string(),
        }
    }
}

/// Every constant a menu item renders with.
///
/// Icon tables must be given in full when overridden; the other fields fall
/// back to their defaults individually.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ItemAssets {
    /// Root prepended to icon paths.
    pub image_root: String,
    /// Root prepended to icon paths when `secure` is set.
    pub image_root_secure: String,
    /// Serve icons from the secure root.
    pub secure: bool,
    /// Submenu indicator icons.
    pub submenu_indicator: IconSet,
    /// Check mark icons.
    pub checked: IconSet,
    /// Icon alt texts.
    pub alt: AltTexts,
    /// Class added to every item's root node.
    pub css_class_name: String,
}

impl Default for ItemAssets {
    fn default() -> Self {
        Self {
            image_root: "http://us.i1.yimg.com/us.yimg.com/i/".to_string(),
            image_root_secure: "https://a248.e.akamai.net/sec.yimg.com/i/".to_string(),
            secure: false,
            submenu_indicator: IconSet::new(
                "nt/ic/ut/alt1/menuarorght8_nrm_1.gif",
                "nt/ic/ut/alt1/menuarorght8_hov_1.gif",
                "nt/ic/ut/alt1/menuarorght8_dim_1.gif",
            ),
            checked: IconSet::new(
                "nt/ic/ut/bsc/menuchk8_nrm_1.gif",
                "nt/ic/ut/bsc/menuchk8_hov_1.gif",
                "nt/ic/ut/bsc/menuchk8_dim_1.gif",
            ),
            alt: AltTexts::default(),
            css_class_name: "yuimenuitem".to_string(),
        }
    }
}

impl ItemAssets {
    /// Parse assets from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, MenuError> {
        Ok(toml::from_str(source)?)
    }

    /// The image root in effect.
    pub fn image_root(&self) -> &str {
        if self.secure {
            &self.image_root_secure
        } else {
            &self.image_root
        }
    }

    /// Absolute URL of an icon path.
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.image_root(), path)
    }
}
