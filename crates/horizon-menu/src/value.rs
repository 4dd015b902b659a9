//! The value type stored in an item's configuration.

use std::fmt;
use std::sync::Arc;

use crate::menu::{Menu, MenuContainer};
use crate::surface::NodeId;

/// A configuration value of a [`MenuItem`](crate::MenuItem).
///
/// Each property accepts a subset of the variants, enforced by the validators
/// in this module.
#[derive(Clone, Default)]
pub enum ItemValue {
    /// No value.
    #[default]
    Null,
    /// A flag such as `disabled` or `checked`.
    Bool(bool),
    /// A string such as `text`, `url`, or a submenu id.
    Text(String),
    /// A node on the surface, used for prebuilt help text or submenu markup.
    Node(NodeId),
    /// A live submenu.
    Menu(Arc<dyn MenuContainer>),
    /// A submenu to be built from an id and item data.
    Descriptor(MenuDescriptor),
}

impl ItemValue {
    /// The flag, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The node, if this is a `Node`.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(n) => Some(*n),
            _ => None,
        }
    }

    /// The container, if this is a `Menu`.
    pub fn as_menu(&self) -> Option<&Arc<dyn MenuContainer>> {
        match self {
            Self::Menu(m) => Some(m),
            _ => None,
        }
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `false` for `Null`, `Bool(false)` and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl PartialEq for ItemValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::Menu(a), Self::Menu(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Self::Descriptor(a), Self::Descriptor(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Node(n) => f.debug_tuple("Node").field(n).finish(),
            Self::Menu(m) => f.debug_tuple("Menu").field(&m.id()).finish(),
            Self::Descriptor(d) => f.debug_tuple("Descriptor").field(d).finish(),
        }
    }
}

impl From<bool> for ItemValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NodeId> for ItemValue {
    fn from(value: NodeId) -> Self {
        Self::Node(value)
    }
}

impl From<Arc<dyn MenuContainer>> for ItemValue {
    fn from(value: Arc<dyn MenuContainer>) -> Self {
        Self::Menu(value)
    }
}

impl From<Arc<Menu>> for ItemValue {
    fn from(value: Arc<Menu>) -> Self {
        Self::Menu(value)
    }
}

impl From<MenuDescriptor> for ItemValue {
    fn from(value: MenuDescriptor) -> Self {
        Self::Descriptor(value)
    }
}

/// The "id plus item data" form of a submenu.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuDescriptor {
    /// Id of the menu to build.
    pub id: String,
    /// One entry per item, added to group 0 in order.
    pub item_data: Vec<ItemData>,
}

impl MenuDescriptor {
    /// A descriptor with no items.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_data: Vec::new(),
        }
    }

    /// Append an item entry.
    pub fn item(mut self, data: impl Into<ItemData>) -> Self {
        self.item_data.push(data.into());
        self
    }
}

/// Text and configuration overrides for one item of a [`MenuDescriptor`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemData {
    /// The item's label.
    pub text: String,
    /// Property overrides applied after construction.
    pub config: Vec<(String, ItemValue)>,
}

impl ItemData {
    /// An entry with the given label and no overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            config: Vec::new(),
        }
    }

    /// Add a property override.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        self.config.push((name.into(), value.into()));
        self
    }
}

impl From<&str> for ItemData {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Validators for the item's properties.
pub mod validators {
    use super::ItemValue;

    /// `Bool` only.
    pub fn is_bool(value: &ItemValue) -> bool {
        matches!(value, ItemValue::Bool(_))
    }

    /// `Text` only.
    pub fn is_text(value: &ItemValue) -> bool {
        matches!(value, ItemValue::Text(_))
    }

    /// `Text` or `Null`.
    pub fn text_or_null(value: &ItemValue) -> bool {
        matches!(value, ItemValue::Text(_) | ItemValue::Null)
    }

    /// `Text`, `Node` or `Null`.
    pub fn helptext(value: &ItemValue) -> bool {
        matches!(
            value,
            ItemValue::Text(_) | ItemValue::Node(_) | ItemValue::Null
        )
    }

    /// Anything except `Bool(true)`; `Bool(false)` clears the submenu.
    pub fn submenu(value: &ItemValue) -> bool {
        !matches!(value, ItemValue::Bool(true))
    }
}
