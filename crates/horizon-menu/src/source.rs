//! Item sources and their normalization.
//!
//! An item is built from plain text or from a node already on the surface.
//! [`normalize`] inspects the source once, creates or locates the item's
//! structure (root, anchor and text node), and returns the initial property
//! values as an [`AttributeBag`]. Nothing here touches an item's
//! configuration; the item applies the bag itself.

use horizon_menu_core::logging::targets;

use crate::error::{MenuError, Result};
use crate::surface::{NodeId, Surface};
use crate::value::ItemValue;

/// What an item is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSource {
    /// A plain label.
    Text(String),
    /// An `option`, `optgroup` or `li` node on the surface.
    Node(NodeId),
}

impl From<&str> for ItemSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ItemSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NodeId> for ItemSource {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// The recognised kinds of item source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// A plain label.
    Text(String),
    /// A single-choice `option` node.
    OptionNode(NodeId),
    /// An `optgroup` node, whose children become a submenu.
    GroupNode(NodeId),
    /// A full `li` node with an anchor, adopted in place.
    ListItemNode(NodeId),
}

impl SourceKind {
    /// Work out the kind of `source`.
    pub fn classify(surface: &dyn Surface, source: &ItemSource) -> Result<Self> {
        let node = match source {
            ItemSource::Text(text) => return Ok(Self::Text(text.clone())),
            ItemSource::Node(node) => *node,
        };
        if !surface.contains(node) {
            return Err(crate::surface::SurfaceError::InvalidNode.into());
        }
        match surface.tag_name(node).as_deref() {
            Some("option") => Ok(Self::OptionNode(node)),
            Some("optgroup") => Ok(Self::GroupNode(node)),
            Some("li") => Ok(Self::ListItemNode(node)),
            Some(other) => Err(MenuError::unsupported(other)),
            None => Err(MenuError::unsupported("#text")),
        }
    }

    /// The source node, if the kind has one.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Text(_) => None,
            Self::OptionNode(n) | Self::GroupNode(n) | Self::ListItemNode(n) => Some(*n),
        }
    }
}

/// Initial property values extracted from a source.
///
/// Only the keys in [`AttributeBag::KEYS`] are accepted, each with its own
/// value type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    entries: Vec<(&'static str, ItemValue)>,
}

impl AttributeBag {
    /// Accepted keys, in the order they are applied.
    pub const KEYS: [&'static str; 5] = ["text", "url", "target", "emphasis", "strongemphasis"];

    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    fn accepts(key: &str, value: &ItemValue) -> bool {
        match key {
            "text" | "url" => matches!(value, ItemValue::Text(_)),
            "target" => matches!(value, ItemValue::Text(_) | ItemValue::Null),
            "emphasis" | "strongemphasis" => matches!(value, ItemValue::Bool(_)),
            _ => false,
        }
    }

    /// Store `value` under `key`. Returns `false` if the key is unknown or
    /// the value has the wrong type.
    pub fn set(&mut self, key: &str, value: impl Into<ItemValue>) -> bool {
        let value = value.into();
        let Some(key) = Self::KEYS.iter().copied().find(|k| k.eq_ignore_ascii_case(key)) else {
            return false;
        };
        if !Self::accepts(key, &value) {
            return false;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        true
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ItemValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn text(&self) -> Option<&str> {
        self.get("text").and_then(ItemValue::as_text)
    }

    pub fn url(&self) -> Option<&str> {
        self.get("url").and_then(ItemValue::as_text)
    }

    pub fn target(&self) -> Option<&str> {
        self.get("target").and_then(ItemValue::as_text)
    }

    pub fn emphasis(&self) -> bool {
        self.get("emphasis").and_then(ItemValue::as_bool).unwrap_or(false)
    }

    pub fn strong_emphasis(&self) -> bool {
        self.get("strongemphasis")
            .and_then(ItemValue::as_bool)
            .unwrap_or(false)
    }

    /// Entries in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ItemValue)> + '_ {
        Self::KEYS
            .into_iter()
            .filter_map(|key| self.entries.iter().find(|(k, _)| *k == key))
            .map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The outcome of [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    /// What the source turned out to be.
    pub kind: SourceKind,
    /// The item's root `li`.
    pub root: NodeId,
    /// The item's anchor.
    pub anchor: NodeId,
    /// The text node holding the label.
    pub text: NodeId,
    /// Initial property values.
    pub attributes: AttributeBag,
    /// Apply the attributes without running handlers, because the markup
    /// already matches them.
    pub silent: bool,
    /// A node whose children describe a submenu.
    pub subtree: Option<NodeId>,
}

/// Inspect `source` and produce the item's structure and initial values.
pub fn normalize(surface: &dyn Surface, source: &ItemSource) -> Result<NormalizedSource> {
    let kind = SourceKind::classify(surface, source)?;
    match &kind {
        SourceKind::Text(text) => synthesized(surface, kind.clone(), text.clone(), None),
        SourceKind::OptionNode(node) => {
            let text = surface.text_content(*node);
            synthesized(surface, kind.clone(), text, None)
        }
        SourceKind::GroupNode(node) => {
            let label = surface.attribute(*node, "label").unwrap_or_default();
            synthesized(surface, kind.clone(), label, Some(*node))
        }
        SourceKind::ListItemNode(node) => list_item(surface, kind.clone(), *node),
    }
}

/// Build a fresh `li > a > #text` structure.
fn synthesized(
    surface: &dyn Surface,
    kind: SourceKind,
    text: String,
    subtree: Option<NodeId>,
) -> Result<NormalizedSource> {
    let root = surface.create_element("li");
    let text_node = surface.create_text("");
    let anchor = surface.create_element("a");
    surface.append_child(anchor, text_node)?;
    surface.append_child(root, anchor)?;

    let mut attributes = AttributeBag::new();
    attributes.set("text", text);

    Ok(NormalizedSource {
        kind,
        root,
        anchor,
        text: text_node,
        attributes,
        silent: false,
        subtree,
    })
}

/// Adopt an existing `li`, synthesizing its anchor if needed.
fn list_item(surface: &dyn Surface, kind: SourceKind, li: NodeId) -> Result<NormalizedSource> {
    let mut attributes = AttributeBag::new();

    let anchor = match surface.first_element_child(li, Some("a")) {
        Some(anchor) => {
            let url = surface
                .attribute(anchor, "href")
                .filter(|href| !href.is_empty())
                .unwrap_or_else(|| "#".to_string());
            let target = surface.attribute(anchor, "target").map(ItemValue::Text);
            attributes.set("text", surface.text_content(anchor));
            attributes.set("url", url);
            attributes.set("target", target.unwrap_or_default());
            anchor
        }
        None => {
            let first = surface.children(li).into_iter().next();
            let (text_node, text) = first
                .and_then(|n| surface.node_value(n).map(|v| (n, v)))
                .ok_or(MenuError::MissingText)?;

            let anchor = surface.create_element("a");
            surface.set_attribute(anchor, "href", "#")?;
            surface.replace_child(li, anchor, text_node)?;
            surface.append_child(anchor, text_node)?;
            tracing::debug!(target: targets::ITEM, "synthesized anchor for list item");

            attributes.set("text", text);
            attributes.set("url", "#");
            attributes.set("target", ItemValue::Null);
            anchor
        }
    };

    let wrapper = surface.first_element_child(anchor, None);
    let wrapper_tag = wrapper.and_then(|w| surface.tag_name(w));
    attributes.set("emphasis", wrapper_tag.as_deref() == Some("em"));
    attributes.set("strongemphasis", wrapper_tag.as_deref() == Some("strong"));

    let holder = wrapper.unwrap_or(anchor);
    let text = match surface.children(holder).first() {
        Some(&first) if surface.node_value(first).is_some() => first,
        _ => {
            let text = surface.create_text("");
            surface.append_child(holder, text)?;
            text
        }
    };

    Ok(NormalizedSource {
        kind,
        root: li,
        anchor,
        text,
        attributes,
        silent: true,
        subtree: Some(li),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn element_with_text(surface: &MemorySurface, tag: &str, text: &str) -> NodeId {
        let node = surface.create_element(tag);
        let text = surface.create_text(text);
        surface.append_child(node, text).unwrap();
        node
    }

    #[test]
    fn test_bag_rejects_unknown_keys_and_wrong_types() {
        let mut bag = AttributeBag::new();
        assert!(bag.set("TEXT", "Open"));
        assert!(!bag.set("color", "red"));
        assert!(!bag.set("emphasis", "yes"));
        assert!(bag.set("target", ItemValue::Null));
        assert!(bag.set("text", "Close"));

        assert_eq!(bag.text(), Some("Close"));
        assert_eq!(bag.len(), 2);
        assert!(!bag.emphasis());
    }

    #[test]
    fn test_bag_iterates_in_key_order() {
        let mut bag = AttributeBag::new();
        bag.set("strongemphasis", true);
        bag.set("url", "/x");
        bag.set("text", "X");
        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["text", "url", "strongemphasis"]);
    }

    #[test]
    fn test_classify() {
        let surface = MemorySurface::new();
        let option = surface.create_element("OPTION");
        let group = surface.create_element("optgroup");
        let li = surface.create_element("li");
        let table = surface.create_element("table");
        let text = surface.create_text("x");

        assert_eq!(
            SourceKind::classify(&surface, &"Open".into()).unwrap(),
            SourceKind::Text("Open".into())
        );
        assert_eq!(
            SourceKind::classify(&surface, &option.into()).unwrap(),
            SourceKind::OptionNode(option)
        );
        assert_eq!(
            SourceKind::classify(&surface, &group.into()).unwrap(),
            SourceKind::GroupNode(group)
        );
        assert_eq!(
            SourceKind::classify(&surface, &li.into()).unwrap(),
            SourceKind::ListItemNode(li)
        );
        assert!(matches!(
            SourceKind::classify(&surface, &table.into()),
            Err(MenuError::UnsupportedSource { tag }) if tag == "table"
        ));
        assert!(SourceKind::classify(&surface, &text.into()).is_err());
    }

    #[test]
    fn test_text_source_synthesizes_structure() {
        let surface = MemorySurface::new();
        let normalized = normalize(&surface, &"Open".into()).unwrap();

        assert_eq!(surface.tag_name(normalized.root).as_deref(), Some("li"));
        assert_eq!(surface.parent(normalized.anchor), Some(normalized.root));
        assert_eq!(surface.parent(normalized.text), Some(normalized.anchor));
        assert_eq!(normalized.attributes.text(), Some("Open"));
        assert!(!normalized.silent);
        assert_eq!(normalized.subtree, None);
    }

    #[test]
    fn test_option_and_group_sources() {
        let surface = MemorySurface::new();
        let option = element_with_text(&surface, "option", "Red");
        let group = surface.create_element("optgroup");
        surface.set_attribute(group, "label", "Colors").unwrap();

        let from_option = normalize(&surface, &option.into()).unwrap();
        assert_eq!(from_option.attributes.text(), Some("Red"));
        assert_ne!(from_option.root, option);

        let from_group = normalize(&surface, &group.into()).unwrap();
        assert_eq!(from_group.attributes.text(), Some("Colors"));
        assert_eq!(from_group.subtree, Some(group));
    }

    #[test]
    fn test_list_item_with_emphasized_anchor() {
        let surface = MemorySurface::new();
        let li = surface.create_element("li");
        let a = surface.create_element("a");
        let em = element_with_text(&surface, "em", "Save");
        surface.set_attribute(a, "href", "/save").unwrap();
        surface.append_child(a, em).unwrap();
        surface.append_child(li, a).unwrap();

        let normalized = normalize(&surface, &li.into()).unwrap();
        assert_eq!(normalized.root, li);
        assert_eq!(normalized.anchor, a);
        assert_eq!(surface.parent(normalized.text), Some(em));
        assert_eq!(normalized.attributes.text(), Some("Save"));
        assert_eq!(normalized.attributes.url(), Some("/save"));
        assert_eq!(normalized.attributes.get("target"), Some(&ItemValue::Null));
        assert!(normalized.attributes.emphasis());
        assert!(!normalized.attributes.strong_emphasis());
        assert!(normalized.silent);
    }

    #[test]
    fn test_list_item_without_anchor() {
        let surface = MemorySurface::new();
        let li = element_with_text(&surface, "li", "Print");
        let text = surface.children(li)[0];

        let normalized = normalize(&surface, &li.into()).unwrap();
        assert_eq!(surface.children(li), vec![normalized.anchor]);
        assert_eq!(surface.attribute(normalized.anchor, "href").as_deref(), Some("#"));
        assert_eq!(normalized.text, text);
        assert_eq!(normalized.attributes.text(), Some("Print"));
        assert_eq!(normalized.attributes.url(), Some("#"));
    }

    #[test]
    fn test_list_item_without_href_defaults_url() {
        let surface = MemorySurface::new();
        let li = surface.create_element("li");
        let a = element_with_text(&surface, "a", "Help");
        surface.set_attribute(a, "target", "_blank").unwrap();
        surface.append_child(li, a).unwrap();

        let normalized = normalize(&surface, &li.into()).unwrap();
        assert_eq!(normalized.attributes.url(), Some("#"));
        assert_eq!(normalized.attributes.target(), Some("_blank"));
    }

    #[test]
    fn test_empty_anchor_gets_text_node() {
        let surface = MemorySurface::new();
        let li = surface.create_element("li");
        let a = surface.create_element("a");
        surface.append_child(li, a).unwrap();

        let normalized = normalize(&surface, &li.into()).unwrap();
        assert_eq!(surface.parent(normalized.text), Some(a));
        assert_eq!(normalized.attributes.text(), Some(""));
    }

    #[test]
    fn test_list_item_without_text_is_an_error() {
        let surface = MemorySurface::new();
        let li = surface.create_element("li");
        assert!(matches!(
            normalize(&surface, &li.into()),
            Err(MenuError::MissingText)
        ));
    }
}
