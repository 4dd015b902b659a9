//! Presentation surface abstraction.
//!
//! Menu items never talk to a concrete toolkit. Every visual mutation goes
//! through the [`Surface`] trait: creating nodes, moving them around the tree,
//! editing attributes, classes and inline styles, moving input focus and
//! caching icon assets.
//!
//! [`MemorySurface`] is a retained, arena-backed node tree implementing the
//! trait. It is what the tests run against and what a headless embedder can
//! use directly.
//!
//! # Example
//!
//! ```
//! use horizon_menu::surface::{MemorySurface, Surface};
//!
//! let surface = MemorySurface::new();
//! let item = surface.create_element("li");
//! let link = surface.create_element("a");
//! surface.append_child(item, link).unwrap();
//! surface.add_class(&[item, link], "selected");
//!
//! assert!(surface.has_class(link, "selected"));
//! assert_eq!(surface.parent(link), Some(item));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_menu_core::logging::targets;
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A handle to a node on a [`Surface`].
    ///
    /// Handles stay valid until the node is removed with [`Surface::remove_node`].
    pub struct NodeId;
}

/// Errors returned by surface tree mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The node handle is unknown or the node was removed.
    #[error("Invalid or removed node")]
    InvalidNode,
    /// The reference node is not a child of the given parent.
    #[error("Node is not a child of the given parent")]
    NotAChild,
    /// The operation needs an element but was given a text node.
    #[error("Operation requires an element node")]
    NotAnElement,
    /// Inserting the node would make it its own ancestor.
    #[error("Insertion would create a cycle")]
    WouldCycle,
}

/// Result type alias for surface operations.
pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// The capability set a menu item needs from its presentation layer.
///
/// Implementations use interior mutability: every method takes `&self`, and a
/// surface is shared between all items of a menu tree.
pub trait Surface: Send + Sync {
    /// Create a detached element node with the given tag.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Create a detached text node.
    fn create_text(&self, text: &str) -> NodeId;

    /// Remove a node and its whole subtree, detaching it first.
    fn remove_node(&self, node: NodeId);

    /// Whether the handle refers to a live node.
    fn contains(&self, node: NodeId) -> bool;

    /// The node's parent, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// The node's children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Append `child` to `parent`, detaching it from its current parent first.
    fn append_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or at the end when
    /// `reference` is `None`), detaching it from its current parent first.
    fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> SurfaceResult<()>;

    /// Detach `child` from `parent`. The node stays alive.
    fn remove_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()>;

    /// Put `new_child` where `old_child` was. `old_child` is detached.
    fn replace_child(
        &self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> SurfaceResult<()> {
        if self.parent(old_child) != Some(parent) {
            return Err(SurfaceError::NotAChild);
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.remove_child(parent, old_child)
    }

    /// Lower-cased tag name, or `None` for text nodes and unknown handles.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// The value of a text node.
    fn node_value(&self, node: NodeId) -> Option<String>;

    /// Replace the value of a text node.
    fn set_node_value(&self, node: NodeId, value: &str) -> SurfaceResult<()>;

    /// Concatenated text of the node and all its descendants.
    fn text_content(&self, node: NodeId) -> String;

    /// Replace all children of an element with a single text node.
    fn set_text_content(&self, node: NodeId, text: &str) -> SurfaceResult<()>;

    /// Set an attribute on an element.
    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> SurfaceResult<()>;

    /// Read an attribute of an element.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Remove an attribute from an element. Removing a missing attribute is fine.
    fn remove_attribute(&self, node: NodeId, name: &str) -> SurfaceResult<()>;

    /// Add a style class to every node in `nodes`. Text nodes are skipped.
    fn add_class(&self, nodes: &[NodeId], class: &str);

    /// Remove a style class from every node in `nodes`.
    fn remove_class(&self, nodes: &[NodeId], class: &str);

    /// Whether the node carries the class.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Set an inline style property.
    fn set_style(&self, node: NodeId, property: &str, value: &str) -> SurfaceResult<()>;

    /// Read an inline style property.
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Whether the node is hidden via `display: none`.
    fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() == Some("none")
    }

    /// Move input focus to the node.
    fn focus(&self, node: NodeId);

    /// Remove input focus from the node if it has it.
    fn blur(&self, node: NodeId);

    /// The node holding input focus.
    fn focused(&self) -> Option<NodeId>;

    /// Generate a document-unique identifier.
    fn generate_id(&self, prefix: &str) -> String;

    /// Start loading an image into the surface's cache. Idempotent per URL.
    fn preload_image(&self, url: &str);

    /// The cached source for a preloaded image, or `None` if it is not ready.
    fn cached_image(&self, url: &str) -> Option<String>;

    /// The first element child of `node`, looking at the first child and the
    /// one after it (so a single leading whitespace text node is tolerated).
    ///
    /// With `tag`, the element must also have that tag name.
    fn first_element_child(&self, node: NodeId, tag: Option<&str>) -> Option<NodeId> {
        let element = self
            .children(node)
            .into_iter()
            .take(2)
            .find(|&child| self.tag_name(child).is_some())?;
        match tag {
            Some(tag) if !self.tag_name(element)?.eq_ignore_ascii_case(tag) => None,
            _ => Some(element),
        }
    }
}

// ============================================================================
// MemorySurface
// ============================================================================

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String },
    Text { value: String },
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

#[derive(Default)]
struct SurfaceState {
    nodes: SlotMap<NodeId, NodeData>,
    focused: Option<NodeId>,
    images: HashSet<String>,
    preload_requests: Vec<String>,
}

impl SurfaceState {
    fn node(&self, id: NodeId) -> SurfaceResult<&NodeData> {
        self.nodes.get(id).ok_or(SurfaceError::InvalidNode)
    }

    fn element_mut(&mut self, id: NodeId) -> SurfaceResult<&mut NodeData> {
        let data = self.nodes.get_mut(id).ok_or(SurfaceError::InvalidNode)?;
        if !data.is_element() {
            return Err(SurfaceError::NotAnElement);
        }
        Ok(data)
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(id).and_then(|d| d.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&child| child != id);
        }
    }

    fn is_ancestor_of(&self, potential_ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(data) = self.nodes.get(id) {
            for &child in &data.children {
                self.collect_descendants(child, result);
                result.push(child);
            }
        }
    }

    fn text_into(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text { value } => out.push_str(value),
            NodeKind::Element { .. } => {
                for &child in &data.children {
                    self.text_into(child, out);
                }
            }
        }
    }

    fn dump_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(data) = self.nodes.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        match &data.kind {
            NodeKind::Text { value } => {
                let _ = writeln!(out, "{indent}{value:?}");
            }
            NodeKind::Element { tag } => {
                let _ = write!(out, "{indent}<{tag}");
                if !data.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", data.classes.join(" "));
                }
                for (name, value) in &data.attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                if !data.styles.is_empty() {
                    let style: Vec<String> =
                        data.styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    let _ = write!(out, " style=\"{}\"", style.join("; "));
                }
                out.push_str(">\n");
                for &child in &data.children {
                    self.dump_into(child, depth + 1, out);
                }
            }
        }
    }
}

/// An in-memory [`Surface`]: a retained node tree with an image cache.
///
/// Image preloading completes synchronously unless disabled with
/// [`MemorySurface::with_image_loading`], which lets callers exercise the
/// "asset not ready" path.
pub struct MemorySurface {
    state: RwLock<SurfaceState>,
    next_id: AtomicU64,
    image_loading: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Create an empty surface whose image loads succeed immediately.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SurfaceState::default()),
            next_id: AtomicU64::new(0),
            image_loading: true,
        }
    }

    /// Choose whether preloads populate the image cache.
    pub fn with_image_loading(mut self, enabled: bool) -> Self {
        self.image_loading = enabled;
        self
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Classes on a node, in the order they were added.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.state
            .read()
            .nodes
            .get(node)
            .map(|d| d.classes.clone())
            .unwrap_or_default()
    }

    /// Every URL passed to [`Surface::preload_image`] that triggered a load.
    pub fn preload_requests(&self) -> Vec<String> {
        self.state.read().preload_requests.clone()
    }

    /// Render a subtree as indented markup-like lines, for debugging.
    pub fn dump_tree(&self, node: NodeId) -> String {
        let mut output = String::new();
        self.state.read().dump_into(node, 0, &mut output);
        output
    }
}

impl Surface for MemorySurface {
    fn create_element(&self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let id = self
            .state
            .write()
            .nodes
            .insert(NodeData::new(NodeKind::Element { tag: tag.clone() }));
        tracing::trace!(target: targets::SURFACE, ?id, %tag, "created element");
        id
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.state.write().nodes.insert(NodeData::new(NodeKind::Text {
            value: text.to_string(),
        }))
    }

    fn remove_node(&self, node: NodeId) {
        let mut state = self.state.write();
        if !state.nodes.contains_key(node) {
            return;
        }
        state.detach(node);
        let mut doomed = Vec::new();
        state.collect_descendants(node, &mut doomed);
        doomed.push(node);
        for id in doomed {
            state.nodes.remove(id);
            if state.focused == Some(id) {
                state.focused = None;
            }
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        self.state.read().nodes.contains_key(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.read().nodes.get(node).and_then(|d| d.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.state
            .read()
            .nodes
            .get(node)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    }

    fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> SurfaceResult<()> {
        let mut state = self.state.write();
        state.node(child)?;
        if !state.node(parent)?.is_element() {
            return Err(SurfaceError::NotAnElement);
        }
        if state.is_ancestor_of(child, parent) {
            return Err(SurfaceError::WouldCycle);
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if state.node(reference)?.parent != Some(parent) {
                return Err(SurfaceError::NotAChild);
            }
        }

        state.detach(child);
        let parent_data = state.element_mut(parent)?;
        let position = reference
            .and_then(|r| parent_data.children.iter().position(|&c| c == r))
            .unwrap_or(parent_data.children.len());
        parent_data.children.insert(position, child);
        if let Some(child_data) = state.nodes.get_mut(child) {
            child_data.parent = Some(parent);
        }
        Ok(())
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        let mut state = self.state.write();
        if state.node(child)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild);
        }
        state.detach(child);
        Ok(())
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.state.read().nodes.get(node)?.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text { .. } => None,
        }
    }

    fn node_value(&self, node: NodeId) -> Option<String> {
        match &self.state.read().nodes.get(node)?.kind {
            NodeKind::Text { value } => Some(value.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    fn set_node_value(&self, node: NodeId, value: &str) -> SurfaceResult<()> {
        let mut state = self.state.write();
        let data = state.nodes.get_mut(node).ok_or(SurfaceError::InvalidNode)?;
        match &mut data.kind {
            NodeKind::Text { value: current } => {
                *current = value.to_string();
                Ok(())
            }
            NodeKind::Element { .. } => Err(SurfaceError::NotAnElement),
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.state.read().text_into(node, &mut out);
        out
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> SurfaceResult<()> {
        let old_children = {
            let mut state = self.state.write();
            std::mem::take(&mut state.element_mut(node)?.children)
        };
        for child in old_children {
            if let Some(data) = self.state.write().nodes.get_mut(child) {
                data.parent = None;
            }
            self.remove_node(child);
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> SurfaceResult<()> {
        self.state
            .write()
            .element_mut(node)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.state
            .read()
            .nodes
            .get(node)?
            .attributes
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> SurfaceResult<()> {
        self.state
            .write()
            .element_mut(node)?
            .attributes
            .remove(&name.to_ascii_lowercase());
        Ok(())
    }

    fn add_class(&self, nodes: &[NodeId], class: &str) {
        let mut state = self.state.write();
        for &node in nodes {
            if let Ok(data) = state.element_mut(node) {
                if !data.classes.iter().any(|c| c == class) {
                    data.classes.push(class.to_string());
                }
            }
        }
    }

    fn remove_class(&self, nodes: &[NodeId], class: &str) {
        let mut state = self.state.write();
        for &node in nodes {
            if let Some(data) = state.nodes.get_mut(node) {
                data.classes.retain(|c| c != class);
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state
            .read()
            .nodes
            .get(node)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) -> SurfaceResult<()> {
        self.state
            .write()
            .element_mut(node)?
            .styles
            .insert(property.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.state
            .read()
            .nodes
            .get(node)?
            .styles
            .get(&property.to_ascii_lowercase())
            .cloned()
    }

    fn focus(&self, node: NodeId) {
        let mut state = self.state.write();
        if state.nodes.contains_key(node) {
            state.focused = Some(node);
        }
    }

    fn blur(&self, node: NodeId) {
        let mut state = self.state.write();
        if state.focused == Some(node) {
            state.focused = None;
        }
    }

    fn focused(&self) -> Option<NodeId> {
        self.state.read().focused
    }

    fn generate_id(&self, prefix: &str) -> String {
        format!("{prefix}-gen{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn preload_image(&self, url: &str) {
        let mut state = self.state.write();
        if state.images.contains(url) || state.preload_requests.iter().any(|u| u == url) {
            return;
        }
        state.preload_requests.push(url.to_string());
        if self.image_loading {
            state.images.insert(url.to_string());
        } else {
            tracing::debug!(target: targets::SURFACE, %url, "image loading disabled, asset stays pending");
        }
    }

    fn cached_image(&self, url: &str) -> Option<String> {
        self.state
            .read()
            .images
            .contains(url)
            .then(|| url.to_string())
    }
}

static_assertions::assert_impl_all!(MemorySurface: Send, Sync);
