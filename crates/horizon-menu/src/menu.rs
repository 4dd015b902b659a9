//! Owning containers and the factory that builds them.
//!
//! An item only needs a narrow view of the menu it lives in: its groups of
//! sibling slots, a lazy-load flag, visibility, and an active-item
//! back-reference. That view is the [`MenuContainer`] trait. [`Menu`] is the
//! default implementation and [`MenuFactory`] is how items build submenus and
//! submenu items without knowing the concrete types.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_menu_core::logging::targets;
use horizon_menu_core::{ConnectionId, Signal};
use parking_lot::RwLock;

use crate::error::{MenuError, Result};
use crate::item::{ItemConfig, ItemContext, MenuItem};
use crate::source::ItemSource;
use crate::surface::NodeId;
use crate::value::ItemData;

/// The view of an owning menu that items rely on.
pub trait MenuContainer: Send + Sync {
    /// The menu's id.
    fn id(&self) -> String;

    /// The menu's root node.
    fn element(&self) -> NodeId;

    /// Groups of item slots. Empty slots are `None`.
    fn item_groups(&self) -> Vec<Vec<Option<Arc<MenuItem>>>>;

    fn lazy_load(&self) -> bool;

    fn set_lazy_load(&self, lazy_load: bool);

    fn is_visible(&self) -> bool;

    /// The item that last received focus.
    fn active_item(&self) -> Option<Arc<MenuItem>>;

    fn set_active_item(&self, item: Option<&Arc<MenuItem>>);

    /// Append an item to group 0.
    fn add_item(&self, item: Arc<MenuItem>) {
        self.add_item_to_group(item, 0);
    }

    /// Append an item to the given group, creating groups as needed.
    fn add_item_to_group(&self, item: Arc<MenuItem>, group_index: usize);

    /// The item this menu is a submenu of.
    fn parent_item(&self) -> Option<Arc<MenuItem>>;

    fn set_parent_item(&self, item: Option<&Arc<MenuItem>>);

    /// Destroy every item and detach the menu's element.
    fn destroy(&self);
}

/// Where a menu gets its structure from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSource {
    /// Build an empty menu with this id.
    Id(String),
    /// Adopt a `div` whose `ul` children are groups of `li` items.
    Node(NodeId),
}

/// Options for building a submenu.
#[derive(Clone, Default)]
pub struct SubmenuConfig {
    pub lazy_load: bool,
    /// Items to add to group 0 after construction.
    pub item_data: Vec<ItemData>,
    /// The item the submenu belongs to.
    pub parent: Option<Arc<MenuItem>>,
}

impl fmt::Debug for SubmenuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmenuConfig")
            .field("lazy_load", &self.lazy_load)
            .field("item_data", &self.item_data)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Builds the menus and items an item needs for its submenu.
pub trait MenuFactory: Send + Sync {
    /// Build a submenu.
    fn create_menu(
        &self,
        ctx: &ItemContext,
        source: MenuSource,
        config: SubmenuConfig,
    ) -> Result<Arc<dyn MenuContainer>>;

    /// Build an item of a submenu.
    fn create_item(
        &self,
        ctx: &ItemContext,
        source: ItemSource,
        config: ItemConfig,
    ) -> Result<Arc<MenuItem>>;
}

/// Builds [`Menu`] and [`MenuItem`] instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMenuFactory;

impl MenuFactory for DefaultMenuFactory {
    fn create_menu(
        &self,
        ctx: &ItemContext,
        source: MenuSource,
        config: SubmenuConfig,
    ) -> Result<Arc<dyn MenuContainer>> {
        let menu: Arc<dyn MenuContainer> = Menu::build(ctx.clone(), source, config)?;
        Ok(menu)
    }

    fn create_item(
        &self,
        ctx: &ItemContext,
        source: ItemSource,
        config: ItemConfig,
    ) -> Result<Arc<MenuItem>> {
        MenuItem::new(ctx.clone(), source, config)
    }
}

// ============================================================================
// Menu
// ============================================================================

struct Subscription {
    item: Weak<MenuItem>,
    focus: ConnectionId,
    blur: ConnectionId,
    destroy: ConnectionId,
}

struct MenuState {
    groups: Vec<Vec<Option<Arc<MenuItem>>>>,
    group_lists: Vec<NodeId>,
    subscriptions: Vec<Subscription>,
    active_item: Option<Weak<MenuItem>>,
    parent_item: Option<Weak<MenuItem>>,
    lazy_load: bool,
    visible: bool,
}

/// The default owning container.
///
/// The element is a `div` with an `id` attribute and one `ul` per group.
/// Groups are sparse: removing or destroying an item empties its slot
/// without shifting the others.
pub struct Menu {
    id: String,
    ctx: ItemContext,
    element: NodeId,
    this: Weak<Menu>,
    state: RwLock<MenuState>,

    /// Emitted after an item is added.
    pub item_added: Signal<Arc<MenuItem>>,

    /// Emitted after an item leaves its slot, by removal or destruction.
    pub item_removed: Signal<Arc<MenuItem>>,
}

fn is_same(a: &Arc<MenuItem>, b: &MenuItem) -> bool {
    std::ptr::eq(Arc::as_ptr(a), b)
}

impl Menu {
    /// Create an empty menu with a fresh element.
    pub fn new(ctx: ItemContext, id: impl Into<String>) -> Arc<Self> {
        let id = id.into();
        let element = ctx.surface.create_element("div");
        if let Err(err) = ctx.surface.set_attribute(element, "id", &id) {
            tracing::warn!(target: targets::MENU, error = %err, "could not set menu id");
        }
        Self::with_element(ctx, id, element, Vec::new())
    }

    fn with_element(
        ctx: ItemContext,
        id: String,
        element: NodeId,
        group_lists: Vec<NodeId>,
    ) -> Arc<Self> {
        let groups = vec![Vec::new(); group_lists.len()];
        Arc::new_cyclic(|this| Self {
            id,
            ctx,
            element,
            this: this.clone(),
            state: RwLock::new(MenuState {
                groups,
                group_lists,
                subscriptions: Vec::new(),
                active_item: None,
                parent_item: None,
                lazy_load: false,
                visible: true,
            }),
            item_added: Signal::named("itemAdded"),
            item_removed: Signal::named("itemRemoved"),
        })
    }

    /// Build a menu from `source` and populate it.
    ///
    /// Items that cannot be built from their markup are skipped with a
    /// warning; only an unusable `source` fails.
    pub fn build(ctx: ItemContext, source: MenuSource, config: SubmenuConfig) -> Result<Arc<Self>> {
        let surface = ctx.surface.clone();
        let menu = match source {
            MenuSource::Id(id) => {
                let menu = Self::new(ctx, id);
                menu.set_lazy_load(config.lazy_load);
                menu
            }
            MenuSource::Node(node) => {
                let tag = surface.tag_name(node).unwrap_or_else(|| "#text".to_string());
                if tag != "div" {
                    return Err(MenuError::unsupported(tag));
                }
                let id = match surface.attribute(node, "id") {
                    Some(id) => id,
                    None => {
                        let id = surface.generate_id("menu");
                        surface.set_attribute(node, "id", &id)?;
                        id
                    }
                };
                let lists: Vec<NodeId> = surface
                    .children(node)
                    .into_iter()
                    .filter(|&child| surface.tag_name(child).as_deref() == Some("ul"))
                    .collect();
                let menu = Self::with_element(ctx, id, node, lists.clone());
                menu.set_lazy_load(config.lazy_load);
                for (group_index, list) in lists.into_iter().enumerate() {
                    for li in surface.children(list) {
                        if surface.tag_name(li).as_deref() != Some("li") {
                            continue;
                        }
                        let item_config = ItemConfig::new().parent(menu.clone());
                        if let Some(item) = menu.create_item(ItemSource::Node(li), item_config) {
                            menu.add_item_to_group(item, group_index);
                        }
                    }
                }
                menu
            }
        };

        if let Some(parent) = &config.parent {
            menu.set_parent_item(Some(parent));
        }
        for data in config.item_data {
            let item_config = ItemConfig::new()
                .parent(menu.clone())
                .values(data.config);
            if let Some(item) = menu.create_item(ItemSource::Text(data.text), item_config) {
                menu.add_item(item);
            }
        }

        tracing::debug!(target: targets::MENU, id = %menu.id, items = menu.item_count(), "menu built");
        Ok(menu)
    }

    fn create_item(&self, source: ItemSource, config: ItemConfig) -> Option<Arc<MenuItem>> {
        match self.ctx.factory.create_item(&self.ctx, source, config) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(target: targets::MENU, menu = %self.id, error = %err, "skipping item");
                None
            }
        }
    }

    /// The context items of this menu are built with.
    pub fn context(&self) -> &ItemContext {
        &self.ctx
    }

    /// Show or hide the menu.
    pub fn set_visible(&self, visible: bool) {
        self.state.write().visible = visible;
        let display = if visible { "block" } else { "none" };
        if let Err(err) = self.ctx.surface.set_style(self.element, "display", display) {
            tracing::warn!(target: targets::MENU, error = %err, "could not update menu visibility");
        }
    }

    /// The item at `(group_index, index)`, if the slot is filled.
    pub fn item_at(&self, group_index: usize, index: usize) -> Option<Arc<MenuItem>> {
        self.state
            .read()
            .groups
            .get(group_index)?
            .get(index)?
            .clone()
    }

    /// Number of filled slots across all groups.
    pub fn item_count(&self) -> usize {
        self.state
            .read()
            .groups
            .iter()
            .flatten()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.state.read().groups.len()
    }

    /// Take an item out of the menu, leaving its slot empty.
    ///
    /// The item is detached but not destroyed. Returns `false` if the item
    /// is not in this menu.
    pub fn remove_item(&self, item: &Arc<MenuItem>) -> bool {
        if !self.vacate(item) {
            return false;
        }
        let subscription = {
            let mut state = self.state.write();
            state
                .subscriptions
                .iter()
                .position(|s| s.item.ptr_eq(&Arc::downgrade(item)))
                .map(|pos| state.subscriptions.remove(pos))
        };
        if let Some(subscription) = subscription {
            item.events().focus.disconnect(subscription.focus);
            item.events().blur.disconnect(subscription.blur);
            item.events().destroy.disconnect(subscription.destroy);
        }

        let root = item.element();
        if let Some(parent) = self.ctx.surface.parent(root) {
            if let Err(err) = self.ctx.surface.remove_child(parent, root) {
                tracing::warn!(target: targets::MENU, error = %err, "could not detach removed item");
            }
        }
        item.set_parent(None);
        true
    }

    /// Empty the slot holding `item`. Returns whether it was found.
    fn vacate(&self, item: &MenuItem) -> bool {
        let removed = {
            let mut state = self.state.write();
            if state
                .active_item
                .as_ref()
                .and_then(Weak::upgrade)
                .is_some_and(|active| is_same(&active, item))
            {
                state.active_item = None;
            }
            state
                .groups
                .iter_mut()
                .flatten()
                .find(|slot| slot.as_ref().is_some_and(|i| is_same(i, item)))
                .and_then(Option::take)
        };
        match removed {
            Some(removed) => {
                self.item_removed.emit(removed);
                true
            }
            None => false,
        }
    }

    fn ensure_group(&self, group_index: usize) -> NodeId {
        let mut state = self.state.write();
        while state.groups.len() <= group_index {
            let list = self.ctx.surface.create_element("ul");
            if let Err(err) = self.ctx.surface.append_child(self.element, list) {
                tracing::warn!(target: targets::MENU, error = %err, "could not attach group list");
            }
            state.groups.push(Vec::new());
            state.group_lists.push(list);
        }
        state.group_lists[group_index]
    }

    fn subscribe(&self, item: &Arc<MenuItem>) -> Subscription {
        let events = item.events();
        let weak_item = Arc::downgrade(item);

        let menu = self.this.clone();
        let focused = weak_item.clone();
        let focus = events.focus.connect(move |_| {
            if let Some(menu) = menu.upgrade() {
                menu.state.write().active_item = Some(focused.clone());
            }
        });

        let menu = self.this.clone();
        let blurred = weak_item.clone();
        let blur = events.blur.connect(move |_| {
            if let Some(menu) = menu.upgrade() {
                let mut state = menu.state.write();
                if state.active_item.as_ref().is_some_and(|a| a.ptr_eq(&blurred)) {
                    state.active_item = None;
                }
            }
        });

        let menu = self.this.clone();
        let destroyed = weak_item.clone();
        let destroy = events.destroy.connect(move |_| {
            if let (Some(menu), Some(item)) = (menu.upgrade(), destroyed.upgrade()) {
                menu.vacate(&item);
                menu.state
                    .write()
                    .subscriptions
                    .retain(|s| !s.item.ptr_eq(&destroyed));
            }
        });

        Subscription {
            item: weak_item,
            focus,
            blur,
            destroy,
        }
    }
}

impl MenuContainer for Menu {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn element(&self) -> NodeId {
        self.element
    }

    fn item_groups(&self) -> Vec<Vec<Option<Arc<MenuItem>>>> {
        self.state.read().groups.clone()
    }

    fn lazy_load(&self) -> bool {
        self.state.read().lazy_load
    }

    fn set_lazy_load(&self, lazy_load: bool) {
        self.state.write().lazy_load = lazy_load;
    }

    fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    fn active_item(&self) -> Option<Arc<MenuItem>> {
        self.state.read().active_item.as_ref().and_then(Weak::upgrade)
    }

    fn set_active_item(&self, item: Option<&Arc<MenuItem>>) {
        self.state.write().active_item = item.map(Arc::downgrade);
    }

    fn add_item_to_group(&self, item: Arc<MenuItem>, group_index: usize) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let list = self.ensure_group(group_index);
        let index = {
            let mut state = self.state.write();
            let group = &mut state.groups[group_index];
            group.push(Some(item.clone()));
            group.len() - 1
        };

        item.set_position(group_index, index);
        let container: Arc<dyn MenuContainer> = this;
        item.set_parent(Some(&container));

        let root = item.element();
        if self.ctx.surface.parent(root) != Some(list) {
            if let Err(err) = self.ctx.surface.append_child(list, root) {
                tracing::warn!(target: targets::MENU, error = %err, "could not attach item");
            }
        }

        let subscription = self.subscribe(&item);
        self.state.write().subscriptions.push(subscription);
        tracing::trace!(target: targets::MENU, menu = %self.id, group_index, index, "item added");
        self.item_added.emit(item);
    }

    fn parent_item(&self) -> Option<Arc<MenuItem>> {
        self.state.read().parent_item.as_ref().and_then(Weak::upgrade)
    }

    fn set_parent_item(&self, item: Option<&Arc<MenuItem>>) {
        self.state.write().parent_item = item.map(Arc::downgrade);
    }

    fn destroy(&self) {
        let items: Vec<Arc<MenuItem>> = {
            let state = self.state.read();
            state.groups.iter().flatten().flatten().cloned().collect()
        };
        tracing::debug!(target: targets::MENU, menu = %self.id, count = items.len(), "destroying menu");

        for item in &items {
            item.destroy();
        }
        {
            let mut state = self.state.write();
            for slot in state.groups.iter_mut().flatten() {
                *slot = None;
            }
            state.subscriptions.clear();
            state.active_item = None;
        }

        if let Some(parent) = self.ctx.surface.parent(self.element) {
            if let Err(err) = self.ctx.surface.remove_child(parent, self.element) {
                tracing::warn!(target: targets::MENU, error = %err, "could not detach menu");
            }
        }
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("items", &self.item_count())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Menu: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MemorySurface, Surface};
    use crate::value::ItemValue;

    fn context() -> (Arc<MemorySurface>, ItemContext) {
        let surface = Arc::new(MemorySurface::new());
        let ctx = ItemContext::new(surface.clone());
        (surface, ctx)
    }

    fn item(ctx: &ItemContext, text: &str) -> Arc<MenuItem> {
        MenuItem::new(ctx.clone(), text, ItemConfig::new()).unwrap()
    }

    #[test]
    fn test_add_item_assigns_position_and_parent() {
        let (surface, ctx) = context();
        let menu = Menu::new(ctx.clone(), "file");
        let open = item(&ctx, "Open");
        let quit = item(&ctx, "Quit");

        menu.add_item(open.clone());
        menu.add_item_to_group(quit.clone(), 2);

        assert_eq!(menu.group_count(), 3);
        assert_eq!(open.group_index(), Some(0));
        assert_eq!(open.index(), Some(0));
        assert_eq!(quit.group_index(), Some(2));
        assert_eq!(quit.index(), Some(0));
        assert!(open.parent().is_some());

        let lists = surface.children(menu.element());
        assert_eq!(lists.len(), 3);
        assert_eq!(surface.parent(quit.element()), Some(lists[2]));
        assert_eq!(surface.attribute(menu.element(), "id").as_deref(), Some("file"));
    }

    #[test]
    fn test_remove_item_leaves_empty_slot() {
        let (surface, ctx) = context();
        let menu = Menu::new(ctx.clone(), "edit");
        let cut = item(&ctx, "Cut");
        let copy = item(&ctx, "Copy");
        menu.add_item(cut.clone());
        menu.add_item(copy.clone());

        assert!(menu.remove_item(&cut));
        assert!(!menu.remove_item(&cut));
        assert!(menu.item_at(0, 0).is_none());
        assert!(menu.item_at(0, 1).is_some());
        assert_eq!(menu.item_count(), 1);
        assert!(cut.parent().is_none());
        assert_eq!(surface.parent(cut.element()), None);
        assert_eq!(cut.events().focus.connection_count(), 0);
    }

    #[test]
    fn test_destroyed_item_vacates_its_slot() {
        let (_, ctx) = context();
        let menu = Menu::new(ctx.clone(), "view");
        let zoom = item(&ctx, "Zoom");
        menu.add_item(zoom.clone());

        zoom.destroy();
        assert_eq!(menu.item_count(), 0);
        let groups = menu.item_groups();
        assert_eq!(groups.len(), 1);
        assert!(groups[0][0].is_none());
    }

    #[test]
    fn test_focus_tracks_active_item() {
        let (_, ctx) = context();
        let menu = Menu::new(ctx.clone(), "go");
        let back = item(&ctx, "Back");
        let forward = item(&ctx, "Forward");
        menu.add_item(back.clone());
        menu.add_item(forward.clone());

        back.focus();
        assert!(menu.active_item().is_some_and(|a| Arc::ptr_eq(&a, &back)));

        forward.focus();
        assert!(menu.active_item().is_some_and(|a| Arc::ptr_eq(&a, &forward)));

        forward.blur();
        assert!(menu.active_item().is_none());
    }

    #[test]
    fn test_build_from_item_data() {
        let (_, ctx) = context();
        let config = SubmenuConfig {
            lazy_load: true,
            item_data: vec![
                ItemData::new("One"),
                ItemData::new("Two").with("disabled", true),
            ],
            parent: None,
        };
        let menu = Menu::build(ctx, MenuSource::Id("numbers".into()), config).unwrap();

        assert!(menu.lazy_load());
        assert_eq!(menu.item_count(), 2);
        let two = menu.item_at(0, 1).unwrap();
        assert_eq!(two.text(), "Two");
        assert!(two.is_disabled());
    }

    #[test]
    fn test_build_from_div_markup() {
        let (surface, ctx) = context();
        let div = surface.create_element("div");
        for labels in [["Undo", "Redo"].as_slice(), ["Find"].as_slice()] {
            let ul = surface.create_element("ul");
            surface.append_child(div, ul).unwrap();
            for label in labels {
                let li = surface.create_element("li");
                let text = surface.create_text(label);
                surface.append_child(li, text).unwrap();
                surface.append_child(ul, li).unwrap();
            }
        }

        let menu = Menu::build(ctx, MenuSource::Node(div), SubmenuConfig::default()).unwrap();
        assert_eq!(menu.element(), div);
        assert!(menu.id().starts_with("menu-"));
        assert_eq!(menu.group_count(), 2);
        assert_eq!(menu.item_at(0, 1).map(|i| i.text()).as_deref(), Some("Redo"));
        assert_eq!(menu.item_at(1, 0).map(|i| i.text()).as_deref(), Some("Find"));
        assert_eq!(surface.children(surface.children(div)[0]).len(), 2);
    }

    #[test]
    fn test_build_rejects_non_div_node() {
        let (surface, ctx) = context();
        let span = surface.create_element("span");
        let result = Menu::build(ctx, MenuSource::Node(span), SubmenuConfig::default());
        assert!(matches!(result, Err(MenuError::UnsupportedSource { .. })));
    }

    #[test]
    fn test_destroy_detaches_everything() {
        let (surface, ctx) = context();
        let host = surface.create_element("body");
        let menu = Menu::new(ctx.clone(), "tools");
        surface.append_child(host, menu.element()).unwrap();
        let a = item(&ctx, "A");
        let b = item(&ctx, "B");
        menu.add_item(a.clone());
        menu.add_item(b.clone());

        let removed = Arc::new(parking_lot::Mutex::new(0));
        let counter = removed.clone();
        menu.item_removed.connect(move |_| *counter.lock() += 1);

        menu.destroy();
        assert_eq!(menu.item_count(), 0);
        assert_eq!(*removed.lock(), 2);
        assert_eq!(surface.parent(menu.element()), None);
        assert_eq!(surface.parent(a.element()), None);
    }

    #[test]
    fn test_hidden_menu_reports_invisible() {
        let (surface, ctx) = context();
        let menu = Menu::new(ctx, "hidden");
        menu.set_visible(false);
        assert!(!menu.is_visible());
        assert!(surface.is_hidden(menu.element()));
        assert_eq!(ItemValue::from(menu.clone()), ItemValue::from(menu));
    }
}
