//! Menu items.
//!
//! A [`MenuItem`] is one selectable entry of a menu. Its state lives in a
//! [`ConfigStore`]; every change flows through the store to a handler in
//! [`sync`] that brings the item's nodes on the [`Surface`] in line.
//!
//! # Construction
//!
//! Construction normalizes the source, registers the item's properties while
//! the store is deferring, applies the source's attributes and the caller's
//! overrides, and finally flushes the queue. Handlers therefore only ever
//! run against a fully built item, once per property, in registration order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_menu::{ItemConfig, ItemContext, MemorySurface, Menu, MenuContainer, MenuItem};
//!
//! let surface = Arc::new(MemorySurface::new());
//! let ctx = ItemContext::new(surface.clone());
//!
//! let menu = Menu::new(ctx.clone(), "file");
//! let save = MenuItem::new(ctx, "Save", ItemConfig::new().set("checked", true)).unwrap();
//! menu.add_item(save.clone());
//!
//! save.set_property("disabled", true);
//! assert!(!save.is_selected());
//! assert!(save.check_mark().is_some());
//! ```

mod compose;
mod events;
mod navigate;
mod sync;

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_menu_core::logging::{span_names, targets};
use horizon_menu_core::{ConfigStore, PropertySpec, Transition};
use parking_lot::RwLock;

use crate::assets::ItemAssets;
use crate::error::Result;
use crate::menu::{DefaultMenuFactory, MenuContainer, MenuFactory};
use crate::source::{self, ItemSource};
use crate::surface::{NodeId, Surface};
use crate::value::{validators, ItemValue};

pub use events::ItemEvents;

/// Collaborators injected into every item.
#[derive(Clone)]
pub struct ItemContext {
    /// Where the item's nodes live.
    pub surface: Arc<dyn Surface>,
    /// Builds submenus and their items.
    pub factory: Arc<dyn MenuFactory>,
    /// Icons, alt texts and class names.
    pub assets: Arc<ItemAssets>,
}

impl ItemContext {
    /// A context with the default factory and default assets.
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            factory: Arc::new(DefaultMenuFactory),
            assets: Arc::new(ItemAssets::default()),
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn MenuFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_assets(mut self, assets: ItemAssets) -> Self {
        self.assets = Arc::new(assets);
        self
    }
}

impl fmt::Debug for ItemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemContext")
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

/// Overrides applied to a new item after its source.
#[derive(Clone, Default)]
pub struct ItemConfig {
    parent: Option<Arc<dyn MenuContainer>>,
    values: Vec<(String, ItemValue)>,
}

impl ItemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the item to `parent` before its handlers run, so a submenu
    /// inherits the parent's lazy-load flag.
    pub fn parent(mut self, parent: Arc<dyn MenuContainer>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Override one property.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Override several properties, in order.
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (S, ItemValue)>,
        S: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }
}

impl fmt::Debug for ItemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemConfig")
            .field("has_parent", &self.parent.is_some())
            .field("values", &self.values)
            .finish()
    }
}

/// Where an item sits in its parent's groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    pub group_index: usize,
    pub index: usize,
}

/// Nodes owned by the item.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemParts {
    pub(crate) root: NodeId,
    pub(crate) anchor: NodeId,
    pub(crate) text: NodeId,
    pub(crate) help_text: Option<NodeId>,
    pub(crate) check_mark: Option<NodeId>,
    pub(crate) submenu_indicator: Option<NodeId>,
}

/// One selectable entry of a menu.
pub struct MenuItem {
    ctx: ItemContext,
    config: ConfigStore<MenuItem, ItemValue>,
    parts: RwLock<ItemParts>,
    submenu: RwLock<Option<Arc<dyn MenuContainer>>>,
    position: RwLock<Option<ItemPosition>>,
    parent: RwLock<Option<Weak<dyn MenuContainer>>>,
    source_node: Option<NodeId>,
    this: Weak<MenuItem>,
    events: ItemEvents,
}

impl MenuItem {
    /// Build an item from text or a source node.
    ///
    /// Fails only if the source cannot be turned into an item.
    pub fn new(
        ctx: ItemContext,
        source: impl Into<ItemSource>,
        config: ItemConfig,
    ) -> Result<Arc<Self>> {
        let _span = tracing::debug_span!(target: targets::ITEM, span_names::ITEM_INIT).entered();
        let normalized = source::normalize(ctx.surface.as_ref(), &source.into())?;

        let item = Arc::new_cyclic(|this| Self {
            ctx,
            config: ConfigStore::new(),
            parts: RwLock::new(ItemParts {
                root: normalized.root,
                anchor: normalized.anchor,
                text: normalized.text,
                help_text: None,
                check_mark: None,
                submenu_indicator: None,
            }),
            submenu: RwLock::new(None),
            position: RwLock::new(None),
            parent: RwLock::new(None),
            source_node: normalized.kind.node(),
            this: this.clone(),
            events: ItemEvents::new(),
        });

        item.config.defer_events();
        item.init_default_config();

        if normalized.silent {
            for (name, value) in normalized.attributes.iter() {
                item.config.set_property(&item, name, value.clone(), true);
            }
        } else {
            if let Some(text) = normalized.attributes.get("text") {
                item.config.set_property(&item, "text", text.clone(), false);
            }
            item.config.refire_event(&item, "url");
        }

        if let Some(parent) = &config.parent {
            item.set_parent(Some(parent));
        }
        if let Some(subtree) = normalized.subtree {
            compose::compose_submenu(&item, subtree);
        }

        item.ctx
            .surface
            .add_class(&[normalized.root], &item.ctx.assets.css_class_name);
        item.config.apply_config(&*item, config.values);
        item.config.fire_queue(&item);

        tracing::trace!(target: targets::ITEM, text = %item.text(), "item initialized");
        Ok(item)
    }

    fn init_default_config(&self) {
        let config = &self.config;

        config.add_property(
            "text",
            PropertySpec::new(ItemValue::from(""))
                .validator(validators::is_text)
                .handler(sync::text)
                .suppress_event(true),
        );
        config.add_property(
            "helptext",
            PropertySpec::new(ItemValue::Null)
                .validator(validators::helptext)
                .handler(sync::help_text),
        );
        config.add_property(
            "url",
            PropertySpec::new(ItemValue::from("#"))
                .validator(validators::text_or_null)
                .handler(sync::url)
                .suppress_event(true),
        );
        config.add_property(
            "target",
            PropertySpec::new(ItemValue::Null)
                .validator(validators::text_or_null)
                .handler(sync::target)
                .suppress_event(true),
        );
        for name in ["emphasis", "strongemphasis"] {
            config.add_property(
                name,
                PropertySpec::new(ItemValue::Bool(false))
                    .validator(validators::is_bool)
                    .handler(sync::emphasis)
                    .suppress_event(true),
            );
        }
        config.add_property(
            "checked",
            PropertySpec::new(ItemValue::Bool(false))
                .validator(validators::is_bool)
                .handler(sync::checked)
                .suppress_event(true)
                .supersedes(&["disabled"]),
        );
        config.add_property(
            "disabled",
            PropertySpec::new(ItemValue::Bool(false))
                .validator(validators::is_bool)
                .handler(sync::disabled)
                .suppress_event(true),
        );
        config.add_property(
            "selected",
            PropertySpec::new(ItemValue::Bool(false))
                .validator(validators::is_bool)
                .handler(sync::selected)
                .suppress_event(true),
        );
        config.add_property(
            "submenu",
            PropertySpec::new(ItemValue::Null)
                .validator(validators::submenu)
                .handler(sync::submenu),
        );

        let is_true: fn(&ItemValue) -> bool = |v| v.as_bool() == Some(true);
        config.add_transition(Transition::Force {
            trigger: "disabled",
            when: is_true,
            target: "selected",
            value: ItemValue::Bool(false),
        });
        config.add_transition(Transition::Force {
            trigger: "emphasis",
            when: is_true,
            target: "strongemphasis",
            value: ItemValue::Bool(false),
        });
        config.add_transition(Transition::Force {
            trigger: "strongemphasis",
            when: is_true,
            target: "emphasis",
            value: ItemValue::Bool(false),
        });
        config.add_transition(Transition::RejectWhile {
            property: "selected",
            when: is_true,
            guard: "disabled",
            guard_when: is_true,
        });
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The item's configuration store.
    pub fn config(&self) -> &ConfigStore<MenuItem, ItemValue> {
        &self.config
    }

    /// Current value of a property, or `None` if it is not registered.
    pub fn get_property(&self, name: &str) -> Option<ItemValue> {
        self.config.get_property(name)
    }

    /// Change a property and run its handler.
    ///
    /// Returns `false` if the write was rejected; the item is then unchanged.
    pub fn set_property(&self, name: &str, value: impl Into<ItemValue>) -> bool {
        self.config.set_property(self, name, value.into(), false)
    }

    /// Change a property without running its handler.
    pub fn set_property_silent(&self, name: &str, value: impl Into<ItemValue>) -> bool {
        self.config.set_property(self, name, value.into(), true)
    }

    /// Run a property's handler again with its current value.
    pub fn refire_event(&self, name: &str) -> bool {
        self.config.refire_event(self, name)
    }

    fn flag(&self, name: &str) -> bool {
        self.config
            .get_property(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn text(&self) -> String {
        self.config
            .get_property("text")
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }

    /// The link target, `"#"` when unset.
    pub fn url(&self) -> String {
        match self.config.get_property("url") {
            Some(ItemValue::Text(url)) if !url.is_empty() => url,
            _ => "#".to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.flag("disabled")
    }

    pub fn is_selected(&self) -> bool {
        self.flag("selected")
    }

    pub fn is_checked(&self) -> bool {
        self.flag("checked")
    }

    pub fn has_emphasis(&self) -> bool {
        self.flag("emphasis")
    }

    pub fn has_strong_emphasis(&self) -> bool {
        self.flag("strongemphasis")
    }

    /// The attached submenu.
    pub fn submenu(&self) -> Option<Arc<dyn MenuContainer>> {
        self.submenu.read().clone()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn context(&self) -> &ItemContext {
        &self.ctx
    }

    pub fn events(&self) -> &ItemEvents {
        &self.events
    }

    pub(crate) fn parts(&self) -> ItemParts {
        *self.parts.read()
    }

    pub(crate) fn update_parts(&self, update: impl FnOnce(&mut ItemParts)) {
        update(&mut self.parts.write());
    }

    pub(crate) fn set_submenu_ref(&self, submenu: Option<Arc<dyn MenuContainer>>) -> Option<Arc<dyn MenuContainer>> {
        std::mem::replace(&mut *self.submenu.write(), submenu)
    }

    /// A strong handle to this item.
    pub(crate) fn handle(&self) -> Option<Arc<MenuItem>> {
        self.this.upgrade()
    }

    /// The item's root `li`.
    pub fn element(&self) -> NodeId {
        self.parts.read().root
    }

    pub fn anchor(&self) -> NodeId {
        self.parts.read().anchor
    }

    pub fn text_node(&self) -> NodeId {
        self.parts.read().text
    }

    pub fn help_text_node(&self) -> Option<NodeId> {
        self.parts.read().help_text
    }

    pub fn check_mark(&self) -> Option<NodeId> {
        self.parts.read().check_mark
    }

    pub fn submenu_indicator(&self) -> Option<NodeId> {
        self.parts.read().submenu_indicator
    }

    /// The node the item was built from, or `None` for text sources.
    pub fn source_node(&self) -> Option<NodeId> {
        self.source_node
    }

    /// The owning container.
    pub fn parent(&self) -> Option<Arc<dyn MenuContainer>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    /// Set by the owning container.
    pub fn set_parent(&self, parent: Option<&Arc<dyn MenuContainer>>) {
        *self.parent.write() = parent.map(Arc::downgrade);
        if parent.is_none() {
            *self.position.write() = None;
        }
    }

    pub fn position(&self) -> Option<ItemPosition> {
        *self.position.read()
    }

    /// Set by the owning container.
    pub fn set_position(&self, group_index: usize, index: usize) {
        *self.position.write() = Some(ItemPosition { group_index, index });
    }

    pub fn index(&self) -> Option<usize> {
        self.position().map(|p| p.index)
    }

    pub fn group_index(&self) -> Option<usize> {
        self.position().map(|p| p.group_index)
    }

    fn is_hidden(&self) -> bool {
        self.ctx.surface.is_hidden(self.element())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Move input focus to the item.
    ///
    /// Does nothing while disabled, unattached, inside a hidden menu, or
    /// hidden itself.
    pub fn focus(&self) {
        if self.is_disabled() || self.is_hidden() {
            return;
        }
        let Some(parent) = self.parent() else {
            return;
        };
        if !parent.is_visible() {
            return;
        }

        if let Some(active) = parent.active_item() {
            if !std::ptr::eq(Arc::as_ptr(&active), self) {
                active.blur();
            }
        }

        self.ctx.surface.focus(self.anchor());
        self.events.focus.emit(());
    }

    /// Remove input focus from the item.
    pub fn blur(&self) {
        if self.is_disabled() {
            return;
        }
        let Some(parent) = self.parent() else {
            return;
        };
        if !parent.is_visible() {
            return;
        }

        self.ctx.surface.blur(self.anchor());
        self.events.blur.emit(());
    }

    /// Disconnect every listener and detach the item's root.
    ///
    /// The `destroy` signal fires only if the root was attached, so calling
    /// this twice notifies once.
    pub fn destroy(&self) {
        let root = self.element();
        let surface = &self.ctx.surface;
        if !surface.contains(root) {
            return;
        }

        for signal in self.events.interaction() {
            signal.disconnect_all();
        }
        self.config.changed().disconnect_all();

        if let Some(parent) = surface.parent(root) {
            match surface.remove_child(parent, root) {
                Ok(()) => {
                    tracing::debug!(target: targets::ITEM, text = %self.text(), "item destroyed");
                    self.events.destroy.emit(());
                }
                Err(err) => {
                    tracing::warn!(target: targets::ITEM, error = %err, "could not detach item");
                }
            }
        }

        self.events.destroy.disconnect_all();
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("element", &self.element())
            .field("position", &self.position())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MenuItem: Send, Sync);
