//! Property handlers.
//!
//! One handler per property, each bringing the item's nodes in line with the
//! property's current value. Every handler is idempotent: running it again
//! with the same value and item state changes nothing, which is what lets
//! `checked`, `helptext` and `submenu` re-run `disabled` and `selected`
//! after they add nodes those two style.
//!
//! Cross-property writes (disable clears selection, the two emphasis kinds
//! exclude each other) happen in the store's transition table before these
//! handlers run.

use std::sync::Arc;

use horizon_menu_core::logging::targets;
use horizon_menu_core::PropertyEvent;

use super::MenuItem;
use crate::assets::{IconSet, IconVariant};
use crate::menu::{MenuContainer, MenuSource, SubmenuConfig};
use crate::surface::{NodeId, SurfaceResult};
use crate::value::ItemValue;

type Event<'a> = PropertyEvent<'a, ItemValue>;

/// Log a failed surface mutation and carry on.
fn log_failure(result: SurfaceResult<()>, action: &str) {
    if let Err(err) = result {
        tracing::warn!(target: targets::ITEM, error = %err, action, "surface update failed");
    }
}

/// Source for an icon: the cached image when it is ready, the absolute URL
/// otherwise.
fn icon_src(item: &MenuItem, set: &IconSet, variant: IconVariant) -> String {
    let url = item.ctx.assets.image_url(set.path(variant));
    match item.ctx.surface.cached_image(&url) {
        Some(src) => src,
        None => {
            tracing::warn!(target: targets::ITEM, %url, "icon not ready, using uncached url");
            url
        }
    }
}

fn preload(item: &MenuItem, set: &IconSet) {
    for path in set.paths() {
        item.ctx.surface.preload_image(&item.ctx.assets.image_url(path));
    }
}

fn set_icon(item: &MenuItem, img: NodeId, src: &str, alt: &str) {
    let surface = &item.ctx.surface;
    log_failure(surface.set_attribute(img, "src", src), "set icon src");
    log_failure(surface.set_attribute(img, "alt", alt), "set icon alt");
}

/// Re-run the handlers whose styling covers nodes that were just added.
fn refresh_state(item: &MenuItem) {
    if item.is_disabled() {
        item.refire_event("disabled");
    }
    if item.is_selected() {
        item.refire_event("selected");
    }
}

pub(super) fn text(item: &MenuItem, event: &Event<'_>) {
    if let Some(text) = event.value.as_text() {
        log_failure(
            item.ctx.surface.set_node_value(item.parts().text, text),
            "set text",
        );
    }
}

pub(super) fn url(item: &MenuItem, event: &Event<'_>) {
    if !event.value.is_truthy() {
        item.set_property_silent("url", "#");
    }
    // A disabled item keeps no href; re-enabling restores it from `url`.
    if item.is_disabled() {
        return;
    }
    log_failure(
        item.ctx
            .surface
            .set_attribute(item.parts().anchor, "href", &item.url()),
        "set href",
    );
}

pub(super) fn target(item: &MenuItem, event: &Event<'_>) {
    let anchor = item.parts().anchor;
    let surface = &item.ctx.surface;
    match event.value.as_text() {
        Some(target) if !target.is_empty() => {
            log_failure(surface.set_attribute(anchor, "target", target), "set target");
        }
        _ => log_failure(surface.remove_attribute(anchor, "target"), "remove target"),
    }
}

/// Handles both `emphasis` (`em`) and `strongemphasis` (`strong`).
pub(super) fn emphasis(item: &MenuItem, event: &Event<'_>) {
    let tag = if event.name == "strongemphasis" { "strong" } else { "em" };
    let on = event.value.as_bool() == Some(true);
    let parts = item.parts();
    let surface = &item.ctx.surface;

    if on {
        let text_parent = surface.parent(parts.text);
        if text_parent.and_then(|p| surface.tag_name(p)).as_deref() == Some(tag) {
            return;
        }
        let wrapper = surface.create_element(tag);
        log_failure(surface.append_child(wrapper, parts.text), "wrap text");
        log_failure(surface.append_child(parts.anchor, wrapper), "attach emphasis");
    } else {
        let wrappers: Vec<NodeId> = surface
            .children(parts.anchor)
            .into_iter()
            .filter(|&child| surface.tag_name(child).as_deref() == Some(tag))
            .collect();
        for wrapper in wrappers {
            if surface.parent(parts.text) == Some(wrapper) {
                log_failure(surface.append_child(parts.anchor, parts.text), "unwrap text");
            }
            surface.remove_node(wrapper);
        }
    }
}

pub(super) fn checked(item: &MenuItem, event: &Event<'_>) {
    let surface = &item.ctx.surface;
    let assets = &item.ctx.assets;
    let parts = item.parts();

    if event.value.as_bool() == Some(true) {
        if parts.check_mark.is_some() {
            return;
        }
        preload(item, &assets.checked);

        let mark = surface.create_element("img");
        let src = icon_src(item, &assets.checked, IconVariant::Normal);
        set_icon(item, mark, &src, &assets.alt.checked);

        // The submenu property may still hold its unbuilt node while queued
        // handlers are flushed.
        let before = item
            .submenu()
            .map(|menu| menu.element())
            .or_else(|| item.get_property("submenu").and_then(|v| v.as_node()))
            .filter(|&element| surface.parent(element) == Some(parts.root));
        log_failure(surface.insert_before(parts.root, mark, before), "insert check mark");

        surface.add_class(&[parts.root, mark], "checked");
        item.update_parts(|p| p.check_mark = Some(mark));
        refresh_state(item);
    } else {
        surface.remove_class(&[parts.root], "checked");
        item.update_parts(|p| p.check_mark = None);
        if let Some(mark) = parts.check_mark {
            surface.remove_node(mark);
        }
    }
}

pub(super) fn disabled(item: &MenuItem, event: &Event<'_>) {
    let disabled = event.value.as_bool() == Some(true);
    let surface = &item.ctx.surface;
    let assets = &item.ctx.assets;
    let parts = item.parts();

    let mut nodes = vec![parts.root, parts.anchor];
    nodes.extend(parts.help_text);

    if let Some(mark) = parts.check_mark.filter(|_| item.is_checked()) {
        let (variant, alt) = if disabled {
            (IconVariant::Disabled, &assets.alt.disabled_checked)
        } else {
            (IconVariant::Normal, &assets.alt.checked)
        };
        let src = icon_src(item, &assets.checked, variant);
        set_icon(item, mark, &src, alt);
    }

    let (variant, alt) = if disabled {
        log_failure(surface.remove_attribute(parts.anchor, "href"), "remove href");
        surface.add_class(&nodes, "disabled");
        (IconVariant::Disabled, &assets.alt.disabled)
    } else {
        log_failure(
            surface.set_attribute(parts.anchor, "href", &item.url()),
            "restore href",
        );
        surface.remove_class(&nodes, "disabled");
        (IconVariant::Normal, &assets.alt.collapsed)
    };

    if let Some(indicator) = parts.submenu_indicator {
        let src = icon_src(item, &assets.submenu_indicator, variant);
        set_icon(item, indicator, &src, alt);
    }
}

pub(super) fn selected(item: &MenuItem, event: &Event<'_>) {
    if item.is_disabled() {
        return;
    }
    let selected = event.value.as_bool() == Some(true);
    let surface = &item.ctx.surface;
    let assets = &item.ctx.assets;
    let parts = item.parts();

    let mut nodes = vec![parts.root, parts.anchor];
    nodes.extend(parts.help_text);
    nodes.extend(parts.submenu_indicator);

    let variant = if selected {
        IconVariant::Selected
    } else {
        IconVariant::Normal
    };

    if let Some(mark) = parts.check_mark.filter(|_| item.is_checked()) {
        let src = icon_src(item, &assets.checked, variant);
        log_failure(surface.set_attribute(mark, "src", &src), "set check mark src");
    }

    let alt = if selected {
        surface.add_class(&nodes, "selected");
        &assets.alt.expanded
    } else {
        surface.remove_class(&nodes, "selected");
        &assets.alt.collapsed
    };

    if let Some(indicator) = parts.submenu_indicator {
        let src = icon_src(item, &assets.submenu_indicator, variant);
        set_icon(item, indicator, &src, alt);
    }
}

/// Turn a submenu value into a live container.
///
/// Returns the container and whether it was built here.
fn resolve_submenu(item: &MenuItem, value: &ItemValue) -> Option<(Arc<dyn MenuContainer>, bool)> {
    let lazy_load = item.parent().is_some_and(|p| p.lazy_load());
    let (source, item_data) = match value {
        ItemValue::Menu(menu) => {
            menu.set_lazy_load(lazy_load);
            return Some((menu.clone(), false));
        }
        ItemValue::Descriptor(descriptor) => (
            MenuSource::Id(descriptor.id.clone()),
            descriptor.item_data.clone(),
        ),
        ItemValue::Node(node) => (MenuSource::Node(*node), Vec::new()),
        ItemValue::Text(id) => (MenuSource::Id(id.clone()), Vec::new()),
        ItemValue::Null | ItemValue::Bool(_) => return None,
    };

    let config = SubmenuConfig {
        lazy_load,
        item_data,
        parent: item.handle(),
    };
    match item.ctx.factory.create_menu(&item.ctx, source, config) {
        Ok(menu) => Some((menu, true)),
        Err(err) => {
            tracing::warn!(target: targets::ITEM, error = %err, "could not build submenu");
            None
        }
    }
}

pub(super) fn submenu(item: &MenuItem, event: &Event<'_>) {
    let surface = &item.ctx.surface;
    let parts = item.parts();
    let anchor_nodes = [parts.root, parts.anchor];

    if !event.value.is_truthy() {
        surface.remove_class(&anchor_nodes, "hassubmenu");
        item.update_parts(|p| p.submenu_indicator = None);
        if let Some(indicator) = parts.submenu_indicator {
            surface.remove_node(indicator);
        }
        if let Some(old) = item.set_submenu_ref(None) {
            tracing::debug!(target: targets::ITEM, submenu = %old.id(), "submenu removed");
            old.destroy();
        }
        return;
    }

    let Some((menu, built)) = resolve_submenu(item, event.value) else {
        return;
    };
    if built {
        item.set_property_silent("submenu", menu.clone());
    }
    if let Some(this) = item.handle() {
        menu.set_parent_item(Some(&this));
    }
    tracing::debug!(target: targets::ITEM, submenu = %menu.id(), "submenu attached");
    item.set_submenu_ref(Some(menu));

    if parts.submenu_indicator.is_none() {
        let assets = &item.ctx.assets;
        preload(item, &assets.submenu_indicator);

        let indicator = surface.create_element("img");
        let src = icon_src(item, &assets.submenu_indicator, IconVariant::Normal);
        set_icon(item, indicator, &src, &assets.alt.collapsed);
        log_failure(surface.append_child(parts.root, indicator), "attach indicator");

        item.update_parts(|p| p.submenu_indicator = Some(indicator));
        surface.add_class(&anchor_nodes, "hassubmenu");
        refresh_state(item);
    }
}

pub(super) fn help_text(item: &MenuItem, event: &Event<'_>) {
    let surface = &item.ctx.surface;
    let parts = item.parts();
    let anchor_nodes = [parts.root, parts.anchor];

    let remove = || {
        surface.remove_class(&anchor_nodes, "hashelptext");
        item.update_parts(|p| p.help_text = None);
        if let Some(help) = parts.help_text {
            if let Some(parent) = surface.parent(help) {
                log_failure(surface.remove_child(parent, help), "detach help text");
            }
        }
    };
    let added = || {
        surface.add_class(&anchor_nodes, "hashelptext");
        refresh_state(item);
    };

    match event.value {
        ItemValue::Node(node) => {
            let node = *node;
            match parts.help_text {
                Some(old) if old == node => {}
                Some(old) => {
                    let parent = surface.parent(old).unwrap_or(parts.root);
                    log_failure(surface.replace_child(parent, node, old), "swap help text");
                }
                None => {
                    log_failure(
                        surface.insert_before(parts.root, node, parts.submenu_indicator),
                        "insert help text",
                    );
                }
            }
            item.update_parts(|p| p.help_text = Some(node));
            added();
        }
        ItemValue::Text(text) if text.is_empty() => remove(),
        ItemValue::Text(text) => {
            let help = match parts.help_text {
                Some(help) => help,
                None => {
                    let help = surface.create_element("em");
                    log_failure(
                        surface.insert_before(parts.root, help, parts.submenu_indicator),
                        "insert help text",
                    );
                    item.update_parts(|p| p.help_text = Some(help));
                    help
                }
            };
            log_failure(surface.set_text_content(help, text), "set help text");
            added();
        }
        _ => remove(),
    }
}
