//! Building a submenu from an item's source markup.

use horizon_menu_core::logging::targets;

use super::{ItemConfig, MenuItem};
use crate::menu::{MenuSource, SubmenuConfig};
use crate::source::ItemSource;
use crate::surface::NodeId;
use crate::value::ItemValue;

/// Scan the children of `source` for a submenu description.
///
/// A `div` child is handed to the `submenu` property as is. Otherwise the
/// `option` children become the items of a freshly built submenu, in
/// document order. When both are present the `div` wins and the options are
/// ignored.
pub(super) fn compose_submenu(item: &MenuItem, source: NodeId) {
    let surface = &item.ctx.surface;

    let mut container = None;
    let mut options = Vec::new();
    for child in surface.children(source) {
        match surface.tag_name(child).as_deref() {
            Some("div") => container = Some(child),
            Some("option") => options.push(child),
            _ => {}
        }
    }

    if let Some(container) = container {
        if !options.is_empty() {
            tracing::debug!(
                target: targets::ITEM,
                ignored = options.len(),
                "submenu container present, ignoring leaf options"
            );
        }
        item.set_property("submenu", container);
        return;
    }
    if options.is_empty() {
        return;
    }

    let ctx = &item.ctx;
    let config = SubmenuConfig {
        lazy_load: item.parent().is_some_and(|p| p.lazy_load()),
        item_data: Vec::new(),
        parent: item.handle(),
    };
    let id = surface.generate_id("menu");
    let menu = match ctx.factory.create_menu(ctx, MenuSource::Id(id), config) {
        Ok(menu) => menu,
        Err(err) => {
            tracing::warn!(target: targets::ITEM, error = %err, "could not build submenu for options");
            return;
        }
    };
    item.set_property("submenu", ItemValue::Menu(menu.clone()));

    for option in options {
        match ctx.factory.create_item(ctx, ItemSource::Node(option), ItemConfig::new()) {
            Ok(child) => menu.add_item(child),
            Err(err) => {
                tracing::warn!(target: targets::ITEM, error = %err, "skipping option");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::item::{ItemConfig, ItemContext, MenuItem};
    use crate::surface::{MemorySurface, NodeId, Surface};

    fn option(surface: &MemorySurface, parent: NodeId, label: &str) -> NodeId {
        let option = surface.create_element("option");
        let text = surface.create_text(label);
        surface.append_child(option, text).unwrap();
        surface.append_child(parent, option).unwrap();
        option
    }

    #[test]
    fn test_group_options_become_submenu_items() {
        let surface = Arc::new(MemorySurface::new());
        let ctx = ItemContext::new(surface.clone());
        let group = surface.create_element("optgroup");
        surface.set_attribute(group, "label", "Colors").unwrap();
        let red = option(&surface, group, "Red");
        option(&surface, group, "Green");
        option(&surface, group, "Blue");

        let item = MenuItem::new(ctx, group, ItemConfig::new()).unwrap();
        assert_eq!(item.text(), "Colors");
        assert_eq!(item.source_node(), Some(group));

        let submenu = item.submenu().unwrap();
        assert!(submenu.id().starts_with("menu-"));
        let labels: Vec<String> = submenu.item_groups()[0]
            .iter()
            .flatten()
            .map(|i| i.text())
            .collect();
        assert_eq!(labels, vec!["Red", "Green", "Blue"]);

        let first = submenu.item_groups()[0][0].clone().unwrap();
        assert_eq!(first.source_node(), Some(red));
        assert!(item.submenu_indicator().is_some());
    }

    #[test]
    fn test_container_takes_precedence_over_options() {
        let surface = Arc::new(MemorySurface::new());
        let ctx = ItemContext::new(surface.clone());
        let group = surface.create_element("optgroup");
        option(&surface, group, "Ignored");
        let div = surface.create_element("div");
        surface.append_child(group, div).unwrap();

        let item = MenuItem::new(ctx, group, ItemConfig::new()).unwrap();
        let submenu = item.submenu().unwrap();
        assert_eq!(submenu.element(), div);
        assert!(submenu.item_groups().iter().all(|g| g.is_empty()));
    }

    #[test]
    fn test_option_without_children_has_no_submenu() {
        let surface = Arc::new(MemorySurface::new());
        let ctx = ItemContext::new(surface.clone());
        let select = surface.create_element("select");
        let red = option(&surface, select, "Red");

        let item = MenuItem::new(ctx, red, ItemConfig::new()).unwrap();
        assert_eq!(item.text(), "Red");
        assert!(item.submenu().is_none());
        assert!(item.submenu_indicator().is_none());
    }
}
