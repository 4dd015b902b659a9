//! Keyboard-style traversal between sibling items.

use std::sync::Arc;

use horizon_menu_core::logging::targets;

use super::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Previous,
}

impl MenuItem {
    /// The next enabled, visible item in the parent menu.
    ///
    /// The search runs through the current group, then the following groups,
    /// wrapping from the last group to the first and skipping empty slots,
    /// disabled items and hidden items. If every other item is skipped the
    /// search comes back around to this item, which is returned when it is
    /// itself enabled and visible.
    ///
    /// Returns `None` for an unattached item or when no slot qualifies.
    pub fn next_enabled_sibling(&self) -> Option<Arc<MenuItem>> {
        self.enabled_sibling(Direction::Next)
    }

    /// The previous enabled, visible item in the parent menu.
    ///
    /// Mirrors [`next_enabled_sibling`](Self::next_enabled_sibling), wrapping
    /// from the first group to the last.
    pub fn previous_enabled_sibling(&self) -> Option<Arc<MenuItem>> {
        self.enabled_sibling(Direction::Previous)
    }

    fn enabled_sibling(&self, direction: Direction) -> Option<Arc<MenuItem>> {
        let parent = self.parent()?;
        let position = self.position()?;
        let groups = parent.item_groups();

        let slots: Vec<(usize, usize)> = groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| (0..group.len()).map(move |i| (g, i)))
            .collect();
        let total = slots.len();
        let start = slots
            .iter()
            .position(|&slot| slot == (position.group_index, position.index))?;

        // Each slot is visited at most once; the last step lands back on `start`.
        for step in 1..=total {
            let k = match direction {
                Direction::Next => (start + step) % total,
                Direction::Previous => (start + total - step % total) % total,
            };
            let (g, i) = slots[k];
            let Some(candidate) = &groups[g][i] else {
                continue;
            };
            if candidate.is_disabled() || candidate.is_hidden() {
                continue;
            }
            return Some(candidate.clone());
        }

        tracing::trace!(target: targets::NAVIGATE, ?direction, "no enabled sibling");
        None
    }
}
