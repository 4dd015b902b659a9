//! Lifecycle and input notifications of a menu item.

use horizon_menu_core::{Signal, SignalEmitter};

/// The signals every [`MenuItem`](crate::MenuItem) exposes.
///
/// Input signals are emitted by whatever maps raw input onto items; the item
/// itself emits `focus`, `blur` and `destroy`.
pub struct ItemEvents {
    /// The item's root was detached by [`MenuItem::destroy`](crate::MenuItem::destroy).
    pub destroy: Signal<()>,
    pub mouse_over: Signal<()>,
    pub mouse_out: Signal<()>,
    pub mouse_down: Signal<()>,
    pub mouse_up: Signal<()>,
    pub click: Signal<()>,
    pub key_press: Signal<()>,
    pub key_down: Signal<()>,
    pub key_up: Signal<()>,
    pub focus: Signal<()>,
    pub blur: Signal<()>,
}

impl Default for ItemEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemEvents {
    pub fn new() -> Self {
        Self {
            destroy: Signal::named("destroyEvent"),
            mouse_over: Signal::named("mouseOverEvent"),
            mouse_out: Signal::named("mouseOutEvent"),
            mouse_down: Signal::named("mouseDownEvent"),
            mouse_up: Signal::named("mouseUpEvent"),
            click: Signal::named("clickEvent"),
            key_press: Signal::named("keyPressEvent"),
            key_down: Signal::named("keyDownEvent"),
            key_up: Signal::named("keyUpEvent"),
            focus: Signal::named("focusEvent"),
            blur: Signal::named("blurEvent"),
        }
    }

    /// Every signal except `destroy`, which is torn down last.
    pub(crate) fn interaction(&self) -> [&dyn SignalEmitter; 10] {
        [
            &self.mouse_over,
            &self.mouse_out,
            &self.mouse_down,
            &self.mouse_up,
            &self.click,
            &self.key_press,
            &self.key_down,
            &self.key_up,
            &self.focus,
            &self.blur,
        ]
    }

    /// All eleven signals, `destroy` first.
    pub fn all(&self) -> [&dyn SignalEmitter; 11] {
        let [a, b, c, d, e, f, g, h, i, j] = self.interaction();
        [&self.destroy, a, b, c, d, e, f, g, h, i, j]
    }

    /// Total connections across all signals.
    pub fn connection_count(&self) -> usize {
        self.all().iter().map(|s| s.connection_count()).sum()
    }
}
