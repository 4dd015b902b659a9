//! Reactive configuration store.
//!
//! [`ConfigStore`] is a registry of named, validated properties. Each property
//! may carry a change handler that is invoked synchronously whenever the value
//! actually changes, with the store's owner passed in so the handler can
//! update whatever the property controls.
//!
//! # Deferred delivery
//!
//! An owner that is still being built calls [`ConfigStore::defer_events`]
//! before registering properties. While deferring, non-silent writes and
//! [`refire_event`](ConfigStore::refire_event) calls store their value and
//! queue the property instead of invoking its handler. A single
//! [`fire_queue`](ConfigStore::fire_queue) call then runs each queued handler
//! once, in registration order, against the finished owner.
//!
//! # Transitions
//!
//! Cross-property rules live in a [`Transition`] table evaluated before a write
//! is dispatched, so mutual exclusion holds structurally instead of relying on
//! every handler to write back into the store.
//!
//! # Example
//!
//! ```
//! use horizon_menu_core::{ConfigStore, PropertySpec, Transition};
//!
//! struct Lamp;
//!
//! let store = ConfigStore::<Lamp, bool>::new();
//! store.add_property("on", PropertySpec::new(false).handler(|_lamp: &Lamp, event| {
//!     println!("{} -> {}", event.name, event.value);
//! }));
//! store.add_property("broken", PropertySpec::new(false));
//! store.add_transition(Transition::Force {
//!     trigger: "broken",
//!     when: |broken: &bool| *broken,
//!     target: "on",
//!     value: false,
//! });
//!
//! let lamp = Lamp;
//! assert!(store.set_property(&lamp, "on", true, false));
//! assert!(store.set_property(&lamp, "broken", true, false));
//! assert_eq!(store.get_property("on"), Some(false));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{PropertyError, Result};
use crate::logging::{span_names, targets};
use crate::signal::Signal;

/// Arguments passed to a change handler.
#[derive(Debug)]
pub struct PropertyEvent<'a, V> {
    /// The (lower-cased) property name.
    pub name: &'a str,
    /// The property's current value.
    pub value: &'a V,
}

/// A value check run before every write.
pub type Validator<V> = fn(&V) -> bool;

type Handler<O, V> = Arc<dyn Fn(&O, &PropertyEvent<'_, V>) + Send + Sync>;

/// Registration options for a property.
///
/// Built with a chain of setters starting from [`PropertySpec::new`].
pub struct PropertySpec<O, V> {
    default: V,
    validator: Option<Validator<V>>,
    handler: Option<Handler<O, V>>,
    suppress_event: bool,
    supersedes: Vec<&'static str>,
}

impl<O, V> PropertySpec<O, V> {
    /// Start a spec with the given default value.
    pub fn new(default: V) -> Self {
        Self {
            default,
            validator: None,
            handler: None,
            suppress_event: false,
            supersedes: Vec::new(),
        }
    }

    /// Reject writes for which `validator` returns `false`.
    pub fn validator(mut self, validator: Validator<V>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Invoke `handler` whenever the value changes.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&O, &PropertyEvent<'_, V>) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// When `false` (the default), registering the property while the store is
    /// deferring queues its default so the handler runs at flush time.
    pub fn suppress_event(mut self, suppress: bool) -> Self {
        self.suppress_event = suppress;
        self
    }

    /// Properties that must be flushed after this one.
    pub fn supersedes(mut self, names: &[&'static str]) -> Self {
        self.supersedes = names.to_vec();
        self
    }
}

/// A cross-property rule evaluated before a write is dispatched.
#[derive(Clone)]
pub enum Transition<V> {
    /// When `trigger` is written with a value matching `when`, first write
    /// `value` into `target` (through the store, so its handler runs) unless
    /// `target` already holds it.
    Force {
        /// The property whose write activates the rule.
        trigger: &'static str,
        /// Predicate on the incoming value.
        when: fn(&V) -> bool,
        /// The property that is forced.
        target: &'static str,
        /// The value forced into `target`.
        value: V,
    },
    /// Refuse writes to `property` matching `when` while `guard` holds a value
    /// matching `guard_when`.
    RejectWhile {
        /// The property being guarded.
        property: &'static str,
        /// Predicate on the incoming value.
        when: fn(&V) -> bool,
        /// The property whose value blocks the write.
        guard: &'static str,
        /// Predicate on the guard's current value.
        guard_when: fn(&V) -> bool,
    },
}

impl<V> fmt::Debug for Transition<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Force { trigger, target, .. } => f
                .debug_struct("Force")
                .field("trigger", trigger)
                .field("target", target)
                .finish_non_exhaustive(),
            Self::RejectWhile { property, guard, .. } => f
                .debug_struct("RejectWhile")
                .field("property", property)
                .field("guard", guard)
                .finish_non_exhaustive(),
        }
    }
}

struct Entry<O, V> {
    name: String,
    value: V,
    default: V,
    validator: Option<Validator<V>>,
    handler: Option<Handler<O, V>>,
    supersedes: Vec<String>,
}

struct StoreState<O, V> {
    entries: Vec<Entry<O, V>>,
    by_name: HashMap<String, usize>,
    transitions: Vec<Transition<V>>,
    queue: Vec<usize>,
    deferring: bool,
}

impl<O, V> StoreState<O, V> {
    fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PropertyError::not_found(name))
    }

    fn value_of(&self, name: &str) -> Option<&V> {
        self.by_name.get(name).map(|&idx| &self.entries[idx].value)
    }

    fn enqueue(&mut self, idx: usize) {
        if !self.queue.contains(&idx) {
            self.queue.push(idx);
        }
    }

    /// Registration order, except that superseded properties follow their superseder.
    fn flush_order(&mut self) -> Vec<usize> {
        let mut order = std::mem::take(&mut self.queue);
        order.sort_unstable();

        // Each move strictly pushes a superseded entry later, so this settles
        // within entries.len()^2 passes even with careless cycles.
        let mut budget = self.entries.len() * self.entries.len() + 1;
        let mut pos = 0;
        while pos < order.len() && budget > 0 {
            let idx = order[pos];
            let mut moved = false;
            for superseded in &self.entries[idx].supersedes {
                let Some(&target) = self.by_name.get(superseded) else {
                    continue;
                };
                if let Some(target_pos) = order[..pos].iter().position(|&i| i == target) {
                    order.remove(target_pos);
                    order.insert(pos, target);
                    moved = true;
                    budget -= 1;
                    break;
                }
            }
            if moved {
                pos = pos.saturating_sub(1);
            } else {
                pos += 1;
            }
        }
        order
    }
}

/// Normalize a property name for lookup.
fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// A registry of validated, observable properties owned by an `O`.
///
/// The store never holds its internal lock while a handler runs, so handlers
/// may freely read and write other properties of the same store.
pub struct ConfigStore<O, V> {
    state: RwLock<StoreState<O, V>>,
    changed: Signal<(String, V)>,
}

impl<O, V> Default for ConfigStore<O, V>
where
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<O, V> ConfigStore<O, V>
where
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    /// Create an empty store that dispatches immediately.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                entries: Vec::new(),
                by_name: HashMap::new(),
                transitions: Vec::new(),
                queue: Vec::new(),
                deferring: false,
            }),
            changed: Signal::named("configChanged"),
        }
    }

    /// Signal fired with `(name, value)` after every dispatched change.
    pub fn changed(&self) -> &Signal<(String, V)> {
        &self.changed
    }

    /// Register a property. Registering an existing name again is ignored.
    ///
    /// Returns `true` if the property was newly registered.
    pub fn add_property(&self, name: &str, spec: PropertySpec<O, V>) -> bool {
        let name = key(name);
        let mut state = self.state.write();
        if state.by_name.contains_key(&name) {
            tracing::trace!(target: targets::CONFIG, property = %name, "property already registered");
            return false;
        }

        let idx = state.entries.len();
        state.entries.push(Entry {
            name: name.clone(),
            value: spec.default.clone(),
            default: spec.default,
            validator: spec.validator,
            handler: spec.handler,
            supersedes: spec.supersedes.iter().map(|s| key(s)).collect(),
        });
        state.by_name.insert(name, idx);
        if !spec.suppress_event && state.deferring {
            state.enqueue(idx);
        }
        true
    }

    /// Add a rule to the transition table.
    pub fn add_transition(&self, transition: Transition<V>) {
        self.state.write().transitions.push(transition);
    }

    /// Whether `name` is registered.
    pub fn has_property(&self, name: &str) -> bool {
        self.state.read().by_name.contains_key(&key(name))
    }

    /// The current value of `name`, or `None` if it is not registered.
    pub fn get_property(&self, name: &str) -> Option<V> {
        self.state.read().value_of(&key(name)).cloned()
    }

    /// The registered default of `name`.
    pub fn default_value(&self, name: &str) -> Option<V> {
        let state = self.state.read();
        state
            .by_name
            .get(&key(name))
            .map(|&idx| state.entries[idx].default.clone())
    }

    /// Registered property names, in registration order.
    pub fn property_names(&self) -> Vec<String> {
        self.state
            .read()
            .entries
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Whether writes are currently being queued.
    pub fn is_deferring(&self) -> bool {
        self.state.read().deferring
    }

    /// Names of the properties waiting for [`fire_queue`](Self::fire_queue).
    pub fn queued(&self) -> Vec<String> {
        let state = self.state.read();
        state
            .queue
            .iter()
            .map(|&idx| state.entries[idx].name.clone())
            .collect()
    }

    /// Start queueing non-silent writes until the next [`fire_queue`](Self::fire_queue).
    pub fn defer_events(&self) {
        self.state.write().deferring = true;
    }

    /// Write `value` into `name`, tolerating failure.
    ///
    /// Returns `true` if the write was accepted (including a write of the
    /// current value, which changes nothing) and `false` if the property is
    /// unknown, the validator rejected the value, or a transition rule
    /// blocked it. A rejected write leaves the value untouched and runs no
    /// handler.
    pub fn set_property(&self, owner: &O, name: &str, value: V, silent: bool) -> bool {
        match self.try_set_property(owner, name, value, silent) {
            Ok(_) => true,
            Err(err) => {
                tracing::trace!(target: targets::CONFIG, error = %err, "write ignored");
                false
            }
        }
    }

    /// Write `value` into `name`.
    ///
    /// Returns `Ok(true)` if the value changed and `Ok(false)` if it already
    /// held `value`. Unless `silent`, a change runs the property's handler
    /// (or queues it while deferring) and then fires [`changed`](Self::changed).
    pub fn try_set_property(&self, owner: &O, name: &str, value: V, silent: bool) -> Result<bool> {
        let name = key(name);
        let forced = {
            let state = self.state.read();
            let idx = state.index_of(&name)?;
            let entry = &state.entries[idx];

            if let Some(validator) = entry.validator {
                if !validator(&value) {
                    return Err(PropertyError::invalid(&name));
                }
            }

            for transition in &state.transitions {
                if let Transition::RejectWhile {
                    property,
                    when,
                    guard,
                    guard_when,
                } = transition
                {
                    if *property == name
                        && when(&value)
                        && state.value_of(guard).is_some_and(|g| guard_when(g))
                    {
                        return Err(PropertyError::blocked(&name, *guard));
                    }
                }
            }

            if entry.value == value {
                return Ok(false);
            }

            state
                .transitions
                .iter()
                .filter_map(|transition| match transition {
                    Transition::Force {
                        trigger,
                        when,
                        target,
                        value: forced,
                    } if *trigger == name && when(&value) => Some((*target, forced.clone())),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        for (target, forced) in forced {
            if self.get_property(target).as_ref() != Some(&forced) {
                tracing::trace!(target: targets::CONFIG, trigger = %name, forced = target, "applying transition");
                if let Err(err) = self.try_set_property(owner, target, forced, silent) {
                    tracing::warn!(target: targets::CONFIG, error = %err, "transition write rejected");
                }
            }
        }

        let handler = {
            let mut state = self.state.write();
            let idx = state.index_of(&name)?;
            state.entries[idx].value = value.clone();
            if silent {
                return Ok(true);
            }
            if state.deferring {
                tracing::trace!(target: targets::CONFIG, property = %name, "queued");
                state.enqueue(idx);
                return Ok(true);
            }
            state.entries[idx].handler.clone()
        };

        self.dispatch(owner, &name, handler, &value);
        self.notify_changed(name, value);
        Ok(true)
    }

    /// Run the handler of `name` with its current value without changing it.
    ///
    /// While deferring, the property is queued instead. Returns `false` if
    /// `name` is not registered.
    pub fn refire_event(&self, owner: &O, name: &str) -> bool {
        let name = key(name);
        let (handler, value) = {
            let mut state = self.state.write();
            let Ok(idx) = state.index_of(&name) else {
                return false;
            };
            if state.deferring {
                state.enqueue(idx);
                return true;
            }
            let entry = &state.entries[idx];
            (entry.handler.clone(), entry.value.clone())
        };

        self.dispatch(owner, &name, handler, &value);
        true
    }

    /// Apply several writes as non-silent [`set_property`](Self::set_property)
    /// calls, in order. Returns the number of accepted writes.
    pub fn apply_config<I, S>(&self, owner: &O, values: I) -> usize
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .filter(|(name, value)| self.set_property(owner, name.as_ref(), value.clone(), false))
            .count()
    }

    /// Stop deferring and run every queued handler once.
    ///
    /// Handlers see the value each property holds at the moment they run.
    /// Writes made by those handlers are dispatched immediately rather than
    /// queued again.
    pub fn fire_queue(&self, owner: &O) {
        let _span = tracing::trace_span!(target: targets::CONFIG, span_names::FIRE_QUEUE).entered();
        let order = {
            let mut state = self.state.write();
            state.deferring = false;
            state.flush_order()
        };
        tracing::trace!(target: targets::CONFIG, count = order.len(), "flushing queue");

        for idx in order {
            let (name, value, handler) = {
                let state = self.state.read();
                let entry = &state.entries[idx];
                (entry.name.clone(), entry.value.clone(), entry.handler.clone())
            };
            self.dispatch(owner, &name, handler, &value);
            self.notify_changed(name, value);
        }
    }

    /// Fire [`changed`](Self::changed) with the value the property holds now,
    /// which a handler may have replaced with a silent write.
    fn notify_changed(&self, name: String, dispatched: V) {
        let current = self.state.read().value_of(&name).cloned();
        self.changed.emit((name, current.unwrap_or(dispatched)));
    }

    fn dispatch(&self, owner: &O, name: &str, handler: Option<Handler<O, V>>, value: &V) {
        tracing::trace!(target: targets::CONFIG, property = name, ?value, "dispatch");
        if let Some(handler) = handler {
            handler(owner, &PropertyEvent { name, value });
        }
    }
}

impl<O, V> fmt::Debug for ConfigStore<O, V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut map = f.debug_map();
        for entry in &state.entries {
            map.entry(&entry.name, &entry.value);
        }
        map.finish()
    }
}

static_assertions::assert_impl_all!(ConfigStore<(), bool>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records handler invocations as `name=value`.
    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.lock())
        }
    }

    fn record(owner: &Recorder, event: &PropertyEvent<'_, i32>) {
        owner.log.lock().push(format!("{}={}", event.name, event.value));
    }

    fn store() -> ConfigStore<Recorder, i32> {
        let store = ConfigStore::new();
        store.add_property("a", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_property(
            "b",
            PropertySpec::new(0)
                .handler(record)
                .validator(|v: &i32| *v >= 0)
                .suppress_event(true),
        );
        store
    }

    #[test]
    fn test_set_invokes_handler_on_change() {
        let owner = Recorder::default();
        let store = store();

        assert!(store.set_property(&owner, "a", 5, false));
        assert_eq!(store.get_property("a"), Some(5));
        assert_eq!(owner.take(), vec!["a=5"]);

        // Same value: accepted, but nothing runs
        assert_eq!(store.try_set_property(&owner, "a", 5, false), Ok(false));
        assert!(owner.take().is_empty());
    }

    #[test]
    fn test_silent_set_skips_handler() {
        let owner = Recorder::default();
        let store = store();

        assert!(store.set_property(&owner, "a", 7, true));
        assert_eq!(store.get_property("a"), Some(7));
        assert!(owner.take().is_empty());
    }

    #[test]
    fn test_validator_rejects_without_side_effects() {
        let owner = Recorder::default();
        let store = store();

        assert!(!store.set_property(&owner, "b", -1, false));
        assert_eq!(
            store.try_set_property(&owner, "b", -1, false),
            Err(PropertyError::invalid("b"))
        );
        assert_eq!(store.get_property("b"), Some(0));
        assert!(owner.take().is_empty());
    }

    #[test]
    fn test_unknown_property() {
        let owner = Recorder::default();
        let store = store();

        assert!(!store.set_property(&owner, "missing", 1, false));
        assert_eq!(store.get_property("missing"), None);
        assert!(!store.refire_event(&owner, "missing"));
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let owner = Recorder::default();
        let store = store();

        assert!(store.set_property(&owner, "A", 3, false));
        assert_eq!(store.get_property("a"), Some(3));
        assert!(!store.add_property("B", PropertySpec::new(9)));
        assert_eq!(store.default_value("b"), Some(0));
    }

    #[test]
    fn test_reregistration_is_ignored() {
        let store = store();
        assert!(!store.add_property("a", PropertySpec::new(99)));
        assert_eq!(store.get_property("a"), Some(0));
        assert_eq!(store.property_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_refire_reuses_current_value() {
        let owner = Recorder::default();
        let store = store();
        store.set_property(&owner, "a", 4, true);

        assert!(store.refire_event(&owner, "a"));
        assert_eq!(owner.take(), vec!["a=4"]);
        assert_eq!(store.get_property("a"), Some(4));
    }

    #[test]
    fn test_changed_signal_follows_handler() {
        let owner = Recorder::default();
        let store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        store.changed().connect(move |(name, value)| {
            seen_clone.lock().push((name.clone(), *value));
        });

        store.set_property(&owner, "a", 1, false);
        store.set_property(&owner, "a", 2, true);
        store.refire_event(&owner, "a");

        assert_eq!(*seen.lock(), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn test_changed_signal_reports_value_after_handler() {
        struct Owner {
            store: ConfigStore<Owner, i32>,
        }

        let owner = Owner {
            store: ConfigStore::new(),
        };
        owner.store.add_property(
            "level",
            PropertySpec::new(0)
                .handler(|owner: &Owner, event| {
                    if *event.value > 10 {
                        owner.store.set_property(owner, "level", 10, true);
                    }
                })
                .suppress_event(true),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        owner.store.changed().connect(move |(_, value)| seen_clone.lock().push(*value));

        owner.store.set_property(&owner, "level", 42, false);
        assert_eq!(owner.store.get_property("level"), Some(10));
        assert_eq!(*seen.lock(), vec![10]);

        owner.store.defer_events();
        owner.store.set_property(&owner, "level", 99, false);
        owner.store.fire_queue(&owner);
        assert_eq!(*seen.lock(), vec![10, 10]);
    }

    #[test]
    fn test_deferred_writes_flush_in_registration_order() {
        let owner = Recorder::default();
        let store = ConfigStore::new();
        store.defer_events();
        store.add_property("first", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_property("second", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_property("third", PropertySpec::new(0).handler(record).suppress_event(true));

        store.set_property(&owner, "third", 3, false);
        store.set_property(&owner, "first", 1, false);
        store.set_property(&owner, "first", 11, false);
        store.refire_event(&owner, "second");

        assert!(owner.take().is_empty());
        assert_eq!(store.get_property("first"), Some(11));

        store.fire_queue(&owner);
        assert_eq!(owner.take(), vec!["first=11", "second=0", "third=3"]);
        assert!(!store.is_deferring());

        // Flushed exactly once
        store.fire_queue(&owner);
        assert!(owner.take().is_empty());
    }

    #[test]
    fn test_unsuppressed_default_is_queued() {
        let owner = Recorder::default();
        let store = ConfigStore::new();
        store.defer_events();
        store.add_property("loud", PropertySpec::new(8).handler(record));
        store.add_property("quiet", PropertySpec::new(9).handler(record).suppress_event(true));

        assert_eq!(store.queued(), vec!["loud"]);
        store.fire_queue(&owner);
        assert_eq!(owner.take(), vec!["loud=8"]);
    }

    #[test]
    fn test_superseded_property_flushes_after_superseder() {
        let owner = Recorder::default();
        let store = ConfigStore::new();
        store.defer_events();
        store.add_property("disabled", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_property(
            "checked",
            PropertySpec::new(0)
                .handler(record)
                .suppress_event(true)
                .supersedes(&["disabled"]),
        );

        store.set_property(&owner, "disabled", 1, false);
        store.set_property(&owner, "checked", 1, false);
        store.fire_queue(&owner);

        assert_eq!(owner.take(), vec!["checked=1", "disabled=1"]);
    }

    #[test]
    fn test_force_transition_runs_before_dispatch() {
        let owner = Recorder::default();
        let store = ConfigStore::new();
        store.add_property("on", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_property("off", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_transition(Transition::Force {
            trigger: "on",
            when: |v: &i32| *v == 1,
            target: "off",
            value: 0,
        });
        store.add_transition(Transition::Force {
            trigger: "off",
            when: |v: &i32| *v == 1,
            target: "on",
            value: 0,
        });

        store.set_property(&owner, "on", 1, false);
        store.set_property(&owner, "off", 1, false);

        assert_eq!(store.get_property("on"), Some(0));
        assert_eq!(store.get_property("off"), Some(1));
        assert_eq!(owner.take(), vec!["on=1", "on=0", "off=1"]);
    }

    #[test]
    fn test_reject_while_guard_holds() {
        let owner = Recorder::default();
        let store = ConfigStore::new();
        store.add_property("locked", PropertySpec::new(0).suppress_event(true));
        store.add_property("level", PropertySpec::new(0).handler(record).suppress_event(true));
        store.add_transition(Transition::RejectWhile {
            property: "level",
            when: |v: &i32| *v > 0,
            guard: "locked",
            guard_when: |v: &i32| *v == 1,
        });

        store.set_property(&owner, "locked", 1, false);
        assert_eq!(
            store.try_set_property(&owner, "level", 5, false),
            Err(PropertyError::blocked("level", "locked"))
        );
        assert_eq!(store.get_property("level"), Some(0));

        store.set_property(&owner, "locked", 0, false);
        assert!(store.set_property(&owner, "level", 5, false));
        assert_eq!(owner.take(), vec!["level=5"]);
    }

    #[test]
    fn test_handler_may_write_back_into_store() {
        struct Owner {
            store: ConfigStore<Owner, i32>,
        }

        let owner = Owner {
            store: ConfigStore::new(),
        };
        owner.store.add_property(
            "source",
            PropertySpec::new(0)
                .handler(|owner: &Owner, event| {
                    owner.store.set_property(owner, "mirror", *event.value * 2, false);
                })
                .suppress_event(true),
        );
        owner.store.add_property("mirror", PropertySpec::new(0).suppress_event(true));

        owner.store.set_property(&owner, "source", 21, false);
        assert_eq!(owner.store.get_property("mirror"), Some(42));
    }

    #[test]
    fn test_apply_config_counts_accepted() {
        let owner = Recorder::default();
        let store = store();

        let accepted = store.apply_config(&owner, [("a", 1), ("b", -5), ("nope", 2)]);
        assert_eq!(accepted, 1);
        assert_eq!(owner.take(), vec!["a=1"]);
    }
}
