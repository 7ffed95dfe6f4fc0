//! Subscriber registry for per-property and wildcard listeners.
//!
//! Named properties each get a channel holding any number of listeners,
//! unique by `Arc` identity and invoked in subscription order. The
//! wildcard is a single overwritable slot held separately from the
//! channel map, so a property literally named `"all"` is an ordinary
//! property with an ordinary channel.

use std::collections::HashMap;
use std::sync::Arc;

use crate::state::ObservableState;

/// A callable registered to be invoked with the container after an update.
///
/// Listeners are compared by `Arc` identity: the same allocation is the
/// same listener, regardless of what the closure does.
pub type Listener = Arc<dyn Fn(&ObservableState) + Send + Sync>;

/// Wrap a closure as a [`Listener`].
///
/// Keep the returned `Arc` (or a clone of it) if you intend to
/// unsubscribe later; removal matches on identity, not behavior.
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&ObservableState) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity comparison on the data pointer only (vtable addresses are
/// not stable across codegen units).
fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Insertion-ordered collection of listeners, unique by identity.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Listener>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Re-adding the same `Arc` is a no-op; returns
    /// whether the set changed.
    pub fn add(&mut self, listener: Listener) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove a listener by identity; returns whether it was present.
    pub fn remove(&mut self, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Clone the current listeners for dispatch outside the lock.
    pub fn snapshot(&self) -> Vec<Listener> {
        self.listeners.clone()
    }
}

/// Registry of per-property channels plus the wildcard slot.
#[derive(Default)]
pub struct SubscriberRegistry {
    /// Listener channels keyed by property name.
    channels: HashMap<String, ListenerSet>,
    /// Single-slot wildcard listener (last writer wins).
    wildcard: Option<Listener>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty channel for a property if none exists.
    pub fn ensure_channel(&mut self, property: &str) {
        if !self.channels.contains_key(property) {
            self.channels.insert(property.to_string(), ListenerSet::new());
        }
    }

    /// Register a listener for a property, creating the channel if
    /// absent. Returns whether the channel changed.
    pub fn register(&mut self, property: &str, listener: Listener) -> bool {
        self.channels
            .entry(property.to_string())
            .or_default()
            .add(listener)
    }

    /// Install the wildcard listener, replacing any previous one.
    /// Returns whether a previous wildcard was displaced.
    pub fn register_wildcard(&mut self, listener: Listener) -> bool {
        self.wildcard.replace(listener).is_some()
    }

    /// Remove a listener from a property's channel. No-op if the
    /// channel or the listener is absent.
    pub fn remove(&mut self, property: &str, listener: &Listener) -> bool {
        match self.channels.get_mut(property) {
            Some(set) => set.remove(listener),
            None => false,
        }
    }

    /// Clear the wildcard slot unconditionally. Returns whether a
    /// wildcard was registered.
    pub fn clear_wildcard(&mut self) -> bool {
        self.wildcard.take().is_some()
    }

    /// Number of listeners in a property's channel (0 if no channel).
    pub fn channel_len(&self, property: &str) -> usize {
        self.channels.get(property).map_or(0, ListenerSet::len)
    }

    /// Whether the property has a channel (possibly empty).
    pub fn has_channel(&self, property: &str) -> bool {
        self.channels.contains_key(property)
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Snapshot a channel's listeners for dispatch; `None` if the
    /// property has no channel.
    pub fn snapshot_channel(&self, property: &str) -> Option<Vec<Listener>> {
        self.channels.get(property).map(ListenerSet::snapshot)
    }

    /// Snapshot the wildcard listener for dispatch.
    pub fn snapshot_wildcard(&self) -> Option<Listener> {
        self.wildcard.clone()
    }
}
