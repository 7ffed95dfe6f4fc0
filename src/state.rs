//! The observable state container.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::{Result, StateError};
use crate::subscribers::{Listener, SubscriberRegistry};

/// In-memory observable state container.
///
/// Holds a flat set of named properties and notifies registered
/// listeners synchronously when an [`update`](ObservableState::update)
/// touches them. Two kinds of interest can be registered:
///
/// - **Per-property** listeners ([`subscribe`](ObservableState::subscribe)):
///   any number per property, unique by `Arc` identity, invoked once
///   for each update batch that contains that property.
/// - **A wildcard** listener ([`subscribe_all`](ObservableState::subscribe_all)):
///   a single slot, invoked exactly once per `update` call after all
///   per-property listeners, regardless of how many properties the
///   batch touched. Registering a new wildcard replaces the old one.
///
/// Property values are [`serde_json::Value`] and are opaque to the
/// container. Notification is fully synchronous: `update` returns only
/// after every relevant listener has run. A panicking listener unwinds
/// out of `update` and skips the listeners not yet invoked; the
/// container itself stays consistent (the property merge has already
/// happened, and no lock is held during dispatch).
///
/// Listeners receive `&ObservableState` and may freely read properties
/// or mutate subscriptions; the dispatch pass works from a snapshot, so
/// mid-pass subscription changes take effect from the next `update`.
pub struct ObservableState {
    inner: RwLock<Inner>,
}

struct Inner {
    /// Current property values.
    properties: HashMap<String, Value>,
    /// Per-property channels + wildcard slot.
    subscribers: SubscriberRegistry,
}

impl ObservableState {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::with_initial(HashMap::new())
    }

    /// Create a container from initial properties.
    ///
    /// Each initial property gets an empty subscriber channel
    /// pre-registered for its name.
    pub fn with_initial(initial: HashMap<String, Value>) -> Self {
        let mut subscribers = SubscriberRegistry::new();
        for name in initial.keys() {
            subscribers.ensure_channel(name);
        }
        Self {
            inner: RwLock::new(Inner {
                properties: initial,
                subscribers,
            }),
        }
    }

    // --- Mutation ---

    /// Apply a batch of property changes and notify listeners.
    ///
    /// Every entry is shallow-merged into the current properties,
    /// overwriting existing values and creating previously-unseen
    /// properties as needed. Then, synchronously:
    ///
    /// 1. For each property in the batch that has a channel, every
    ///    listener in that channel is invoked once with `&self`.
    /// 2. The wildcard listener, if registered, is invoked exactly once
    ///    (even for an empty batch).
    ///
    /// Listener lists are snapshotted before the first invocation, so a
    /// listener that subscribes or unsubscribes during the pass does
    /// not affect the pass in progress.
    pub fn update(&self, new_state: HashMap<String, Value>) {
        let (per_property, wildcard) = {
            let mut inner = self.inner.write();
            trace!(properties = new_state.len(), "applying update batch");

            let mut per_property: Vec<Listener> = Vec::new();
            for (name, value) in new_state {
                if let Some(snapshot) = inner.subscribers.snapshot_channel(&name) {
                    per_property.extend(snapshot);
                }
                inner.properties.insert(name, value);
            }
            (per_property, inner.subscribers.snapshot_wildcard())
        };

        // Dispatch without the lock held; listeners may re-enter.
        trace!(
            listeners = per_property.len(),
            wildcard = wildcard.is_some(),
            "notifying subscribers"
        );
        for listener in &per_property {
            listener(self);
        }
        if let Some(listener) = wildcard {
            listener(self);
        }
    }

    // --- Subscriptions ---

    /// Register a listener for a property, creating its channel if
    /// absent. Subscribing the same `Arc` twice is a no-op the second
    /// time; the property need not exist yet.
    pub fn subscribe(&self, property: &str, listener: Listener) {
        let added = self.inner.write().subscribers.register(property, listener);
        if added {
            debug!(property, "subscribed listener");
        }
    }

    /// Register the wildcard listener, invoked once per `update` call.
    ///
    /// The wildcard is a single slot: a second call replaces the first
    /// listener rather than adding a second one.
    pub fn subscribe_all(&self, listener: Listener) {
        let replaced = self.inner.write().subscribers.register_wildcard(listener);
        if replaced {
            debug!("replaced wildcard listener");
        } else {
            debug!("subscribed wildcard listener");
        }
    }

    /// Remove a listener from a property's channel. Unsubscribing a
    /// listener (or property) that was never registered is silently a
    /// no-op.
    pub fn unsubscribe(&self, property: &str, listener: &Listener) {
        let removed = self.inner.write().subscribers.remove(property, listener);
        if removed {
            debug!(property, "unsubscribed listener");
        }
    }

    /// Clear the wildcard slot, whatever listener occupies it.
    ///
    /// Counterpart to the single-slot wildcard design: there is no
    /// "remove this particular wildcard listener" — clearing is
    /// unconditional.
    pub fn unsubscribe_all(&self) {
        if self.inner.write().subscribers.clear_wildcard() {
            debug!("cleared wildcard listener");
        }
    }

    // --- Reads ---

    /// Current value of a property, if present.
    pub fn get(&self, property: &str) -> Option<Value> {
        self.inner.read().properties.get(property).cloned()
    }

    /// Typed view of a property's current value.
    pub fn get_as<T: DeserializeOwned>(&self, property: &str) -> Result<T> {
        let value = self
            .get(property)
            .ok_or_else(|| StateError::PropertyNotFound(property.to_string()))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Whether a property currently exists.
    pub fn contains(&self, property: &str) -> bool {
        self.inner.read().properties.contains_key(property)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.inner.read().properties.len()
    }

    /// Whether the container holds no properties.
    pub fn is_empty(&self) -> bool {
        self.inner.read().properties.is_empty()
    }

    /// Snapshot of all current properties.
    pub fn properties(&self) -> HashMap<String, Value> {
        self.inner.read().properties.clone()
    }

    // --- Introspection ---

    /// Number of listeners registered for a property.
    pub fn subscriber_count(&self, property: &str) -> usize {
        self.inner.read().subscribers.channel_len(property)
    }

    /// Whether a wildcard listener is registered.
    pub fn has_wildcard(&self) -> bool {
        self.inner.read().subscribers.has_wildcard()
    }
}

impl Default for ObservableState {
    fn default() -> Self {
        Self::new()
    }
}
