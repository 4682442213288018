// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for entity state subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching host callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::slot::InboundSlot;
use crate::state::{AttributeValue, StateChange};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback or a transport subscription, and
/// used to remove it later. IDs are unique within the issuing registry or
/// transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a subscription ID with the given value.
    ///
    /// Transports implementing [`Transport`](crate::protocol::Transport)
    /// allocate their IDs with this.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

type AttributeCallback = Arc<dyn Fn(InboundSlot, &AttributeValue) + Send + Sync>;

type AvailabilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

type AttributesCallback = Arc<dyn Fn(&Map<String, Value>) + Send + Sync>;

/// Registry of host callbacks.
///
/// Uses `parking_lot::RwLock` for interior mutability. Callbacks are cloned
/// out of the registry before they run, so a callback may register or
/// unregister callbacks without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
    attribute_callbacks: RwLock<HashMap<SubscriptionId, AttributeCallback>>,
    availability_callbacks: RwLock<HashMap<SubscriptionId, AvailabilityCallback>>,
    attributes_callbacks: RwLock<HashMap<SubscriptionId, AttributesCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state_changed_callbacks: RwLock::new(HashMap::new()),
            attribute_callbacks: RwLock::new(HashMap::new()),
            availability_callbacks: RwLock::new(HashMap::new()),
            attributes_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback receiving every state change.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving attribute updates.
    pub fn on_attribute_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(InboundSlot, &AttributeValue) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.attribute_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving availability changes.
    pub fn on_availability_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.availability_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback receiving replaced JSON attributes.
    pub fn on_attributes_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Map<String, Value>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.attributes_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state_changed_callbacks.write().remove(&id).is_some()
            || self.attribute_callbacks.write().remove(&id).is_some()
            || self.availability_callbacks.write().remove(&id).is_some()
            || self.attributes_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.state_changed_callbacks.write().clear();
        self.attribute_callbacks.write().clear();
        self.availability_callbacks.write().clear();
        self.attributes_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches a state change to the generic callbacks and to the
    /// callbacks registered for its kind.
    pub fn dispatch(&self, change: &StateChange) {
        for callback in snapshot(&self.state_changed_callbacks) {
            callback(change);
        }

        match change {
            StateChange::Attribute { slot, value } => {
                for callback in snapshot(&self.attribute_callbacks) {
                    callback(*slot, value);
                }
            }
            StateChange::Availability(available) => {
                for callback in snapshot(&self.availability_callbacks) {
                    callback(*available);
                }
            }
            StateChange::Attributes(attributes) => {
                for callback in snapshot(&self.attributes_callbacks) {
                    callback(attributes);
                }
            }
            StateChange::Reconfigured | StateChange::Removed => {}
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.state_changed_callbacks.read().len()
            + self.attribute_callbacks.read().len()
            + self.availability_callbacks.read().len()
            + self.attributes_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

fn snapshot<C: Clone>(callbacks: &RwLock<HashMap<SubscriptionId, C>>) -> Vec<C> {
    callbacks.read().values().cloned().collect()
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerState;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn attribute_callback_and_unsubscribe() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = registry.on_attribute_changed(move |slot, _value| {
            assert_eq!(slot, InboundSlot::State);
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::state(PlayerState::Playing));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.dispatch(&StateChange::state(PlayerState::Paused));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn state_changed_receives_everything() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        registry.on_state_changed(move |_change| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::state(PlayerState::On));
        registry.dispatch(&StateChange::Availability(false));
        registry.dispatch(&StateChange::Reconfigured);

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn availability_callback() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(None::<bool>));
        let received_clone = received.clone();

        registry.on_availability_changed(move |available| {
            *received_clone.write() = Some(available);
        });
        registry.dispatch(&StateChange::Availability(false));

        assert_eq!(*received.read(), Some(false));
    }

    #[test]
    fn attributes_callback() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(Map::new()));
        let received_clone = received.clone();

        registry.on_attributes_changed(move |attributes| {
            received_clone.write().clone_from(attributes);
        });

        let mut attributes = Map::new();
        attributes.insert("codec".to_string(), Value::from("flac"));
        registry.dispatch(&StateChange::Attributes(attributes));

        assert_eq!(received.read()["codec"], "flac");
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let slot = Arc::new(RwLock::new(None::<SubscriptionId>));
        let registry_clone = Arc::clone(&registry);
        let slot_clone = Arc::clone(&slot);

        let id = registry.on_state_changed(move |_| {
            if let Some(id) = *slot_clone.read() {
                registry_clone.unsubscribe(id);
            }
        });
        *slot.write() = Some(id);

        registry.dispatch(&StateChange::Reconfigured);
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn clear_and_unique_ids() {
        let registry = CallbackRegistry::new();

        let id1 = registry.on_state_changed(|_| {});
        let id2 = registry.on_availability_changed(|_| {});
        let id3 = registry.on_attributes_changed(|_| {});
        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_eq!(registry.callback_count(), 3);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_state_changed(|_| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("CallbackRegistry"));
        assert!(debug.contains("callback_count"));
    }
}
