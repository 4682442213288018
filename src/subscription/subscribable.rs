// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for entities that notify the host.

use serde_json::{Map, Value};

use crate::slot::InboundSlot;
use crate::state::{AttributeValue, StateChange};
use crate::subscription::SubscriptionId;

/// Trait for types that support host callbacks.
///
/// Callbacks run synchronously on the task that received the message or
/// issued the command. They must not block.
pub trait Subscribable {
    /// Subscribes to every state change.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Subscribes to attribute updates.
    ///
    /// Called for inbound messages and for optimistic command updates.
    fn on_attribute_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(InboundSlot, &AttributeValue) + Send + Sync + 'static;

    /// Subscribes to availability changes.
    fn on_availability_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static;

    /// Subscribes to JSON attribute replacements.
    fn on_attributes_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Map<String, Value>) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
