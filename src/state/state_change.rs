// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change notifications.
//!
//! Every change the entity makes to its observable state is described by a
//! [`StateChange`] and handed to the registered callbacks.
//!
//! # Change Types
//!
//! - [`StateChange::Attribute`] - An inbound slot received a new value
//! - [`StateChange::Availability`] - The device went online or offline
//! - [`StateChange::Attributes`] - The JSON attribute object was replaced
//! - [`StateChange::Reconfigured`] - A new configuration was applied
//! - [`StateChange::Removed`] - The entity was detached for good

use serde_json::{Map, Value};

use super::AttributeValue;
use crate::slot::InboundSlot;
use crate::types::PlayerState;

/// A change of the entity's observable state.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::slot::InboundSlot;
/// use mqtt_media_player::state::{AttributeValue, StateChange};
///
/// let change = StateChange::attribute(InboundSlot::MediaTitle, AttributeValue::Text("Intro".into()));
/// assert_eq!(change.slot(), Some(InboundSlot::MediaTitle));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// An attribute was updated.
    Attribute {
        /// The slot that changed.
        slot: InboundSlot,
        /// The new value.
        value: AttributeValue,
    },

    /// Availability changed.
    Availability(bool),

    /// The extra JSON attributes were replaced.
    Attributes(Map<String, Value>),

    /// The entity was rebound to a new configuration.
    Reconfigured,

    /// The entity was removed.
    Removed,
}

impl StateChange {
    /// Creates an attribute change.
    #[must_use]
    pub fn attribute(slot: InboundSlot, value: AttributeValue) -> Self {
        Self::Attribute { slot, value }
    }

    /// Creates a player state change.
    #[must_use]
    pub fn state(state: PlayerState) -> Self {
        Self::attribute(InboundSlot::State, AttributeValue::State(state))
    }

    /// Returns the slot of an attribute change.
    #[must_use]
    pub const fn slot(&self) -> Option<InboundSlot> {
        match self {
            Self::Attribute { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}
