// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Availability tracking.
//!
//! A device may announce on a dedicated topic whether it is reachable,
//! usually through its MQTT last will. Without such a topic the entity is
//! always available.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::state::StateChange;

/// Availability topic and the payloads expected on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityBinding {
    topic: String,
    payload_available: String,
    payload_not_available: String,
}

impl AvailabilityBinding {
    /// Creates a binding.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        payload_available: impl Into<String>,
        payload_not_available: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload_available: payload_available.into(),
            payload_not_available: payload_not_available.into(),
        }
    }

    /// Returns the availability topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the payload announcing availability.
    #[must_use]
    pub fn payload_available(&self) -> &str {
        &self.payload_available
    }

    /// Returns the payload announcing unavailability.
    #[must_use]
    pub fn payload_not_available(&self) -> &str {
        &self.payload_not_available
    }

    /// Interprets a payload. Unknown payloads yield `None`.
    #[must_use]
    pub fn parse(&self, payload: &str) -> Option<bool> {
        if payload == self.payload_available {
            Some(true)
        } else if payload == self.payload_not_available {
            Some(false)
        } else {
            None
        }
    }
}

/// Runtime availability of one entity.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::entity::{Availability, AvailabilityBinding};
///
/// let binding = AvailabilityBinding::new("player/status", "online", "offline");
/// let availability = Availability::new(Some(&binding));
/// assert!(!availability.is_available());
///
/// availability.handle(&binding, "online");
/// assert!(availability.is_available());
///
/// // No topic: always available
/// assert!(Availability::new(None).is_available());
/// ```
#[derive(Debug)]
pub struct Availability {
    available: AtomicBool,
}

impl Availability {
    /// Creates the initial availability for a binding.
    #[must_use]
    pub fn new(binding: Option<&AvailabilityBinding>) -> Self {
        Self {
            available: AtomicBool::new(binding.is_none()),
        }
    }

    /// Returns whether the entity is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Applies an availability payload.
    ///
    /// Returns the change to notify, or `None` if the payload is unknown
    /// or did not change anything.
    pub fn handle(&self, binding: &AvailabilityBinding, payload: &str) -> Option<StateChange> {
        let Some(available) = binding.parse(payload) else {
            tracing::debug!(
                topic = %binding.topic(),
                payload = %payload,
                "Ignoring unknown availability payload"
            );
            return None;
        };
        self.set(available)
    }

    /// Adjusts availability to a new binding.
    ///
    /// Losing the topic makes the entity available. Moving to another
    /// topic makes it unavailable until that topic reports.
    pub fn reconfigure(
        &self,
        old: Option<&AvailabilityBinding>,
        new: Option<&AvailabilityBinding>,
    ) -> Option<StateChange> {
        match (old, new) {
            (_, None) => self.set(true),
            (Some(old), Some(new)) if old.topic() == new.topic() => None,
            (_, Some(_)) => self.set(false),
        }
    }

    fn set(&self, available: bool) -> Option<StateChange> {
        let previous = self.available.swap(available, Ordering::AcqRel);
        (previous != available).then_some(StateChange::Availability(available))
    }
}
