// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached attribute values of a media player.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::StateChange;
use crate::slot::InboundSlot;
use crate::types::PlayerState;

/// A cached attribute value.
///
/// Most slots hold text. Track numbers are integers and volume levels are
/// floats. Optimistic command updates store booleans for mute and shuffle.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Text as received (after template rendering).
    Text(String),
    /// An integer, used for track numbers.
    Integer(i64),
    /// A float, used for volume levels.
    Float(f64),
    /// A flag set by an optimistic command update.
    Bool(bool),
    /// The player state.
    State(PlayerState),
}

impl AttributeValue {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number, if this is a float or integer value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Interprets the value as a flag.
    ///
    /// Booleans are returned as-is. Text is parsed leniently: `true`, `on`,
    /// `yes` and `1` are true; `false`, `off`, `no` and `0` are false
    /// (case-insensitive). Anything else is `None`.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            Self::Text(text) => parse_flag(text),
            Self::Integer(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Returns the player state, if this is a state value.
    #[must_use]
    pub const fn as_state(&self) -> Option<&PlayerState> {
        match self {
            Self::State(state) => Some(state),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::State(state) => write!(f, "{state}"),
        }
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Cached state of a media player entity.
///
/// Every inbound slot starts out unknown. Values are written by inbound
/// message handlers and by optimistic command updates.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::slot::InboundSlot;
/// use mqtt_media_player::state::{AttributeValue, EntityState};
///
/// let mut state = EntityState::new();
/// assert!(state.get(InboundSlot::MediaTitle).is_none());
///
/// state.set(InboundSlot::MediaTitle, AttributeValue::Text("So What".into()));
/// assert_eq!(state.text(InboundSlot::MediaTitle), Some("So What"));
/// assert!(state.last_updated().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    values: BTreeMap<InboundSlot, AttributeValue>,
    last_updated: Option<DateTime<Utc>>,
}

impl EntityState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value of a slot.
    #[must_use]
    pub fn get(&self, slot: InboundSlot) -> Option<&AttributeValue> {
        self.values.get(&slot)
    }

    /// Stores a value, returning whether it differs from the cached one.
    pub fn set(&mut self, slot: InboundSlot, value: AttributeValue) -> bool {
        self.last_updated = Some(Utc::now());
        self.values.insert(slot, value.clone()) != Some(value)
    }

    /// Applies a state change, returning whether anything changed.
    ///
    /// Only attribute changes touch the cache.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Attribute { slot, value } => self.set(*slot, value.clone()),
            _ => false,
        }
    }

    /// Forgets every cached value.
    pub fn clear(&mut self) {
        self.values.clear();
        self.last_updated = Some(Utc::now());
    }

    /// Returns the text of a slot.
    #[must_use]
    pub fn text(&self, slot: InboundSlot) -> Option<&str> {
        self.get(slot).and_then(AttributeValue::as_text)
    }

    /// Returns the player state.
    #[must_use]
    pub fn state(&self) -> Option<&PlayerState> {
        self.get(InboundSlot::State).and_then(AttributeValue::as_state)
    }

    /// Returns whether the player is known to be off.
    #[must_use]
    pub fn is_off(&self) -> bool {
        self.state().is_some_and(PlayerState::is_off)
    }

    /// Returns when the state was last written.
    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Iterates over every known slot value.
    pub fn iter(&self) -> impl Iterator<Item = (InboundSlot, &AttributeValue)> {
        self.values.iter().map(|(slot, value)| (*slot, value))
    }

    /// Returns the number of known slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no slot is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
