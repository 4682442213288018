// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value resolution: raw payload to stored attribute.
//!
//! Resolution happens in two steps. The slot's [`Resolver`] renders the raw
//! payload into text, then [`coerce`] turns that text into an
//! [`AttributeValue`] according to the slot's [`Coercion`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ValueError;
use crate::slot::{Coercion, InboundSlot};
use crate::state::AttributeValue;
use crate::template::Render;
use crate::types::PlayerState;

/// Renders the raw payload of one slot.
#[derive(Debug, Clone, Default)]
pub enum Resolver {
    /// Returns the payload unchanged.
    #[default]
    Identity,
    /// Renders the payload through a template.
    Template(Arc<dyn Render>),
}

impl Resolver {
    /// Resolves a raw payload.
    #[must_use]
    pub fn resolve<'a>(&self, payload: &'a str) -> Cow<'a, str> {
        match self {
            Self::Identity => Cow::Borrowed(payload),
            Self::Template(template) => Cow::Owned(template.render(payload)),
        }
    }
}

/// The resolver of every inbound slot.
///
/// A slot-specific template wins over the global template. Slots with
/// neither resolve to the identity.
#[derive(Debug, Clone, Default)]
pub struct ResolverTable {
    resolvers: BTreeMap<InboundSlot, Resolver>,
    fallback: Resolver,
}

impl ResolverTable {
    pub(crate) fn new(
        global: Option<Arc<dyn Render>>,
        specific: BTreeMap<InboundSlot, Arc<dyn Render>>,
    ) -> Self {
        Self {
            resolvers: specific
                .into_iter()
                .map(|(slot, template)| (slot, Resolver::Template(template)))
                .collect(),
            fallback: global.map_or(Resolver::Identity, Resolver::Template),
        }
    }

    /// Returns the resolver used for a slot.
    #[must_use]
    pub fn resolver(&self, slot: InboundSlot) -> &Resolver {
        self.resolvers.get(&slot).unwrap_or(&self.fallback)
    }

    /// Resolves a raw payload for a slot.
    #[must_use]
    pub fn resolve<'a>(&self, slot: InboundSlot, payload: &'a str) -> Cow<'a, str> {
        self.resolver(slot).resolve(payload)
    }
}

/// Outcome of resolving an inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The value should be stored.
    Accepted(AttributeValue),
    /// The value is not in the slot's allow-list and must be dropped.
    NotAllowed(String),
}

/// Coerces resolved text into the slot's attribute type.
///
/// An allow-list only constrains [`Coercion::AllowListed`] slots, and only
/// when it is non-empty.
///
/// # Errors
///
/// Returns `ValueError` if an integer or float slot receives text that does
/// not parse.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::binding::{coerce, Resolution};
/// use mqtt_media_player::slot::InboundSlot;
/// use mqtt_media_player::state::AttributeValue;
///
/// let track = coerce(InboundSlot::MediaTrack, "7".into(), None).unwrap();
/// assert_eq!(track, Resolution::Accepted(AttributeValue::Integer(7)));
///
/// let sources = ["HDMI".to_string()];
/// let source = coerce(InboundSlot::Source, "USB".into(), Some(&sources[..])).unwrap();
/// assert_eq!(source, Resolution::NotAllowed("USB".into()));
///
/// assert!(coerce(InboundSlot::VolumeLevel, "loud".into(), None).is_err());
/// ```
pub fn coerce(
    slot: InboundSlot,
    value: String,
    allow_list: Option<&[String]>,
) -> Result<Resolution, ValueError> {
    let attribute = match slot.coercion() {
        Coercion::Text => AttributeValue::Text(value),
        Coercion::Integer => {
            let parsed = value.trim().parse::<i64>();
            match parsed {
                Ok(n) => AttributeValue::Integer(n),
                Err(_) => return Err(ValueError::InvalidTrack(value)),
            }
        }
        Coercion::Float => {
            let parsed = value.trim().parse::<f64>();
            match parsed {
                Ok(f) => AttributeValue::Float(f),
                Err(_) => return Err(ValueError::InvalidVolume(value)),
            }
        }
        Coercion::AllowListed => match allow_list {
            Some(list) if !list.is_empty() && !list.contains(&value) => {
                return Ok(Resolution::NotAllowed(value));
            }
            _ => AttributeValue::Text(value),
        },
        Coercion::State => AttributeValue::State(PlayerState::from(value.as_str())),
    };
    Ok(Resolution::Accepted(attribute))
}
