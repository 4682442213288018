// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The validated, immutable binding of one entity.
//!
//! A [`Binding`] is produced by
//! [`MediaPlayerConfig::validate`](crate::config::MediaPlayerConfig::validate)
//! and never changes afterwards. Reconfiguring an entity builds a new
//! binding and swaps it in whole.
//!
//! It contains:
//!
//! - [`TopicTable`] - which topic feeds each inbound slot and which topic
//!   each command is published to
//! - [`ResolverTable`] - how a raw payload becomes a value for each slot
//! - publication flags, volume bounds and allow-lists
//!
//! # Examples
//!
//! ```
//! use mqtt_media_player::binding::Resolution;
//! use mqtt_media_player::config::MediaPlayerConfig;
//! use mqtt_media_player::slot::InboundSlot;
//! use mqtt_media_player::state::AttributeValue;
//!
//! let binding = MediaPlayerConfig::new("Player")
//!     .with_topic(InboundSlot::Source, "player/source")
//!     .with_source_list(["TV", "Radio"])
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(
//!     binding.resolve(InboundSlot::Source, "TV").unwrap(),
//!     Resolution::Accepted(AttributeValue::Text("TV".into()))
//! );
//! assert_eq!(
//!     binding.resolve(InboundSlot::Source, "USB").unwrap(),
//!     Resolution::NotAllowed("USB".into())
//! );
//! ```

mod resolver;
mod topic_table;

pub use resolver::{Resolution, Resolver, ResolverTable, coerce};
pub use topic_table::TopicTable;

use crate::SupportedFeatures;
use crate::entity::{AvailabilityBinding, DeviceInfo, JsonAttributesBinding};
use crate::error::ValueError;
use crate::slot::{CommandSlot, InboundSlot};
use crate::types::{QosLevel, VolumeRange};

/// Validated configuration of one media player entity.
#[derive(Debug, Clone)]
pub struct Binding {
    pub(crate) name: String,
    pub(crate) unique_id: Option<String>,
    pub(crate) qos: QosLevel,
    pub(crate) retain: bool,
    pub(crate) send_if_off: bool,
    pub(crate) volume: VolumeRange,
    pub(crate) source_list: Option<Vec<String>>,
    pub(crate) sound_mode_list: Option<Vec<String>>,
    pub(crate) media_image_remotely_accessible: bool,
    pub(crate) topics: TopicTable,
    pub(crate) resolvers: ResolverTable,
    pub(crate) availability: Option<AvailabilityBinding>,
    pub(crate) json_attributes: Option<JsonAttributesBinding>,
    pub(crate) device: Option<DeviceInfo>,
}

impl Binding {
    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique identifier.
    #[must_use]
    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    /// Returns the QoS used for subscriptions and publications.
    #[must_use]
    pub const fn qos(&self) -> QosLevel {
        self.qos
    }

    /// Returns the retain flag used for publications.
    #[must_use]
    pub const fn retain(&self) -> bool {
        self.retain
    }

    /// Returns whether commands are published while the player is off.
    #[must_use]
    pub const fn send_if_off(&self) -> bool {
        self.send_if_off
    }

    /// Returns the device volume bounds.
    #[must_use]
    pub const fn volume(&self) -> VolumeRange {
        self.volume
    }

    /// Returns the configured input sources.
    #[must_use]
    pub fn source_list(&self) -> Option<&[String]> {
        self.source_list.as_deref()
    }

    /// Returns the configured sound modes.
    #[must_use]
    pub fn sound_mode_list(&self) -> Option<&[String]> {
        self.sound_mode_list.as_deref()
    }

    /// Returns whether the media image is remotely accessible.
    #[must_use]
    pub const fn media_image_remotely_accessible(&self) -> bool {
        self.media_image_remotely_accessible
    }

    /// Returns the topic table.
    #[must_use]
    pub const fn topics(&self) -> &TopicTable {
        &self.topics
    }

    /// Returns the resolver table.
    #[must_use]
    pub const fn resolvers(&self) -> &ResolverTable {
        &self.resolvers
    }

    /// Returns the availability binding, if an availability topic is set.
    #[must_use]
    pub const fn availability(&self) -> Option<&AvailabilityBinding> {
        self.availability.as_ref()
    }

    /// Returns the JSON attributes binding, if an attributes topic is set.
    #[must_use]
    pub const fn json_attributes(&self) -> Option<&JsonAttributesBinding> {
        self.json_attributes.as_ref()
    }

    /// Returns the device block.
    #[must_use]
    pub const fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Returns the capability mask derived from the command topics.
    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        self.topics.supported_features()
    }

    /// Returns the publish topic of a command.
    #[must_use]
    pub fn command_topic(&self, slot: CommandSlot) -> Option<&str> {
        self.topics.command(slot)
    }

    /// Returns the allow-list constraining an inbound slot.
    #[must_use]
    pub fn allow_list(&self, slot: InboundSlot) -> Option<&[String]> {
        match slot {
            InboundSlot::Source => self.source_list(),
            InboundSlot::SoundMode => self.sound_mode_list(),
            _ => None,
        }
    }

    /// Resolves and coerces a raw payload for an inbound slot.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the slot requires a number and the resolved
    /// payload does not parse as one.
    pub fn resolve(&self, slot: InboundSlot, payload: &str) -> Result<Resolution, ValueError> {
        let resolved = self.resolvers.resolve(slot, payload).into_owned();
        coerce(slot, resolved, self.allow_list(slot))
    }
}
