// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Media player configuration.
//!
//! [`MediaPlayerConfig`] is the raw, unvalidated configuration. It can be
//! deserialized from JSON (the format of discovery payloads) or assembled
//! with the `with_*` builder methods. [`MediaPlayerConfig::validate`] turns
//! it into an immutable [`Binding`](crate::binding::Binding).
//!
//! # Examples
//!
//! ```
//! use mqtt_media_player::config::MediaPlayerConfig;
//! use mqtt_media_player::slot::{CommandSlot, InboundSlot};
//!
//! let config = MediaPlayerConfig::new("Living Room")
//!     .with_topic(InboundSlot::State, "living/player/state")
//!     .with_topic(InboundSlot::VolumeLevel, "living/player/volume")
//!     .with_command_topic(CommandSlot::Play, "living/player/play")
//!     .with_volume_range(0.0, 60.0);
//!
//! let binding = config.validate().unwrap();
//! assert_eq!(binding.name(), "Living Room");
//! ```

mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::DeviceInfo;
use crate::error::ConfigError;
use crate::slot::{CommandSlot, InboundSlot};
use crate::types::{QosLevel, VolumeRange};

/// Name used when the configuration does not provide one.
pub const DEFAULT_NAME: &str = "MQTT Media Player";

/// Default payload announcing that the device is available.
pub const DEFAULT_PAYLOAD_AVAILABLE: &str = "online";

/// Default payload announcing that the device is unavailable.
pub const DEFAULT_PAYLOAD_NOT_AVAILABLE: &str = "offline";

/// Raw configuration of one media player entity.
///
/// Slot topics and templates live in [`bindings`](Self::bindings), keyed by
/// their configuration key (for example `media_title_topic` or
/// `volume_level_template`). Keys that do not name a known slot are
/// rejected during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPlayerConfig {
    /// Display name of the entity.
    #[serde(default = "default_name")]
    pub name: String,

    /// Stable identifier of the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,

    /// QoS used for every subscription and publication.
    #[serde(default)]
    pub qos: QosLevel,

    /// Retain flag used for every publication.
    #[serde(default)]
    pub retain: bool,

    /// Whether commands are published while the player is off.
    #[serde(default = "default_true")]
    pub send_if_off: bool,

    /// Device volume matching a host volume of 0.0.
    #[serde(default = "default_min_volume")]
    pub min_volume: f64,

    /// Device volume matching a host volume of 1.0.
    #[serde(default = "default_max_volume")]
    pub max_volume: f64,

    /// Allowed input sources.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_list: Option<Vec<String>>,

    /// Allowed sound modes.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub sound_mode_list: Option<Vec<String>>,

    /// Whether the media image URL is reachable from outside the network.
    #[serde(default)]
    pub media_image_remotely_accessible: bool,

    /// Template applied to every inbound slot without its own template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,

    /// Topic announcing device availability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_topic: Option<String>,

    /// Payload meaning "available".
    #[serde(default = "default_payload_available")]
    pub payload_available: String,

    /// Payload meaning "not available".
    #[serde(default = "default_payload_not_available")]
    pub payload_not_available: String,

    /// Topic carrying a JSON object of extra state attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_attributes_topic: Option<String>,

    /// Template applied to JSON attribute payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_attributes_template: Option<String>,

    /// Device this entity belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,

    /// Slot topics and templates, keyed by configuration key.
    #[serde(flatten)]
    pub bindings: BTreeMap<String, String>,
}

impl Default for MediaPlayerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            unique_id: None,
            qos: QosLevel::default(),
            retain: false,
            send_if_off: true,
            min_volume: VolumeRange::DEFAULT_MIN,
            max_volume: VolumeRange::DEFAULT_MAX,
            source_list: None,
            sound_mode_list: None,
            media_image_remotely_accessible: false,
            value_template: None,
            availability_topic: None,
            payload_available: default_payload_available(),
            payload_not_available: default_payload_not_available(),
            json_attributes_topic: None,
            json_attributes_template: None,
            device: None,
            bindings: BTreeMap::new(),
        }
    }
}

impl MediaPlayerConfig {
    /// Creates a configuration with the given name and every default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the text is not a valid configuration
    /// document. The result still has to be [validated](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the subscribe topic of an inbound slot.
    #[must_use]
    pub fn with_topic(mut self, slot: InboundSlot, topic: impl Into<String>) -> Self {
        self.bindings.insert(slot.topic_key().to_string(), topic.into());
        self
    }

    /// Sets the slot-specific value template of an inbound slot.
    #[must_use]
    pub fn with_template(mut self, slot: InboundSlot, template: impl Into<String>) -> Self {
        self.bindings
            .insert(slot.template_key().to_string(), template.into());
        self
    }

    /// Sets the publish topic of a command.
    #[must_use]
    pub fn with_command_topic(mut self, slot: CommandSlot, topic: impl Into<String>) -> Self {
        self.bindings.insert(slot.topic_key().to_string(), topic.into());
        self
    }

    /// Sets the template applied to every slot without its own template.
    #[must_use]
    pub fn with_value_template(mut self, template: impl Into<String>) -> Self {
        self.value_template = Some(template.into());
        self
    }

    /// Sets the unique identifier.
    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Sets the QoS level.
    #[must_use]
    pub fn with_qos(mut self, qos: QosLevel) -> Self {
        self.qos = qos;
        self
    }

    /// Sets the retain flag.
    #[must_use]
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// Sets whether commands are published while the player is off.
    #[must_use]
    pub fn with_send_if_off(mut self, send_if_off: bool) -> Self {
        self.send_if_off = send_if_off;
        self
    }

    /// Sets the device volume bounds.
    #[must_use]
    pub fn with_volume_range(mut self, min: f64, max: f64) -> Self {
        self.min_volume = min;
        self.max_volume = max;
        self
    }

    /// Sets the allowed input sources.
    #[must_use]
    pub fn with_source_list<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_list = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the allowed sound modes.
    #[must_use]
    pub fn with_sound_mode_list<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sound_mode_list = Some(modes.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the media image as remotely accessible.
    #[must_use]
    pub fn with_media_image_remotely_accessible(mut self, accessible: bool) -> Self {
        self.media_image_remotely_accessible = accessible;
        self
    }

    /// Sets the availability topic.
    #[must_use]
    pub fn with_availability_topic(mut self, topic: impl Into<String>) -> Self {
        self.availability_topic = Some(topic.into());
        self
    }

    /// Sets the JSON attributes topic.
    #[must_use]
    pub fn with_json_attributes_topic(mut self, topic: impl Into<String>) -> Self {
        self.json_attributes_topic = Some(topic.into());
        self
    }

    /// Sets the device block.
    #[must_use]
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = Some(device);
        self
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_volume() -> f64 {
    VolumeRange::DEFAULT_MIN
}

fn default_max_volume() -> f64 {
    VolumeRange::DEFAULT_MAX
}

fn default_payload_available() -> String {
    DEFAULT_PAYLOAD_AVAILABLE.to_string()
}

fn default_payload_not_available() -> String {
    DEFAULT_PAYLOAD_NOT_AVAILABLE.to_string()
}

/// Accepts either a single string or a list of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let config = MediaPlayerConfig::from_json("{}").unwrap();
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.qos, QosLevel::AtMostOnce);
        assert!(!config.retain);
        assert!(config.send_if_off);
        assert!((config.min_volume - 0.0).abs() < f64::EPSILON);
        assert!((config.max_volume - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.payload_available, "online");
        assert_eq!(config.payload_not_available, "offline");
        assert!(config.bindings.is_empty());
        assert_eq!(config, MediaPlayerConfig::default());
    }

    #[test]
    fn slot_keys_land_in_bindings() {
        let config = MediaPlayerConfig::from_json(
            r#"{
                "name": "Kitchen",
                "state_topic": "kitchen/state",
                "media_title_template": "{{ value_json.title }}",
                "play_command_topic": "kitchen/play",
                "max_volume": 60
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "Kitchen");
        assert_eq!(config.bindings["state_topic"], "kitchen/state");
        assert_eq!(config.bindings["play_command_topic"], "kitchen/play");
        assert!(config.bindings.contains_key("media_title_template"));
        assert!((config.max_volume - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_source_becomes_list() {
        let config = MediaPlayerConfig::from_json(r#"{"source_list": "HDMI 1"}"#).unwrap();
        assert_eq!(config.source_list, Some(vec!["HDMI 1".to_string()]));

        let config =
            MediaPlayerConfig::from_json(r#"{"sound_mode_list": ["Movie", "Music"]}"#).unwrap();
        assert_eq!(
            config.sound_mode_list,
            Some(vec!["Movie".to_string(), "Music".to_string()])
        );
    }

    #[test]
    fn invalid_qos_fails_to_parse() {
        assert!(MediaPlayerConfig::from_json(r#"{"qos": 3}"#).is_err());
    }

    #[test]
    fn builder_sets_keys() {
        let config = MediaPlayerConfig::new("Den")
            .with_topic(InboundSlot::MediaTrack, "den/track")
            .with_template(InboundSlot::MediaTrack, "{{ value_json.n }}")
            .with_command_topic(CommandSlot::Seek, "den/seek")
            .with_source_list(["TV", "Radio"])
            .with_send_if_off(false);

        assert_eq!(config.bindings["media_track_topic"], "den/track");
        assert_eq!(config.bindings["media_track_template"], "{{ value_json.n }}");
        assert_eq!(config.bindings["seek_command_topic"], "den/seek");
        assert_eq!(config.source_list.as_deref().map(<[String]>::len), Some(2));
        assert!(!config.send_if_off);
    }
}
