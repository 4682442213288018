// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery messages.
//!
//! Devices announce themselves by publishing their configuration, as a JSON
//! object, to
//!
//! ```text
//! <prefix>/media_player/[<node_id>/]<object_id>/config
//! ```
//!
//! An empty payload on the same topic removes the entity. Topic values may
//! use `~` as a shorthand for the base topic given under the `~` key.
//!
//! # Examples
//!
//! ```
//! use mqtt_media_player::entity::{DiscoveryMessage, DiscoveryPayload};
//!
//! let message = DiscoveryMessage::parse(
//!     "homeassistant",
//!     "homeassistant/media_player/livingroom/config",
//!     r#"{"~": "players/livingroom", "state_topic": "~/state"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(message.hash.object_id, "livingroom");
//! let DiscoveryPayload::Config(config) = message.payload else {
//!     panic!("expected a configuration");
//! };
//! assert_eq!(config.bindings["state_topic"], "players/livingroom/state");
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::config::MediaPlayerConfig;
use crate::error::ConfigError;

/// Component name used in discovery topics.
pub const COMPONENT: &str = "media_player";

/// Default discovery prefix.
pub const DEFAULT_PREFIX: &str = "homeassistant";

/// Key holding the base topic.
const BASE_TOPIC_KEY: &str = "~";

/// Character replaced by the base topic.
const BASE_TOPIC: char = '~';

/// Identity of a discovered entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryHash {
    /// Optional node grouping several entities of one device.
    pub node_id: Option<String>,
    /// Object identifier.
    pub object_id: String,
}

impl DiscoveryHash {
    /// Parses a discovery topic.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDiscoveryTopic` if the topic does not
    /// have the expected shape.
    pub fn parse(prefix: &str, topic: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidDiscoveryTopic(topic.to_string());

        let rest = topic
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let rest = rest
            .strip_prefix(COMPONENT)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let ids = rest.strip_suffix("/config").ok_or_else(invalid)?;

        let parts: Vec<&str> = ids.split('/').collect();
        if !parts.iter().all(|part| is_valid_id(part)) {
            return Err(invalid());
        }
        match parts.as_slice() {
            [object_id] => Ok(Self {
                node_id: None,
                object_id: (*object_id).to_string(),
            }),
            [node_id, object_id] => Ok(Self {
                node_id: Some((*node_id).to_string()),
                object_id: (*object_id).to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Returns the discovery topic for this hash.
    #[must_use]
    pub fn topic(&self, prefix: &str) -> String {
        match &self.node_id {
            Some(node_id) => format!("{prefix}/{COMPONENT}/{node_id}/{}/config", self.object_id),
            None => format!("{prefix}/{COMPONENT}/{}/config", self.object_id),
        }
    }
}

impl fmt::Display for DiscoveryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(node_id) => write!(f, "{node_id} {}", self.object_id),
            None => f.write_str(&self.object_id),
        }
    }
}

/// What a discovery payload asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryPayload {
    /// Create or reconfigure the entity.
    Config(Box<MediaPlayerConfig>),
    /// Remove the entity.
    Removed,
}

impl DiscoveryPayload {
    /// Parses a payload.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if a non-empty payload is not a valid
    /// configuration object.
    pub fn parse(payload: &str) -> Result<Self, ConfigError> {
        if payload.trim().is_empty() {
            return Ok(Self::Removed);
        }
        let mut object: Map<String, Value> = serde_json::from_str(payload)?;
        expand_base_topic(&mut object);
        let config = serde_json::from_value(Value::Object(object))?;
        Ok(Self::Config(Box::new(config)))
    }
}

/// A parsed discovery message.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryMessage {
    /// Identity of the entity.
    pub hash: DiscoveryHash,
    /// The requested action.
    pub payload: DiscoveryPayload,
}

impl DiscoveryMessage {
    /// Parses a message received on a discovery topic.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the topic or the payload is malformed.
    pub fn parse(prefix: &str, topic: &str, payload: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            hash: DiscoveryHash::parse(prefix, topic)?,
            payload: DiscoveryPayload::parse(payload)?,
        })
    }

    /// Returns the subscription filter matching every media player
    /// discovery topic under a prefix.
    #[must_use]
    pub fn filter(prefix: &str) -> String {
        format!("{prefix}/{COMPONENT}/#")
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Replaces `~` at either end of every `*_topic` value with the base topic.
fn expand_base_topic(object: &mut Map<String, Value>) {
    let Some(Value::String(base)) = object.remove(BASE_TOPIC_KEY) else {
        return;
    };

    for (key, value) in object.iter_mut() {
        if !key.ends_with("_topic") {
            continue;
        }
        let Value::String(topic) = value else {
            continue;
        };
        if let Some(rest) = topic.strip_prefix(BASE_TOPIC) {
            *topic = format!("{base}{rest}");
        }
        if let Some(rest) = topic.strip_suffix(BASE_TOPIC) {
            *topic = format!("{rest}{base}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_topics() {
        let hash = DiscoveryHash::parse("ha", "ha/media_player/speaker/config").unwrap();
        assert_eq!(hash.node_id, None);
        assert_eq!(hash.object_id, "speaker");
        assert_eq!(hash.topic("ha"), "ha/media_player/speaker/config");

        let hash = DiscoveryHash::parse("ha", "ha/media_player/node-1/speaker_2/config").unwrap();
        assert_eq!(hash.node_id.as_deref(), Some("node-1"));
        assert_eq!(hash.to_string(), "node-1 speaker_2");
        assert_eq!(hash.topic("ha"), "ha/media_player/node-1/speaker_2/config");
    }

    #[test]
    fn rejects_malformed_topics() {
        for topic in [
            "other/media_player/speaker/config",
            "ha/light/speaker/config",
            "ha/media_player/speaker/state",
            "ha/media_player/config",
            "ha/media_player/a/b/c/config",
            "ha/media_player/sp ace/config",
        ] {
            assert!(
                matches!(
                    DiscoveryHash::parse("ha", topic),
                    Err(ConfigError::InvalidDiscoveryTopic(_))
                ),
                "{topic}"
            );
        }
    }

    #[test]
    fn empty_payload_removes() {
        assert_eq!(DiscoveryPayload::parse("").unwrap(), DiscoveryPayload::Removed);
        assert_eq!(DiscoveryPayload::parse("  ").unwrap(), DiscoveryPayload::Removed);
    }

    #[test]
    fn base_topic_expands_on_both_ends() {
        let payload = DiscoveryPayload::parse(
            r#"{
                "~": "living/player",
                "name": "Living",
                "state_topic": "~/state",
                "play_command_topic": "cmd/~",
                "state_template": "~ {{ value }}"
            }"#,
        )
        .unwrap();
        let DiscoveryPayload::Config(config) = payload else {
            panic!("expected configuration");
        };
        assert_eq!(config.name, "Living");
        assert_eq!(config.bindings["state_topic"], "living/player/state");
        assert_eq!(config.bindings["play_command_topic"], "cmd/living/player");
        // Only topics are expanded
        assert_eq!(config.bindings["state_template"], "~ {{ value }}");
        assert!(!config.bindings.contains_key("~"));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(
            DiscoveryPayload::parse("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            DiscoveryPayload::parse("[1]"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn filter_covers_all_objects() {
        assert_eq!(DiscoveryMessage::filter("ha"), "ha/media_player/#");
    }
}
