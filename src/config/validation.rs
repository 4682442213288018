// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration validation.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::MediaPlayerConfig;
use crate::binding::{Binding, ResolverTable, TopicTable};
use crate::entity::{AvailabilityBinding, JsonAttributesBinding};
use crate::error::ConfigError;
use crate::slot::{CommandSlot, InboundSlot};
use crate::template::{Render, ValueTemplate};
use crate::types::VolumeRange;

/// Longest topic the MQTT wire format can carry.
const MAX_TOPIC_LEN: usize = 65_535;

impl MediaPlayerConfig {
    /// Validates the configuration and builds the immutable binding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a topic is malformed, a key is unknown, a
    /// template does not parse, the volume bounds are equal, or the device
    /// block has no identifier.
    pub fn validate(&self) -> Result<Binding, ConfigError> {
        let volume = VolumeRange::new(self.min_volume, self.max_volume)?;

        let global = self
            .value_template
            .as_deref()
            .map(|source| parse_template("value_template", source))
            .transpose()?;

        let mut inbound = BTreeMap::new();
        let mut commands = BTreeMap::new();
        let mut templates = BTreeMap::new();

        for (key, value) in &self.bindings {
            if let Some(slot) = InboundSlot::from_topic_key(key) {
                check_subscribe_topic(key, value)?;
                inbound.insert(slot, value.clone());
            } else if let Some(slot) = CommandSlot::from_topic_key(key) {
                check_publish_topic(key, value)?;
                commands.insert(slot, value.clone());
            } else if let Some(slot) = InboundSlot::from_template_key(key) {
                templates.insert(slot, parse_template(key, value)?);
            } else {
                return Err(ConfigError::UnknownKey(key.clone()));
            }
        }

        let availability = match &self.availability_topic {
            Some(topic) => {
                check_subscribe_topic("availability_topic", topic)?;
                Some(AvailabilityBinding::new(
                    topic.clone(),
                    self.payload_available.clone(),
                    self.payload_not_available.clone(),
                ))
            }
            None => None,
        };

        let json_attributes = match &self.json_attributes_topic {
            Some(topic) => {
                check_subscribe_topic("json_attributes_topic", topic)?;
                let template = self
                    .json_attributes_template
                    .as_deref()
                    .map(|source| parse_template("json_attributes_template", source))
                    .transpose()?;
                Some(JsonAttributesBinding::new(topic.clone(), template))
            }
            None => None,
        };

        if let Some(device) = &self.device
            && !device.has_identity()
        {
            return Err(ConfigError::DeviceWithoutIdentifier);
        }

        Ok(Binding {
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            qos: self.qos,
            retain: self.retain,
            send_if_off: self.send_if_off,
            volume,
            source_list: self.source_list.clone(),
            sound_mode_list: self.sound_mode_list.clone(),
            media_image_remotely_accessible: self.media_image_remotely_accessible,
            topics: TopicTable::new(inbound, commands),
            resolvers: ResolverTable::new(global, templates),
            availability,
            json_attributes,
            device: self.device.clone(),
        })
    }
}

fn parse_template(key: &str, source: &str) -> Result<Arc<dyn Render>, ConfigError> {
    let template = ValueTemplate::parse(source).map_err(|source| ConfigError::InvalidTemplate {
        key: key.to_string(),
        source,
    })?;
    Ok(Arc::new(template))
}

fn check_subscribe_topic(key: &str, topic: &str) -> Result<(), ConfigError> {
    subscribe_violation(topic).map_or(Ok(()), |reason| {
        Err(ConfigError::InvalidSubscribeTopic {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    })
}

fn check_publish_topic(key: &str, topic: &str) -> Result<(), ConfigError> {
    publish_violation(topic).map_or(Ok(()), |reason| {
        Err(ConfigError::InvalidPublishTopic {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    })
}

fn common_violation(topic: &str) -> Option<&'static str> {
    if topic.is_empty() {
        Some("topic is empty")
    } else if topic.contains('\0') {
        Some("topic contains a NUL character")
    } else if topic.len() > MAX_TOPIC_LEN {
        Some("topic is longer than 65535 bytes")
    } else {
        None
    }
}

/// Checks a topic filter: `#` must be a whole, final level and `+` a whole level.
fn subscribe_violation(topic: &str) -> Option<&'static str> {
    if let Some(reason) = common_violation(topic) {
        return Some(reason);
    }
    let mut levels = topic.split('/').peekable();
    while let Some(level) = levels.next() {
        if level.contains('#') {
            if level != "#" {
                return Some("'#' must occupy an entire level");
            }
            if levels.peek().is_some() {
                return Some("'#' must be the last level");
            }
        }
        if level.contains('+') && level != "+" {
            return Some("'+' must occupy an entire level");
        }
    }
    None
}

fn publish_violation(topic: &str) -> Option<&'static str> {
    if let Some(reason) = common_violation(topic) {
        return Some(reason);
    }
    if topic.contains(['#', '+']) {
        return Some("wildcards are not allowed in publish topics");
    }
    None
}
