// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry information.

use serde::{Deserialize, Deserializer, Serialize};

/// Description of the physical device behind an entity.
///
/// The block is passed through to the host untouched. Validation only
/// requires it to carry at least one identifier or connection.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::entity::DeviceInfo;
///
/// let device: DeviceInfo = serde_json::from_str(
///     r#"{"identifiers": "kitchen-speaker", "manufacturer": "Acme"}"#,
/// ).unwrap();
/// assert_eq!(device.identifiers, vec!["kitchen-speaker".to_string()]);
/// assert!(device.has_identity());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Identifiers of the device. A single string is accepted.
    #[serde(default, deserialize_with = "identifiers")]
    pub identifiers: Vec<String>,

    /// Connections as `(type, value)` pairs, such as a MAC address.
    #[serde(default)]
    pub connections: Vec<(String, String)>,

    /// Manufacturer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Device name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Firmware version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,

    /// Identifier of the device this one is connected through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_device: Option<String>,
}

impl DeviceInfo {
    /// Adds an identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifiers.push(identifier.into());
        self
    }

    /// Adds a connection.
    #[must_use]
    pub fn with_connection(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.connections.push((kind.into(), value.into()));
        self
    }

    /// Sets the manufacturer.
    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the firmware version.
    #[must_use]
    pub fn with_sw_version(mut self, version: impl Into<String>) -> Self {
        self.sw_version = Some(version.into());
        self
    }

    /// Returns whether the device can be identified.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.identifiers.is_empty() || !self.connections.is_empty()
    }
}

fn identifiers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(crate::config::one_or_many(deserializer)?.unwrap_or_default())
}
