// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the media player binding.
//!
//! This module provides the error hierarchy for the library: configuration
//! validation, inbound value coercion, template parsing and transport
//! communication.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An inbound value could not be coerced to its attribute type.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The transport failed to subscribe, unsubscribe or publish.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A template source could not be parsed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

/// Errors raised while validating a media player configuration.
///
/// Validation failures are fatal: no entity is created from a configuration
/// that produced one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A subscribe topic violates the MQTT topic filter rules.
    #[error("invalid subscribe topic for {key}: {reason}")]
    InvalidSubscribeTopic {
        /// The configuration key holding the topic.
        key: String,
        /// Why the topic was rejected.
        reason: String,
    },

    /// A publish topic violates the MQTT topic name rules.
    #[error("invalid publish topic for {key}: {reason}")]
    InvalidPublishTopic {
        /// The configuration key holding the topic.
        key: String,
        /// Why the topic was rejected.
        reason: String,
    },

    /// The configuration contains a key that is not recognized.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// The QoS level is not 0, 1 or 2.
    #[error("invalid QoS level: {0}")]
    InvalidQos(u8),

    /// Both volume bounds are equal, so no scaling is possible.
    #[error("min_volume and max_volume must differ (both are {0})")]
    DegenerateVolumeRange(f64),

    /// The device block identifies no device.
    #[error("device must have at least one identifier or connection")]
    DeviceWithoutIdentifier,

    /// A template failed to parse.
    #[error("invalid template for {key}: {source}")]
    InvalidTemplate {
        /// The configuration key holding the template.
        key: String,
        /// The underlying parse error.
        source: TemplateError,
    },

    /// The discovery topic does not follow the discovery layout.
    #[error("invalid discovery topic: {0}")]
    InvalidDiscoveryTopic(String),

    /// The configuration payload is not valid JSON for this schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when an inbound value cannot be coerced.
///
/// These are fatal for the single message that produced them; the cached
/// value of the attribute is left unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The media track payload is not an integer.
    #[error("invalid media track: {0:?}")]
    InvalidTrack(String),

    /// The volume level payload is not a number.
    #[error("invalid volume level: {0:?}")]
    InvalidVolume(String),

    /// A volume fraction outside `[0.0, 1.0]` was requested.
    #[error("volume fraction {0} is out of range [0, 1]")]
    VolumeOutOfRange(f64),
}

/// Errors related to transport communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transport is no longer connected.
    #[error("transport is not connected")]
    NotConnected,
}

/// Errors in template source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening `{{` has no matching `}}`.
    #[error("unclosed expression starting at byte {0}")]
    Unclosed(usize),

    /// The expression inside `{{ }}` is not supported.
    #[error("unsupported expression: {0:?}")]
    UnsupportedExpression(String),

    /// A path accessor is malformed.
    #[error("malformed accessor in {0:?}")]
    MalformedAccessor(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidTrack("abc".to_string());
        assert_eq!(err.to_string(), "invalid media track: \"abc\"");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::InvalidVolume("loud".to_string()).into();
        assert!(matches!(err, Error::Value(ValueError::InvalidVolume(_))));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidPublishTopic {
            key: "play_command_topic".to_string(),
            reason: "wildcards are not allowed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid publish topic for play_command_topic: wildcards are not allowed"
        );
    }

    #[test]
    fn template_error_wraps_into_config_error() {
        let err = ConfigError::InvalidTemplate {
            key: "state_template".to_string(),
            source: TemplateError::Unclosed(3),
        };
        assert!(err.to_string().contains("unclosed expression"));
    }
}
