// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `mqtt_media_player` - Bind MQTT topics to a media player entity.
//!
//! A device that speaks MQTT publishes its state (power, title, volume,
//! source, ...) to topics and listens for commands on others. This library
//! maps those topics onto a media player entity: inbound payloads become
//! typed attributes, host commands become publications.
//!
//! # Supported Features
//!
//! - **25 inbound attributes**: state, media metadata, volume, mute,
//!   shuffle, source and sound mode, app information
//! - **15 commands**: power, playback, seek, play media, source and sound
//!   mode selection, shuffle, mute and volume
//! - **Value templates**: per-attribute or global `{{ value_json.path }}`
//!   extraction
//! - **Availability, JSON attributes, device info and discovery**
//! - **Callbacks** notified on every state change
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mqtt_media_player::MediaPlayer;
//! use mqtt_media_player::config::MediaPlayerConfig;
//! use mqtt_media_player::protocol::MqttTransport;
//! use mqtt_media_player::slot::{CommandSlot, InboundSlot};
//! use mqtt_media_player::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> mqtt_media_player::Result<()> {
//!     let transport = Arc::new(
//!         MqttTransport::builder()
//!             .host("192.168.1.50")
//!             .port(1883)
//!             .build()
//!             .await?,
//!     );
//!
//!     let config = MediaPlayerConfig::new("Living Room")
//!         .with_topic(InboundSlot::State, "living/player/state")
//!         .with_topic(InboundSlot::VolumeLevel, "living/player/volume")
//!         .with_command_topic(CommandSlot::Play, "living/player/play")
//!         .with_command_topic(CommandSlot::VolumeLevel, "living/player/volume/set");
//!
//!     let player = MediaPlayer::new(config, transport)?;
//!     player.on_state_changed(|change| println!("{change:?}"));
//!     player.attach().await?;
//!
//!     player.play().await?;
//!     player.set_volume(0.3).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration From JSON
//!
//! [`MediaPlayerConfig`](config::MediaPlayerConfig) deserializes from the
//! same JSON a device publishes for discovery:
//!
//! ```
//! use mqtt_media_player::config::MediaPlayerConfig;
//!
//! let config = MediaPlayerConfig::from_json(r#"{
//!     "name": "Bedroom",
//!     "state_topic": "bedroom/state",
//!     "media_title_topic": "bedroom/info",
//!     "media_title_template": "{{ value_json.title }}",
//!     "source_list": ["Radio", "Bluetooth"]
//! }"#).unwrap();
//!
//! let binding = config.validate().unwrap();
//! assert_eq!(binding.name(), "Bedroom");
//! ```

pub mod binding;
mod capabilities;
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod protocol;
pub mod slot;
pub mod state;
pub mod subscription;
pub mod template;
pub mod types;

pub use capabilities::SupportedFeatures;
pub use command::{Command, Outcome, PlayMedia};
pub use entity::MediaPlayer;
pub use error::{ConfigError, Error, ProtocolError, Result, TemplateError, ValueError};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
