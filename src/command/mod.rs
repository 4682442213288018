// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Media player commands.
//!
//! A [`Command`] is what the host asks the player to do. Planning a command
//! against a [`Binding`] yields a [`Publication`]: the command slot, the
//! payload, and the optimistic state update to apply once published. The
//! [`CommandDispatcher`] then applies the publish gate and talks to the
//! transport.
//!
//! # Wire format
//!
//! | Command | Slot | Payload | Optimistic update |
//! |---------|------|---------|-------------------|
//! | [`Command::TurnOn`] | `turn_on` | `on` | state `on` |
//! | [`Command::TurnOff`] | `turn_off` | `off` | state `off` (always) |
//! | [`Command::Play`] | `play` | empty | state `playing` |
//! | [`Command::Pause`] | `pause` | empty | state `on` |
//! | [`Command::Stop`] | `pause` | empty | state `on` |
//! | [`Command::NextTrack`] | `next_track` | empty | - |
//! | [`Command::PreviousTrack`] | `previous_track` | empty | - |
//! | [`Command::Seek`] | `seek` | position | - |
//! | [`Command::PlayMedia`] | `play_media` | JSON object | - |
//! | [`Command::SelectSource`] | `source` | source name | source |
//! | [`Command::SelectSoundMode`] | `sound_mode` | sound mode | sound mode |
//! | [`Command::ClearPlaylist`] | `clear_playlist` | empty | - |
//! | [`Command::SetShuffle`] | `shuffle` | `True` / `False` | shuffle |
//! | [`Command::Mute`] | `volume_mute` | `True` / `False` | muted |
//! | [`Command::SetVolume`] | `volume_level` | scaled volume | volume |
//!
//! Stop shares the pause topic, so a device cannot tell the two apart. A
//! configured stop topic only advertises the capability.
//!
//! # Examples
//!
//! ```
//! use mqtt_media_player::command::Command;
//! use mqtt_media_player::config::MediaPlayerConfig;
//! use mqtt_media_player::slot::CommandSlot;
//!
//! let binding = MediaPlayerConfig::new("Player")
//!     .with_volume_range(0.0, 60.0)
//!     .validate()
//!     .unwrap();
//!
//! let publication = Command::SetVolume(0.5).plan(&binding).unwrap().unwrap();
//! assert_eq!(publication.slot, CommandSlot::VolumeLevel);
//! assert_eq!(publication.payload, "30.0");
//! ```

mod dispatcher;

pub use dispatcher::{CommandDispatcher, Outcome, SkipReason};

use std::fmt;

use serde_json::{Map, Value};

use crate::binding::Binding;
use crate::error::ValueError;
use crate::slot::{CommandSlot, InboundSlot};
use crate::state::{AttributeValue, StateChange};
use crate::types::{PlayerState, VolumeRange};

/// Payload published by [`Command::TurnOn`].
pub const PAYLOAD_ON: &str = "on";

/// Payload published by [`Command::TurnOff`].
pub const PAYLOAD_OFF: &str = "off";

/// A request to play a specific piece of media.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayMedia {
    /// Media content type, e.g. `music`.
    pub media_type: String,
    /// Media content identifier, e.g. a URL.
    pub media_id: String,
    /// Extra fields merged into the published object.
    pub extra: Map<String, Value>,
}

impl PlayMedia {
    /// Creates a request without extra fields.
    #[must_use]
    pub fn new(media_type: impl Into<String>, media_id: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            media_id: media_id.into(),
            extra: Map::new(),
        }
    }

    /// Adds an extra field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Renders the published JSON object.
    ///
    /// `media_type` and `media_id` win over extra fields of the same name.
    #[must_use]
    pub fn to_payload(&self) -> String {
        let mut object = self.extra.clone();
        object.insert("media_type".to_string(), Value::from(self.media_type.as_str()));
        object.insert("media_id".to_string(), Value::from(self.media_id.as_str()));
        Value::Object(object).to_string()
    }
}

/// A host command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the device on.
    TurnOn,
    /// Switch the device off.
    TurnOff,
    /// Start playback.
    Play,
    /// Pause playback.
    Pause,
    /// Stop playback.
    Stop,
    /// Skip to the next track.
    NextTrack,
    /// Go back to the previous track.
    PreviousTrack,
    /// Seek to a position in seconds.
    Seek(f64),
    /// Play a specific piece of media.
    PlayMedia(PlayMedia),
    /// Select an input source.
    SelectSource(String),
    /// Select a sound mode.
    SelectSoundMode(String),
    /// Clear the playlist.
    ClearPlaylist,
    /// Enable or disable shuffle.
    SetShuffle(bool),
    /// Mute or unmute.
    Mute(bool),
    /// Set the volume as a fraction between 0.0 and 1.0.
    SetVolume(f64),
}

/// A planned publication.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    /// Command slot whose topic is published to.
    pub slot: CommandSlot,
    /// Payload to publish.
    pub payload: String,
    /// Optimistic update applied once the payload is published.
    pub local_update: Option<StateChange>,
}

impl Publication {
    /// Creates a publication without a local update.
    #[must_use]
    pub fn new(slot: CommandSlot, payload: impl Into<String>) -> Self {
        Self {
            slot,
            payload: payload.into(),
            local_update: None,
        }
    }

    /// Attaches an optimistic update.
    #[must_use]
    pub fn with_update(mut self, change: StateChange) -> Self {
        self.local_update = Some(change);
        self
    }
}

impl Command {
    /// Returns the command slot whose topic carries this command.
    ///
    /// This is [`CommandSlot::Pause`] for [`Command::Stop`].
    #[must_use]
    pub const fn slot(&self) -> CommandSlot {
        match self {
            Self::TurnOn => CommandSlot::TurnOn,
            Self::TurnOff => CommandSlot::TurnOff,
            Self::Play => CommandSlot::Play,
            Self::Pause | Self::Stop => CommandSlot::Pause,
            Self::NextTrack => CommandSlot::NextTrack,
            Self::PreviousTrack => CommandSlot::PreviousTrack,
            Self::Seek(_) => CommandSlot::Seek,
            Self::PlayMedia(_) => CommandSlot::PlayMedia,
            Self::SelectSource(_) => CommandSlot::Source,
            Self::SelectSoundMode(_) => CommandSlot::SoundMode,
            Self::ClearPlaylist => CommandSlot::ClearPlaylist,
            Self::SetShuffle(_) => CommandSlot::Shuffle,
            Self::Mute(_) => CommandSlot::VolumeMute,
            Self::SetVolume(_) => CommandSlot::VolumeLevel,
        }
    }

    /// Plans the publication of this command.
    ///
    /// Returns `Ok(None)` when a source or sound mode is not in its
    /// (non-empty) allow-list, or when no allow-list is configured.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::VolumeOutOfRange` if a volume fraction is not
    /// within `[0.0, 1.0]`.
    pub fn plan(&self, binding: &Binding) -> Result<Option<Publication>, ValueError> {
        let slot = self.slot();
        let publication = match self {
            Self::TurnOn => Publication::new(slot, PAYLOAD_ON)
                .with_update(StateChange::state(PlayerState::On)),
            Self::TurnOff => Publication::new(slot, PAYLOAD_OFF)
                .with_update(StateChange::state(PlayerState::Off)),
            Self::Play => {
                Publication::new(slot, "").with_update(StateChange::state(PlayerState::Playing))
            }
            Self::Pause | Self::Stop => {
                Publication::new(slot, "").with_update(StateChange::state(PlayerState::On))
            }
            Self::NextTrack | Self::PreviousTrack | Self::ClearPlaylist => {
                Publication::new(slot, "")
            }
            Self::Seek(position) => Publication::new(slot, format_number(*position)),
            Self::PlayMedia(media) => Publication::new(slot, media.to_payload()),
            Self::SelectSource(source) => {
                if !is_listed(binding.source_list(), source) {
                    return Ok(None);
                }
                Publication::new(slot, source.as_str())
                    .with_update(text_update(InboundSlot::Source, source))
            }
            Self::SelectSoundMode(mode) => {
                if !is_listed(binding.sound_mode_list(), mode) {
                    return Ok(None);
                }
                Publication::new(slot, mode.as_str())
                    .with_update(text_update(InboundSlot::SoundMode, mode))
            }
            Self::SetShuffle(shuffle) => Publication::new(slot, format_flag(*shuffle)).with_update(
                StateChange::attribute(InboundSlot::Shuffle, AttributeValue::Bool(*shuffle)),
            ),
            Self::Mute(mute) => Publication::new(slot, format_flag(*mute)).with_update(
                StateChange::attribute(InboundSlot::VolumeMuted, AttributeValue::Bool(*mute)),
            ),
            Self::SetVolume(fraction) => {
                let fraction = VolumeRange::check_fraction(*fraction)?;
                // Caches the fraction, not the device value.
                Publication::new(slot, format_number(binding.volume().to_device(fraction)))
                    .with_update(StateChange::attribute(
                        InboundSlot::VolumeLevel,
                        AttributeValue::Float(fraction),
                    ))
            }
        };
        Ok(Some(publication))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn => f.write_str("turn_on"),
            Self::TurnOff => f.write_str("turn_off"),
            Self::Play => f.write_str("play"),
            Self::Pause => f.write_str("pause"),
            Self::Stop => f.write_str("stop"),
            Self::NextTrack => f.write_str("next_track"),
            Self::PreviousTrack => f.write_str("previous_track"),
            Self::Seek(position) => write!(f, "seek({position})"),
            Self::PlayMedia(media) => write!(f, "play_media({}, {})", media.media_type, media.media_id),
            Self::SelectSource(source) => write!(f, "select_source({source})"),
            Self::SelectSoundMode(mode) => write!(f, "select_sound_mode({mode})"),
            Self::ClearPlaylist => f.write_str("clear_playlist"),
            Self::SetShuffle(shuffle) => write!(f, "set_shuffle({shuffle})"),
            Self::Mute(mute) => write!(f, "mute({mute})"),
            Self::SetVolume(volume) => write!(f, "set_volume({volume})"),
        }
    }
}

fn is_listed(list: Option<&[String]>, value: &str) -> bool {
    list.is_some_and(|list| list.iter().any(|item| item == value))
}

fn text_update(slot: InboundSlot, value: &str) -> StateChange {
    StateChange::attribute(slot, AttributeValue::Text(value.to_string()))
}

/// Formats a flag as `True` or `False`.
fn format_flag(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

/// Formats a number, keeping one decimal for whole values (`30.0`).
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaPlayerConfig;

    fn binding() -> Binding {
        MediaPlayerConfig::new("Player")
            .with_source_list(["TV", "Radio"])
            .validate()
            .unwrap()
    }

    #[test]
    fn stop_uses_pause_slot() {
        assert_eq!(Command::Stop.slot(), CommandSlot::Pause);
        let pause = Command::Pause.plan(&binding()).unwrap().unwrap();
        let stop = Command::Stop.plan(&binding()).unwrap().unwrap();
        assert_eq!(pause, stop);
    }

    #[test]
    fn play_sets_playing() {
        let publication = Command::Play.plan(&binding()).unwrap().unwrap();
        assert_eq!(publication.payload, "");
        assert_eq!(
            publication.local_update,
            Some(StateChange::state(PlayerState::Playing))
        );
    }

    #[test]
    fn source_must_be_listed() {
        let binding = binding();
        assert!(
            Command::SelectSource("TV".into())
                .plan(&binding)
                .unwrap()
                .is_some()
        );
        assert!(
            Command::SelectSource("USB".into())
                .plan(&binding)
                .unwrap()
                .is_none()
        );
        // No sound mode list configured
        assert!(
            Command::SelectSoundMode("Movie".into())
                .plan(&binding)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn volume_is_scaled_and_checked() {
        let binding = MediaPlayerConfig::new("Player")
            .with_volume_range(10.0, 30.0)
            .validate()
            .unwrap();
        let publication = Command::SetVolume(0.25).plan(&binding).unwrap().unwrap();
        assert_eq!(publication.payload, "15.0");
        assert_eq!(
            publication.local_update,
            Some(StateChange::attribute(
                InboundSlot::VolumeLevel,
                AttributeValue::Float(0.25)
            ))
        );

        assert_eq!(
            Command::SetVolume(1.5).plan(&binding),
            Err(ValueError::VolumeOutOfRange(1.5))
        );
    }

    #[test]
    fn flags_and_numbers() {
        let binding = binding();
        let mute = Command::Mute(true).plan(&binding).unwrap().unwrap();
        assert_eq!(mute.payload, "True");
        let shuffle = Command::SetShuffle(false).plan(&binding).unwrap().unwrap();
        assert_eq!(shuffle.payload, "False");
        let seek = Command::Seek(42.5).plan(&binding).unwrap().unwrap();
        assert_eq!(seek.payload, "42.5");
        assert_eq!(format_number(12.0), "12.0");
    }

    #[test]
    fn play_media_payload() {
        let media = PlayMedia::new("music", "http://radio/stream")
            .with_extra("enqueue", true)
            .with_extra("media_type", "ignored");
        let payload: Value = serde_json::from_str(&media.to_payload()).unwrap();
        assert_eq!(payload["media_type"], "music");
        assert_eq!(payload["media_id"], "http://radio/stream");
        assert_eq!(payload["enqueue"], true);
    }

    #[test]
    fn display_names() {
        assert_eq!(Command::NextTrack.to_string(), "next_track");
        assert_eq!(Command::Mute(true).to_string(), "mute(true)");
    }
}
