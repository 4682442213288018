// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power/playback state of a media player.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The logical state of the media player.
///
/// The state arrives as free text from the device, so any value that is
/// not one of the well-known states is kept verbatim in [`PlayerState::Other`].
///
/// # Examples
///
/// ```
/// use mqtt_media_player::types::PlayerState;
///
/// let state: PlayerState = "playing".parse().unwrap();
/// assert_eq!(state, PlayerState::Playing);
/// assert_eq!(PlayerState::Off.as_str(), "off");
///
/// let custom: PlayerState = "buffering".parse().unwrap();
/// assert_eq!(custom.as_str(), "buffering");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// The device is switched off.
    Off,
    /// The device is on (idle).
    On,
    /// Media is playing.
    Playing,
    /// Playback is paused.
    Paused,
    /// The device is idle.
    Idle,
    /// The device is in standby.
    Standby,
    /// Any other state text reported by the device.
    Other(String),
}

impl PlayerState {
    /// Returns the textual representation used on the wire and by the host.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Idle => "idle",
            Self::Standby => "standby",
            Self::Other(text) => text,
        }
    }

    /// Returns `true` for the logical "off" state.
    #[must_use]
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerState {
    type Err = Infallible;

    // Matching is exact: the host compares states case-sensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "off" => Self::Off,
            "on" => Self::On,
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "idle" => Self::Idle,
            "standby" => Self::Standby,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for PlayerState {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}
