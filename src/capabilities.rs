// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Media player capability flags.
//!
//! The host learns which commands an entity accepts through a bitmask of
//! feature flags. For an MQTT-bound player the mask is derived entirely from
//! configuration: a command is supported exactly when its command topic is
//! present.
//!
//! The numeric values are those of the host's media player domain, so the
//! mask can be handed over unchanged.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Capability bitmask of a media player.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::SupportedFeatures;
///
/// let features = SupportedFeatures::PLAY | SupportedFeatures::PAUSE;
/// assert!(features.contains(SupportedFeatures::PLAY));
/// assert!(!features.contains(SupportedFeatures::STOP));
/// assert_eq!(features.bits(), 16385);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    /// Pause playback.
    pub const PAUSE: Self = Self(1);
    /// Seek within the current media.
    pub const SEEK: Self = Self(2);
    /// Set the volume level.
    pub const VOLUME_SET: Self = Self(4);
    /// Mute the volume.
    pub const VOLUME_MUTE: Self = Self(8);
    /// Go to the previous track.
    pub const PREVIOUS_TRACK: Self = Self(16);
    /// Go to the next track.
    pub const NEXT_TRACK: Self = Self(32);
    /// Switch the device on.
    pub const TURN_ON: Self = Self(128);
    /// Switch the device off.
    pub const TURN_OFF: Self = Self(256);
    /// Play a specific piece of media.
    pub const PLAY_MEDIA: Self = Self(512);
    /// Select an input source.
    pub const SELECT_SOURCE: Self = Self(2048);
    /// Stop playback.
    pub const STOP: Self = Self(4096);
    /// Clear the playlist.
    pub const CLEAR_PLAYLIST: Self = Self(8192);
    /// Start playback.
    pub const PLAY: Self = Self(16384);
    /// Enable or disable shuffle.
    pub const SHUFFLE_SET: Self = Self(32768);
    /// Select a sound mode.
    pub const SELECT_SOUND_MODE: Self = Self(65536);

    /// An empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns whether every flag of `other` is set.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether no flag is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SupportedFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SupportedFeatures {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl FromIterator<SupportedFeatures> for SupportedFeatures {
    fn from_iter<I: IntoIterator<Item = SupportedFeatures>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |acc, f| acc | f)
    }
}

impl fmt::Display for SupportedFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contains_nothing() {
        let features = SupportedFeatures::empty();
        assert!(features.is_empty());
        assert!(!features.contains(SupportedFeatures::PLAY));
        assert!(features.contains(SupportedFeatures::empty()));
    }

    #[test]
    fn or_assign_accumulates() {
        let mut features = SupportedFeatures::empty();
        features |= SupportedFeatures::TURN_ON;
        features |= SupportedFeatures::TURN_OFF;
        assert_eq!(features.bits(), 384);
    }

    #[test]
    fn collect_from_iterator() {
        let features: SupportedFeatures = [SupportedFeatures::SEEK, SupportedFeatures::STOP]
            .into_iter()
            .collect();
        assert_eq!(
            features,
            SupportedFeatures::SEEK | SupportedFeatures::STOP
        );
    }

    #[test]
    fn and_masks() {
        let features = SupportedFeatures::PLAY | SupportedFeatures::PAUSE;
        assert_eq!(features & SupportedFeatures::PAUSE, SupportedFeatures::PAUSE);
    }
}
