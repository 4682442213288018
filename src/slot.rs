// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named slots of device state and behavior.
//!
//! An [`InboundSlot`] is an attribute fed by a subscribe topic. A
//! [`CommandSlot`] is an action published to a command topic. Each slot
//! knows the configuration keys it is configured under.

use std::fmt;

use crate::capabilities::SupportedFeatures;

/// How a resolved inbound value is turned into a stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Stored as text.
    Text,
    /// Parsed as an integer; failure rejects the message.
    Integer,
    /// Parsed as a floating-point number; failure rejects the message.
    Float,
    /// Stored as text if it belongs to the slot's allow-list (when one is configured).
    AllowListed,
    /// Stored as the player state.
    State,
}

/// An attribute of the media player that is fed by a subscribe topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InboundSlot {
    /// Identifier of the running app.
    AppId,
    /// Name of the running app.
    AppName,
    /// Picture of the entity.
    EntityPicture,
    /// Album artist of the current media.
    MediaAlbumArtist,
    /// Album name of the current media.
    MediaAlbumName,
    /// Artist of the current media.
    MediaArtist,
    /// Channel currently playing.
    MediaChannel,
    /// Content identifier of the current media.
    MediaContentId,
    /// Content type of the current media.
    MediaContentType,
    /// Duration of the current media in seconds.
    MediaDuration,
    /// Episode of the current media.
    MediaEpisode,
    /// Image URL of the current media.
    MediaImageUrl,
    /// Playlist currently playing.
    MediaPlaylist,
    /// Playback position in seconds.
    MediaPosition,
    /// When the playback position was last valid.
    MediaPositionUpdatedAt,
    /// Season of the current media.
    MediaSeason,
    /// Series title of the current media.
    MediaSeriesTitle,
    /// Title of the current media.
    MediaTitle,
    /// Track number of the current media.
    MediaTrack,
    /// Whether shuffle is enabled.
    Shuffle,
    /// Current sound mode.
    SoundMode,
    /// Current input source.
    Source,
    /// Power/playback state.
    State,
    /// Raw device volume.
    VolumeLevel,
    /// Whether the volume is muted.
    VolumeMuted,
}

impl InboundSlot {
    /// Every inbound slot, in configuration order.
    pub const ALL: [Self; 25] = [
        Self::AppId,
        Self::AppName,
        Self::EntityPicture,
        Self::MediaAlbumArtist,
        Self::MediaAlbumName,
        Self::MediaArtist,
        Self::MediaChannel,
        Self::MediaContentId,
        Self::MediaContentType,
        Self::MediaDuration,
        Self::MediaEpisode,
        Self::MediaImageUrl,
        Self::MediaPlaylist,
        Self::MediaPosition,
        Self::MediaPositionUpdatedAt,
        Self::MediaSeason,
        Self::MediaSeriesTitle,
        Self::MediaTitle,
        Self::MediaTrack,
        Self::Shuffle,
        Self::SoundMode,
        Self::Source,
        Self::State,
        Self::VolumeLevel,
        Self::VolumeMuted,
    ];

    /// Returns the attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppId => "app_id",
            Self::AppName => "app_name",
            Self::EntityPicture => "entity_picture",
            Self::MediaAlbumArtist => "media_album_artist",
            Self::MediaAlbumName => "media_album_name",
            Self::MediaArtist => "media_artist",
            Self::MediaChannel => "media_channel",
            Self::MediaContentId => "media_content_id",
            Self::MediaContentType => "media_content_type",
            Self::MediaDuration => "media_duration",
            Self::MediaEpisode => "media_episode",
            Self::MediaImageUrl => "media_image_url",
            Self::MediaPlaylist => "media_playlist",
            Self::MediaPosition => "media_position",
            Self::MediaPositionUpdatedAt => "media_position_updated_at",
            Self::MediaSeason => "media_season",
            Self::MediaSeriesTitle => "media_series_title",
            Self::MediaTitle => "media_title",
            Self::MediaTrack => "media_track",
            Self::Shuffle => "shuffle",
            Self::SoundMode => "sound_mode",
            Self::Source => "source",
            Self::State => "state",
            Self::VolumeLevel => "volume_level",
            Self::VolumeMuted => "is_volume_muted",
        }
    }

    /// Returns the configuration key of the subscribe topic.
    #[must_use]
    pub const fn topic_key(&self) -> &'static str {
        match self {
            Self::AppId => "app_id_topic",
            Self::AppName => "app_name_topic",
            Self::EntityPicture => "entity_picture_topic",
            Self::MediaAlbumArtist => "media_album_artist_topic",
            Self::MediaAlbumName => "media_album_name_topic",
            Self::MediaArtist => "media_artist_topic",
            Self::MediaChannel => "media_channel_topic",
            Self::MediaContentId => "media_content_id_topic",
            Self::MediaContentType => "media_content_type_topic",
            Self::MediaDuration => "media_duration_topic",
            Self::MediaEpisode => "media_episode_topic",
            Self::MediaImageUrl => "media_image_url_topic",
            Self::MediaPlaylist => "media_playlist_topic",
            Self::MediaPosition => "media_position_topic",
            Self::MediaPositionUpdatedAt => "media_position_updated_at_topic",
            Self::MediaSeason => "media_season_topic",
            Self::MediaSeriesTitle => "media_series_title_topic",
            Self::MediaTitle => "media_title_topic",
            Self::MediaTrack => "media_track_topic",
            Self::Shuffle => "shuffle_topic",
            Self::SoundMode => "sound_mode_state_topic",
            Self::Source => "source_state_topic",
            Self::State => "state_topic",
            Self::VolumeLevel => "volume_level_topic",
            Self::VolumeMuted => "volume_mute_state_topic",
        }
    }

    /// Returns the configuration key of the slot-specific value template.
    #[must_use]
    pub const fn template_key(&self) -> &'static str {
        match self {
            Self::AppId => "app_id_template",
            Self::AppName => "app_name_template",
            Self::EntityPicture => "entity_picture_template",
            Self::MediaAlbumArtist => "media_album_artist_template",
            Self::MediaAlbumName => "media_album_name_template",
            Self::MediaArtist => "media_artist_template",
            Self::MediaChannel => "media_channel_template",
            Self::MediaContentId => "media_content_id_template",
            Self::MediaContentType => "media_content_type_template",
            Self::MediaDuration => "media_duration_template",
            Self::MediaEpisode => "media_episode_template",
            Self::MediaImageUrl => "media_image_url_template",
            Self::MediaPlaylist => "media_playlist_template",
            Self::MediaPosition => "media_position_template",
            Self::MediaPositionUpdatedAt => "media_position_updated_at_template",
            Self::MediaSeason => "media_season_template",
            Self::MediaSeriesTitle => "media_series_title_template",
            Self::MediaTitle => "media_title_template",
            Self::MediaTrack => "media_track_template",
            Self::Shuffle => "shuffle_template",
            Self::SoundMode => "sound_mode_state_template",
            Self::Source => "source_state_template",
            Self::State => "state_template",
            Self::VolumeLevel => "volume_level_template",
            Self::VolumeMuted => "volume_mute_state_template",
        }
    }

    /// Returns how resolved values for this slot are stored.
    #[must_use]
    pub const fn coercion(&self) -> Coercion {
        match self {
            Self::MediaTrack => Coercion::Integer,
            Self::VolumeLevel => Coercion::Float,
            Self::SoundMode | Self::Source => Coercion::AllowListed,
            Self::State => Coercion::State,
            _ => Coercion::Text,
        }
    }

    /// Looks up a slot by its subscribe-topic key.
    #[must_use]
    pub fn from_topic_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.topic_key() == key)
    }

    /// Looks up a slot by its template key.
    #[must_use]
    pub fn from_template_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.template_key() == key)
    }
}

impl fmt::Display for InboundSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action of the media player that is published to a command topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandSlot {
    /// Clear the playlist.
    ClearPlaylist,
    /// Skip to the next track.
    NextTrack,
    /// Pause playback. Also carries stop commands.
    Pause,
    /// Start playback.
    Play,
    /// Play a specific piece of media.
    PlayMedia,
    /// Go back to the previous track.
    PreviousTrack,
    /// Seek to a position.
    Seek,
    /// Enable or disable shuffle.
    Shuffle,
    /// Select a sound mode.
    SoundMode,
    /// Select an input source.
    Source,
    /// Stop playback. Only advertises the capability; see [`CommandSlot::Pause`].
    Stop,
    /// Switch the device off.
    TurnOff,
    /// Switch the device on.
    TurnOn,
    /// Set the volume.
    VolumeLevel,
    /// Mute or unmute.
    VolumeMute,
}

impl CommandSlot {
    /// Every command slot, in configuration order.
    pub const ALL: [Self; 15] = [
        Self::ClearPlaylist,
        Self::NextTrack,
        Self::Pause,
        Self::Play,
        Self::PlayMedia,
        Self::PreviousTrack,
        Self::Seek,
        Self::Shuffle,
        Self::SoundMode,
        Self::Source,
        Self::Stop,
        Self::TurnOff,
        Self::TurnOn,
        Self::VolumeLevel,
        Self::VolumeMute,
    ];

    /// Returns the configuration key of the command topic.
    #[must_use]
    pub const fn topic_key(&self) -> &'static str {
        match self {
            Self::ClearPlaylist => "clear_playlist_command_topic",
            Self::NextTrack => "next_track_command_topic",
            Self::Pause => "pause_command_topic",
            Self::Play => "play_command_topic",
            Self::PlayMedia => "play_media_command_topic",
            Self::PreviousTrack => "previous_track_command_topic",
            Self::Seek => "seek_command_topic",
            Self::Shuffle => "shuffle_command_topic",
            Self::SoundMode => "sound_mode_command_topic",
            Self::Source => "source_command_topic",
            Self::Stop => "stop_command_topic",
            Self::TurnOff => "turn_off_command_topic",
            Self::TurnOn => "turn_on_command_topic",
            Self::VolumeLevel => "volume_level_command_topic",
            Self::VolumeMute => "volume_mute_command_topic",
        }
    }

    /// Returns the capability advertised when this command has a topic.
    #[must_use]
    pub const fn feature(&self) -> SupportedFeatures {
        match self {
            Self::ClearPlaylist => SupportedFeatures::CLEAR_PLAYLIST,
            Self::NextTrack => SupportedFeatures::NEXT_TRACK,
            Self::Pause => SupportedFeatures::PAUSE,
            Self::Play => SupportedFeatures::PLAY,
            Self::PlayMedia => SupportedFeatures::PLAY_MEDIA,
            Self::PreviousTrack => SupportedFeatures::PREVIOUS_TRACK,
            Self::Seek => SupportedFeatures::SEEK,
            Self::Shuffle => SupportedFeatures::SHUFFLE_SET,
            Self::SoundMode => SupportedFeatures::SELECT_SOUND_MODE,
            Self::Source => SupportedFeatures::SELECT_SOURCE,
            Self::Stop => SupportedFeatures::STOP,
            Self::TurnOff => SupportedFeatures::TURN_OFF,
            Self::TurnOn => SupportedFeatures::TURN_ON,
            Self::VolumeLevel => SupportedFeatures::VOLUME_SET,
            Self::VolumeMute => SupportedFeatures::VOLUME_MUTE,
        }
    }

    /// Looks up a command slot by its topic key.
    #[must_use]
    pub fn from_topic_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.topic_key() == key)
    }
}

impl fmt::Display for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic_key().trim_end_matches("_command_topic"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn inbound_keys_are_unique() {
        let topics: HashSet<_> = InboundSlot::ALL.iter().map(InboundSlot::topic_key).collect();
        let templates: HashSet<_> = InboundSlot::ALL
            .iter()
            .map(InboundSlot::template_key)
            .collect();
        assert_eq!(topics.len(), InboundSlot::ALL.len());
        assert_eq!(templates.len(), InboundSlot::ALL.len());
    }

    #[test]
    fn command_keys_are_unique_and_distinct_from_inbound() {
        let commands: HashSet<_> = CommandSlot::ALL.iter().map(CommandSlot::topic_key).collect();
        assert_eq!(commands.len(), CommandSlot::ALL.len());
        for slot in InboundSlot::ALL {
            assert!(!commands.contains(slot.topic_key()));
        }
    }

    #[test]
    fn lookup_by_key() {
        assert_eq!(
            InboundSlot::from_topic_key("source_state_topic"),
            Some(InboundSlot::Source)
        );
        assert_eq!(
            InboundSlot::from_template_key("source_state_template"),
            Some(InboundSlot::Source)
        );
        assert_eq!(
            CommandSlot::from_topic_key("stop_command_topic"),
            Some(CommandSlot::Stop)
        );
        assert_eq!(InboundSlot::from_topic_key("stop_command_topic"), None);
    }

    #[test]
    fn coercions() {
        assert_eq!(InboundSlot::MediaTrack.coercion(), Coercion::Integer);
        assert_eq!(InboundSlot::VolumeLevel.coercion(), Coercion::Float);
        assert_eq!(InboundSlot::Source.coercion(), Coercion::AllowListed);
        assert_eq!(InboundSlot::SoundMode.coercion(), Coercion::AllowListed);
        assert_eq!(InboundSlot::MediaTitle.coercion(), Coercion::Text);
    }

    #[test]
    fn command_display() {
        assert_eq!(CommandSlot::PlayMedia.to_string(), "play_media");
        assert_eq!(InboundSlot::VolumeMuted.to_string(), "is_volume_muted");
    }
}
