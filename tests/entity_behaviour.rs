// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Behaviour of the media player entity over the loopback transport.

use std::sync::Arc;

use mqtt_media_player::config::MediaPlayerConfig;
use mqtt_media_player::entity::DeviceInfo;
use mqtt_media_player::protocol::{LoopbackTransport, Transport, TransportOp};
use mqtt_media_player::slot::{CommandSlot, InboundSlot};
use mqtt_media_player::state::{AttributeValue, StateChange};
use mqtt_media_player::subscription::Subscribable;
use mqtt_media_player::types::{PlayerState, QosLevel};
use mqtt_media_player::{Error, MediaPlayer, PlayMedia, SupportedFeatures, ValueError};
use parking_lot::Mutex;

type Player = MediaPlayer<LoopbackTransport>;

async fn attached(config: MediaPlayerConfig) -> (Arc<LoopbackTransport>, Player) {
    let transport = Arc::new(LoopbackTransport::new());
    let player = MediaPlayer::new(config, Arc::clone(&transport)).unwrap();
    player.attach().await.unwrap();
    (transport, player)
}

fn record_changes(player: &Player) -> Arc<Mutex<Vec<StateChange>>> {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    player.on_state_changed(move |change| sink.lock().push(change.clone()));
    changes
}

// ============================================================================
// Value resolution
// ============================================================================

mod resolution {
    use super::*;

    #[tokio::test]
    async fn payload_is_stored_verbatim_without_template() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::MediaTitle, "p/title")
                .with_topic(InboundSlot::MediaArtist, "p/artist"),
        )
        .await;

        for payload in ["So What", "  spaced  ", r#"{"title": "json"}"#, ""] {
            transport.inject("p/title", payload).unwrap();
            assert_eq!(player.media_title().as_deref(), Some(payload));
        }
        assert_eq!(player.media_artist(), None);
    }

    #[tokio::test]
    async fn slot_template_overrides_global_template() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_value_template("{{ value_json.value }}")
                .with_topic(InboundSlot::MediaTitle, "p/info")
                .with_topic(InboundSlot::MediaArtist, "p/info")
                .with_template(InboundSlot::MediaArtist, "{{ value_json.artist }}"),
        )
        .await;

        transport
            .inject("p/info", r#"{"value": "Freddie Freeloader", "artist": "Miles Davis"}"#)
            .unwrap();

        assert_eq!(player.media_title().as_deref(), Some("Freddie Freeloader"));
        assert_eq!(player.media_artist().as_deref(), Some("Miles Davis"));
    }

    #[tokio::test]
    async fn track_number_is_coerced() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_topic(InboundSlot::MediaTrack, "p/track"),
        )
        .await;

        transport.inject("p/track", "7").unwrap();
        assert_eq!(player.media_track(), Some(7));

        let err = transport.inject("p/track", "abc").unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidTrack(ref v)) if v == "abc"));
        assert_eq!(player.media_track(), Some(7));

        // Later messages are still processed
        transport.inject("p/track", "8").unwrap();
        assert_eq!(player.media_track(), Some(8));
    }

    #[tokio::test]
    async fn bad_volume_keeps_last_good_value() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_topic(InboundSlot::VolumeLevel, "p/volume"),
        )
        .await;

        transport.inject("p/volume", "40").unwrap();
        assert!(matches!(
            transport.inject("p/volume", "loud"),
            Err(Error::Value(ValueError::InvalidVolume(_)))
        ));
        assert_eq!(
            player.attribute(InboundSlot::VolumeLevel),
            Some(AttributeValue::Float(40.0))
        );
    }

    #[tokio::test]
    async fn unlisted_source_is_rejected_silently() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::Source, "p/source")
                .with_source_list(["TV", "Radio"]),
        )
        .await;
        let changes = record_changes(&player);

        transport.inject("p/source", "TV").unwrap();
        transport.inject("p/source", "USB").unwrap();

        assert_eq!(player.source().as_deref(), Some("TV"));
        assert_eq!(changes.lock().len(), 1);
    }

    #[tokio::test]
    async fn source_accepted_without_allow_list() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::SoundMode, "p/mode")
                .with_sound_mode_list(Vec::<String>::new()),
        )
        .await;

        transport.inject("p/mode", "Anything").unwrap();
        assert_eq!(player.sound_mode().as_deref(), Some("Anything"));
    }

    #[tokio::test]
    async fn source_template_uses_template_key() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::Source, "p/source")
                .with_template(InboundSlot::Source, "{{ value_json.input }}")
                .with_source_list(["HDMI 1"]),
        )
        .await;

        transport.inject("p/source", r#"{"input": "HDMI 1"}"#).unwrap();
        assert_eq!(player.source().as_deref(), Some("HDMI 1"));
    }

    #[tokio::test]
    async fn state_flags_and_text_slots() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::State, "p/state")
                .with_topic(InboundSlot::Shuffle, "p/shuffle")
                .with_topic(InboundSlot::VolumeMuted, "p/muted")
                .with_topic(InboundSlot::AppName, "p/app"),
        )
        .await;

        transport.inject("p/state", "paused").unwrap();
        transport.inject("p/shuffle", "true").unwrap();
        transport.inject("p/muted", "false").unwrap();
        transport.inject("p/app", "Radio").unwrap();

        assert_eq!(player.state(), Some(PlayerState::Paused));
        assert_eq!(player.shuffle(), Some(true));
        assert_eq!(player.is_volume_muted(), Some(false));
        assert_eq!(player.app_name().as_deref(), Some("Radio"));
        assert!(player.last_updated().is_some());
    }
}

// ============================================================================
// Commands
// ============================================================================

mod commands {
    use super::*;

    fn full_config() -> MediaPlayerConfig {
        let mut config = MediaPlayerConfig::new("Player")
            .with_topic(InboundSlot::State, "p/state")
            .with_source_list(["TV", "Radio"])
            .with_sound_mode_list(["Movie"])
            .with_volume_range(0.0, 60.0);
        for slot in [
            CommandSlot::ClearPlaylist,
            CommandSlot::NextTrack,
            CommandSlot::Pause,
            CommandSlot::Play,
            CommandSlot::PlayMedia,
            CommandSlot::PreviousTrack,
            CommandSlot::Seek,
            CommandSlot::Shuffle,
            CommandSlot::SoundMode,
            CommandSlot::Source,
            CommandSlot::Stop,
            CommandSlot::TurnOff,
            CommandSlot::TurnOn,
            CommandSlot::VolumeLevel,
            CommandSlot::VolumeMute,
        ] {
            config = config.with_command_topic(slot, format!("p/cmd/{slot}"));
        }
        config
    }

    #[tokio::test]
    async fn set_volume_scales_and_round_trips() {
        let (transport, player) = attached(
            full_config().with_topic(InboundSlot::VolumeLevel, "p/volume"),
        )
        .await;

        for v in [0.25, 0.5, 1.0] {
            player.set_volume(v).await.unwrap();
            let published = transport.published_to("p/cmd/volume_level");
            let wire = published.last().unwrap().clone();
            let raw: f64 = wire.parse().unwrap();
            assert!((raw - v * 60.0).abs() < 1e-9, "{wire}");

            transport.inject("p/volume", wire).unwrap();
            assert!((player.volume_level().unwrap() - v).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn set_volume_caches_fraction() {
        let (_, player) = attached(full_config()).await;
        player.set_volume(0.5).await.unwrap();
        assert_eq!(
            player.attribute(InboundSlot::VolumeLevel),
            Some(AttributeValue::Float(0.5))
        );
    }

    #[tokio::test]
    async fn set_volume_out_of_range_fails() {
        let (transport, player) = attached(full_config()).await;
        assert!(matches!(
            player.set_volume(1.2).await,
            Err(Error::Value(ValueError::VolumeOutOfRange(_)))
        ));
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn unlisted_source_is_not_published() {
        let (transport, player) = attached(full_config()).await;

        let outcome = player.select_source("USB").await.unwrap();
        assert!(!outcome.is_published());
        assert!(transport.published().is_empty());
        assert_eq!(player.source(), None);

        player.select_source("Radio").await.unwrap();
        assert_eq!(transport.published_to("p/cmd/source"), vec!["Radio".to_string()]);
        assert_eq!(player.source().as_deref(), Some("Radio"));

        player.select_sound_mode("Movie").await.unwrap();
        assert_eq!(player.sound_mode().as_deref(), Some("Movie"));
    }

    #[tokio::test]
    async fn pause_and_stop_share_the_pause_topic() {
        let (transport, player) = attached(full_config()).await;

        player.pause().await.unwrap();
        player.stop().await.unwrap();

        assert_eq!(
            transport.published_to("p/cmd/pause"),
            vec![String::new(), String::new()]
        );
        assert!(transport.published_to("p/cmd/stop").is_empty());
        assert_eq!(player.state(), Some(PlayerState::On));
    }

    #[tokio::test]
    async fn power_commands() {
        let (transport, player) = attached(full_config()).await;

        player.turn_on().await.unwrap();
        assert_eq!(player.state(), Some(PlayerState::On));
        player.turn_off().await.unwrap();
        assert_eq!(player.state(), Some(PlayerState::Off));

        assert_eq!(transport.published_to("p/cmd/turn_on"), vec!["on".to_string()]);
        assert_eq!(transport.published_to("p/cmd/turn_off"), vec!["off".to_string()]);
    }

    #[tokio::test]
    async fn turn_off_without_topic_sets_off() {
        let (transport, player) = attached(MediaPlayerConfig::new("Player")).await;
        assert_eq!(player.state(), Some(PlayerState::On));

        player.turn_off().await.unwrap();
        assert_eq!(player.state(), Some(PlayerState::Off));
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn commands_dropped_while_off_unless_send_if_off() {
        let (transport, player) = attached(full_config().with_send_if_off(false)).await;
        transport.inject("p/state", "off").unwrap();

        let outcome = player.play().await.unwrap();
        assert!(!outcome.is_published());
        assert!(transport.published().is_empty());
        assert_eq!(player.state(), Some(PlayerState::Off));

        // Default policy sends regardless
        let (transport, player) = attached(full_config()).await;
        transport.inject("p/state", "off").unwrap();
        assert!(player.play().await.unwrap().is_published());
        assert_eq!(player.state(), Some(PlayerState::Playing));
    }

    #[tokio::test]
    async fn simple_commands_publish_payloads() {
        let (transport, player) = attached(full_config()).await;

        player.next_track().await.unwrap();
        player.previous_track().await.unwrap();
        player.clear_playlist().await.unwrap();
        player.seek(93.5).await.unwrap();
        player.set_shuffle(true).await.unwrap();
        player.mute(false).await.unwrap();

        assert_eq!(transport.published_to("p/cmd/next_track"), vec![String::new()]);
        assert_eq!(transport.published_to("p/cmd/previous_track"), vec![String::new()]);
        assert_eq!(transport.published_to("p/cmd/clear_playlist"), vec![String::new()]);
        assert_eq!(transport.published_to("p/cmd/seek"), vec!["93.5".to_string()]);
        assert_eq!(transport.published_to("p/cmd/shuffle"), vec!["True".to_string()]);
        assert_eq!(transport.published_to("p/cmd/volume_mute"), vec!["False".to_string()]);

        assert_eq!(player.shuffle(), Some(true));
        assert_eq!(player.is_volume_muted(), Some(false));
    }

    #[tokio::test]
    async fn play_media_publishes_object() {
        let (transport, player) = attached(full_config()).await;

        player
            .play_media(PlayMedia::new("music", "http://radio/stream").with_extra("enqueue", "add"))
            .await
            .unwrap();

        let published = transport.published_to("p/cmd/play_media");
        let payload: serde_json::Value = serde_json::from_str(&published[0]).unwrap();
        assert_eq!(payload["media_type"], "music");
        assert_eq!(payload["media_id"], "http://radio/stream");
        assert_eq!(payload["enqueue"], "add");
    }

    #[tokio::test]
    async fn optimistic_updates_notify_host() {
        let (_, player) = attached(full_config()).await;
        let changes = record_changes(&player);

        player.play().await.unwrap();
        player.next_track().await.unwrap();

        assert_eq!(
            *changes.lock(),
            vec![StateChange::state(PlayerState::Playing)]
        );
    }

    #[tokio::test]
    async fn publications_use_qos_and_retain() {
        let (transport, player) = attached(
            full_config()
                .with_qos(QosLevel::ExactlyOnce)
                .with_retain(true),
        )
        .await;

        player.play().await.unwrap();
        let published = transport.published();
        assert_eq!(published[0].qos, QosLevel::ExactlyOnce);
        assert!(published[0].retain);
    }
}

// ============================================================================
// Capabilities
// ============================================================================

mod capabilities {
    use super::*;

    #[tokio::test]
    async fn features_follow_command_topics() {
        let (_, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_command_topic(CommandSlot::Play, "p/play")
                .with_command_topic(CommandSlot::Pause, "p/pause"),
        )
        .await;

        assert_eq!(
            player.supported_features(),
            SupportedFeatures::PLAY | SupportedFeatures::PAUSE
        );
    }

    #[tokio::test]
    async fn no_command_topics_no_features() {
        let (_, player) = attached(MediaPlayerConfig::new("Player")).await;
        assert_eq!(player.supported_features(), SupportedFeatures::empty());
    }
}

// ============================================================================
// Reconfiguration
// ============================================================================

mod reconfiguration {
    use super::*;

    #[tokio::test]
    async fn rebind_drops_old_topics_first() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::MediaTitle, "old/title")
                .with_topic(InboundSlot::State, "shared/state"),
        )
        .await;
        transport.clear_log();

        player
            .discovery_update(
                MediaPlayerConfig::new("Player")
                    .with_topic(InboundSlot::MediaTitle, "new/title")
                    .with_topic(InboundSlot::State, "shared/state"),
            )
            .await
            .unwrap();

        let ops = transport.operations();
        let first_subscribe = ops
            .iter()
            .position(|op| matches!(op, TransportOp::Subscribe { .. }))
            .unwrap();
        assert!(
            ops[..first_subscribe]
                .iter()
                .all(|op| matches!(op, TransportOp::Unsubscribe { .. }))
        );
        assert_eq!(first_subscribe, 2);

        let mut topics = transport.subscriptions();
        topics.sort();
        assert_eq!(topics, vec!["new/title".to_string(), "shared/state".to_string()]);

        // A shared topic is handled exactly once
        let changes = record_changes(&player);
        transport.inject("shared/state", "playing").unwrap();
        assert_eq!(changes.lock().len(), 1);

        // The old topic is dead
        assert_eq!(transport.inject("old/title", "Stale").unwrap(), 0);
        assert_eq!(player.media_title(), None);
    }

    #[tokio::test]
    async fn invalid_update_keeps_current_binding() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_topic(InboundSlot::MediaTitle, "p/title"),
        )
        .await;

        let result = player
            .discovery_update(MediaPlayerConfig::new("Player").with_topic(InboundSlot::MediaTitle, "bad/#/title"))
            .await;
        assert!(matches!(result, Err(Error::Config(_))));

        transport.inject("p/title", "Still here").unwrap();
        assert_eq!(player.media_title().as_deref(), Some("Still here"));
    }

    #[tokio::test]
    async fn discovery_payload_reconfigures_then_removes() {
        let (transport, player) = attached(MediaPlayerConfig::new("Player")).await;
        let changes = record_changes(&player);

        let removed = player
            .handle_discovery_payload(
                r#"{"~": "den/player", "name": "Den", "media_title_topic": "~/title"}"#,
            )
            .await
            .unwrap();
        assert!(!removed);
        assert_eq!(player.name(), "Den");
        transport.inject("den/player/title", "Kind of Blue").unwrap();
        assert_eq!(player.media_title().as_deref(), Some("Kind of Blue"));

        let removed = player.handle_discovery_payload("").await.unwrap();
        assert!(removed);
        assert_eq!(transport.handler_count(), 0);

        let changes = changes.lock();
        assert!(changes.contains(&StateChange::Reconfigured));
        assert_eq!(changes.last(), Some(&StateChange::Removed));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;
    use mqtt_media_player::entity::{DEFAULT_PREFIX, DiscoveryMessage};

    #[tokio::test]
    async fn created_from_discovery_message() {
        let transport = Arc::new(LoopbackTransport::new());
        let message = DiscoveryMessage::parse(
            DEFAULT_PREFIX,
            "homeassistant/media_player/den/player/config",
            r#"{"name": "Den", "media_title_topic": "den/title"}"#,
        )
        .unwrap();

        let player = MediaPlayer::from_discovery(message, Arc::clone(&transport))
            .unwrap()
            .unwrap();
        let hash = player.discovery_hash().unwrap();
        assert_eq!(hash.node_id.as_deref(), Some("den"));
        assert_eq!(hash.object_id, "player");
        assert_eq!(player.name(), "Den");

        player.attach().await.unwrap();
        transport.inject("den/title", "Blue in Green").unwrap();
        assert_eq!(player.media_title().as_deref(), Some("Blue in Green"));
    }

    #[tokio::test]
    async fn removal_message_creates_nothing() {
        let message = DiscoveryMessage::parse(
            DEFAULT_PREFIX,
            "homeassistant/media_player/player/config",
            "",
        )
        .unwrap();
        let created = MediaPlayer::from_discovery(message, Arc::new(LoopbackTransport::new()));
        assert!(created.unwrap().is_none());
    }

    #[tokio::test]
    async fn detach_forgets_state_and_callbacks() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player")
                .with_topic(InboundSlot::MediaTitle, "p/title")
                .with_json_attributes_topic("p/attrs"),
        )
        .await;
        transport.inject("p/title", "So What").unwrap();
        transport.inject("p/attrs", r#"{"codec": "flac"}"#).unwrap();
        let changes = record_changes(&player);

        player.detach().await;
        assert_eq!(*changes.lock(), vec![StateChange::Removed]);
        assert_eq!(player.media_title(), None);
        assert!(player.extra_state_attributes().is_empty());

        // Callbacks were dropped with the entity
        player.turn_off().await.unwrap();
        player.detach().await;
        assert_eq!(changes.lock().len(), 1);
    }
}

// ============================================================================
// Components
// ============================================================================

mod components {
    use super::*;

    #[tokio::test]
    async fn availability_follows_topic() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_availability_topic("p/status"),
        )
        .await;
        let flips = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flips);
        player.on_availability_changed(move |available| sink.lock().push(available));

        assert!(!player.available());
        transport.inject("p/status", "online").unwrap();
        assert!(player.available());
        transport.inject("p/status", "offline").unwrap();
        assert!(!player.available());

        assert_eq!(*flips.lock(), vec![true, false]);

        // Without a topic the player is always available
        let (_, player) = attached(MediaPlayerConfig::new("Player")).await;
        assert!(player.available());
    }

    #[tokio::test]
    async fn json_attributes_replace_extra_state() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_json_attributes_topic("p/attrs"),
        )
        .await;

        transport
            .inject("p/attrs", r#"{"codec": "flac", "bitrate": 1411}"#)
            .unwrap();
        assert_eq!(player.extra_state_attributes()["codec"], "flac");

        transport.inject("p/attrs", "[1, 2, 3]").unwrap();
        assert_eq!(player.extra_state_attributes().len(), 2);
    }

    #[tokio::test]
    async fn retained_state_is_replayed_on_attach() {
        let transport = Arc::new(LoopbackTransport::new());
        transport
            .publish(
                "p/title",
                "Retained Title",
                QosLevel::AtMostOnce,
                true,
            )
            .await
            .unwrap();

        let player = MediaPlayer::new(
            MediaPlayerConfig::new("Player").with_topic(InboundSlot::MediaTitle, "p/title"),
            Arc::clone(&transport),
        )
        .unwrap();
        player.attach().await.unwrap();

        assert_eq!(player.media_title().as_deref(), Some("Retained Title"));
    }

    #[tokio::test]
    async fn static_configuration_passes_through() {
        let (_, player) = attached(
            MediaPlayerConfig::new("Den")
                .with_unique_id("den-player")
                .with_source_list(["TV"])
                .with_volume_range(10.0, 20.0)
                .with_media_image_remotely_accessible(true)
                .with_device(DeviceInfo::default().with_identifier("den-01")),
        )
        .await;

        assert_eq!(player.name(), "Den");
        assert_eq!(player.unique_id().as_deref(), Some("den-player"));
        assert_eq!(player.source_list(), Some(vec!["TV".to_string()]));
        assert_eq!(player.sound_mode_list(), None);
        assert!((player.volume_range().min() - 10.0).abs() < f64::EPSILON);
        assert!(player.media_image_remotely_accessible());
        assert_eq!(player.device_info().unwrap().identifiers, vec!["den-01"]);
    }

    #[tokio::test]
    async fn unsubscribed_callbacks_stop_firing() {
        let (transport, player) = attached(
            MediaPlayerConfig::new("Player").with_topic(InboundSlot::MediaTitle, "p/title"),
        )
        .await;
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = player.on_attribute_changed(move |slot, _| {
            assert_eq!(slot, InboundSlot::MediaTitle);
            *sink.lock() += 1;
        });

        transport.inject("p/title", "One").unwrap();
        assert!(player.unsubscribe(id));
        transport.inject("p/title", "Two").unwrap();

        assert_eq!(*count.lock(), 1);
    }
}
