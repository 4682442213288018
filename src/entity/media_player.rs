// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The media player entity.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::{
    Availability, AvailabilityBinding, DeviceInfo, DiscoveryHash, DiscoveryMessage, DiscoveryPayload,
};
use super::{JsonAttributes, JsonAttributesBinding};
use crate::SupportedFeatures;
use crate::binding::{Binding, Resolution};
use crate::command::{Command, CommandDispatcher, Outcome, PlayMedia};
use crate::config::MediaPlayerConfig;
use crate::error::Error;
use crate::protocol::{MessageHandler, ReceivedMessage, Transport};
use crate::slot::InboundSlot;
use crate::state::{AttributeValue, EntityState, StateChange};
use crate::subscription::{
    CallbackRegistry, InboundRoute, RouteTarget, Subscribable, SubscriptionId, SubscriptionSet,
};
use crate::types::{EntityId, PlayerState, VolumeRange};

/// State shared with the inbound handlers.
#[derive(Debug)]
struct Shared {
    id: EntityId,
    binding: RwLock<Arc<Binding>>,
    state: RwLock<EntityState>,
    availability: Availability,
    attributes: JsonAttributes,
    callbacks: CallbackRegistry,
}

impl Shared {
    fn binding(&self) -> Arc<Binding> {
        Arc::clone(&self.binding.read())
    }

    fn apply(&self, change: StateChange) {
        self.state.write().apply(&change);
        self.callbacks.dispatch(&change);
    }

    fn notify(&self, change: Option<StateChange>) {
        if let Some(change) = change {
            self.callbacks.dispatch(&change);
        }
    }

    /// Assumes the player is on when nothing reports its state.
    fn assume_on_without_state_topic(&self, binding: &Binding) {
        if binding.topics().inbound(InboundSlot::State).is_none() {
            self.state
                .write()
                .set(InboundSlot::State, AttributeValue::State(PlayerState::On));
        }
    }
}

/// A media player entity bound to MQTT topics.
///
/// The entity is created from a [`MediaPlayerConfig`], subscribes to its
/// topics on [`attach`](Self::attach), and from then on keeps its state up
/// to date from inbound messages. Commands are published to the configured
/// command topics and optimistically update the cached state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use mqtt_media_player::MediaPlayer;
/// use mqtt_media_player::config::MediaPlayerConfig;
/// use mqtt_media_player::protocol::LoopbackTransport;
/// use mqtt_media_player::slot::{CommandSlot, InboundSlot};
/// use mqtt_media_player::types::PlayerState;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mqtt_media_player::Result<()> {
/// let transport = Arc::new(LoopbackTransport::new());
/// let config = MediaPlayerConfig::new("Kitchen")
///     .with_topic(InboundSlot::State, "kitchen/state")
///     .with_topic(InboundSlot::MediaTitle, "kitchen/title")
///     .with_command_topic(CommandSlot::Play, "kitchen/play");
///
/// let player = MediaPlayer::new(config, Arc::clone(&transport))?;
/// player.attach().await?;
///
/// transport.inject("kitchen/title", "Blue in Green")?;
/// assert_eq!(player.media_title().as_deref(), Some("Blue in Green"));
///
/// player.play().await?;
/// assert_eq!(transport.published_to("kitchen/play"), vec![String::new()]);
/// assert_eq!(player.state(), Some(PlayerState::Playing));
/// # Ok(())
/// # }
/// ```
pub struct MediaPlayer<T: Transport> {
    transport: Arc<T>,
    shared: Arc<Shared>,
    subscriptions: tokio::sync::Mutex<SubscriptionSet>,
    discovery: Option<DiscoveryHash>,
}

impl<T: Transport> MediaPlayer<T> {
    /// Creates an entity from a configuration.
    ///
    /// Nothing is subscribed until [`attach`](Self::attach) is called.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: MediaPlayerConfig, transport: Arc<T>) -> crate::Result<Self> {
        let binding = Arc::new(config.validate()?);
        let shared = Shared {
            id: EntityId::new(),
            availability: Availability::new(binding.availability()),
            binding: RwLock::new(Arc::clone(&binding)),
            state: RwLock::new(EntityState::new()),
            attributes: JsonAttributes::new(),
            callbacks: CallbackRegistry::new(),
        };
        shared.assume_on_without_state_topic(&binding);

        tracing::debug!(entity = %shared.id, name = %binding.name(), "Media player created");

        Ok(Self {
            transport,
            shared: Arc::new(shared),
            subscriptions: tokio::sync::Mutex::new(SubscriptionSet::new()),
            discovery: None,
        })
    }

    /// Records the discovery hash the entity was created from.
    #[must_use]
    pub fn with_discovery_hash(mut self, hash: DiscoveryHash) -> Self {
        self.discovery = Some(hash);
        self
    }

    /// Creates an entity from a discovery message.
    ///
    /// Returns `None` for a removal message, as there is nothing to create.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn from_discovery(
        message: DiscoveryMessage,
        transport: Arc<T>,
    ) -> crate::Result<Option<Self>> {
        match message.payload {
            DiscoveryPayload::Removed => {
                tracing::debug!(discovery = %message.hash, "Removal for unknown entity");
                Ok(None)
            }
            DiscoveryPayload::Config(config) => {
                Ok(Some(Self::new(*config, transport)?.with_discovery_hash(message.hash)))
            }
        }
    }

    // ========== Lifecycle ==========

    /// Subscribes to every configured topic.
    ///
    /// Attaching an attached entity re-subscribes from scratch.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if a subscription fails.
    pub async fn attach(&self) -> crate::Result<()> {
        let binding = self.shared.binding();
        let routes = routes(&self.shared, &binding);
        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions.bind(self.transport.as_ref(), routes).await?;
        tracing::debug!(
            entity = %self.shared.id,
            subscriptions = subscriptions.len(),
            "Media player attached"
        );
        Ok(())
    }

    /// Applies an updated configuration for the same device.
    ///
    /// Every old subscription is removed before the new ones are made.
    /// Cached values are kept.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid, in which
    /// case the entity is left untouched, or `Error::Protocol` if a new
    /// subscription fails.
    pub async fn discovery_update(&self, config: MediaPlayerConfig) -> crate::Result<()> {
        let binding = Arc::new(config.validate()?);
        let mut subscriptions = self.subscriptions.lock().await;

        let old = std::mem::replace(&mut *self.shared.binding.write(), Arc::clone(&binding));
        self.shared.assume_on_without_state_topic(&binding);
        if binding.json_attributes().is_none() {
            self.shared.attributes.clear();
        }
        let availability = self
            .shared
            .availability
            .reconfigure(old.availability(), binding.availability());

        let result = subscriptions
            .rebind(self.transport.as_ref(), routes(&self.shared, &binding))
            .await;
        drop(subscriptions);

        self.shared.notify(availability);
        self.shared.notify(Some(StateChange::Reconfigured));
        tracing::debug!(entity = %self.shared.id, name = %binding.name(), "Media player reconfigured");
        result.map_err(Error::from)
    }

    /// Handles a payload received on the entity's discovery topic.
    ///
    /// An empty payload detaches the entity, anything else reconfigures
    /// it. Returns `true` if the entity was removed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the payload is not a valid configuration.
    pub async fn handle_discovery_payload(&self, payload: &str) -> crate::Result<bool> {
        match DiscoveryPayload::parse(payload)? {
            DiscoveryPayload::Removed => {
                self.detach().await;
                Ok(true)
            }
            DiscoveryPayload::Config(config) => {
                self.discovery_update(*config).await?;
                Ok(false)
            }
        }
    }

    /// Removes every subscription and notifies the host of the removal.
    ///
    /// Cached values are forgotten and every callback is dropped after the
    /// removal is notified. Calling it twice is harmless.
    pub async fn detach(&self) {
        self.subscriptions
            .lock()
            .await
            .unbind(self.transport.as_ref())
            .await;
        self.shared.notify(Some(StateChange::Removed));
        self.shared.state.write().clear();
        self.shared.attributes.clear();
        self.shared.callbacks.clear();
        tracing::debug!(entity = %self.shared.id, "Media player detached");
    }

    /// Returns the number of live topic subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    // ========== Commands ==========

    /// Executes a command.
    ///
    /// The optimistic update of a published command is applied and
    /// notified before this returns. Turning off always caches the off
    /// state, even when nothing was published.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` for an out of range volume or
    /// `Error::Protocol` if publishing fails. The cached state is not
    /// touched in either case.
    pub async fn execute(&self, command: &Command) -> crate::Result<Outcome> {
        let binding = self.shared.binding();
        let is_off = self.shared.state.read().is_off();

        let outcome = CommandDispatcher::new(self.transport.as_ref(), binding.as_ref())
            .dispatch(command, is_off)
            .await?;

        let update = match &outcome {
            Outcome::Published(update) => update.clone(),
            Outcome::Skipped(_) if matches!(command, Command::TurnOff) => {
                Some(StateChange::state(PlayerState::Off))
            }
            Outcome::Skipped(reason) => {
                tracing::debug!(entity = %self.shared.id, command = %command, reason = %reason, "Command skipped");
                None
            }
        };
        if let Some(change) = update {
            self.shared.apply(change);
        }
        Ok(outcome)
    }

    /// Turns the player on.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn turn_on(&self) -> crate::Result<Outcome> {
        self.execute(&Command::TurnOn).await
    }

    /// Turns the player off.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn turn_off(&self) -> crate::Result<Outcome> {
        self.execute(&Command::TurnOff).await
    }

    /// Starts playback.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn play(&self) -> crate::Result<Outcome> {
        self.execute(&Command::Play).await
    }

    /// Pauses playback.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn pause(&self) -> crate::Result<Outcome> {
        self.execute(&Command::Pause).await
    }

    /// Stops playback. Published on the pause topic.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn stop(&self) -> crate::Result<Outcome> {
        self.execute(&Command::Stop).await
    }

    /// Skips to the next track.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn next_track(&self) -> crate::Result<Outcome> {
        self.execute(&Command::NextTrack).await
    }

    /// Goes back to the previous track.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn previous_track(&self) -> crate::Result<Outcome> {
        self.execute(&Command::PreviousTrack).await
    }

    /// Seeks to a position in seconds.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn seek(&self, position: f64) -> crate::Result<Outcome> {
        self.execute(&Command::Seek(position)).await
    }

    /// Plays a specific piece of media.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn play_media(&self, media: PlayMedia) -> crate::Result<Outcome> {
        self.execute(&Command::PlayMedia(media)).await
    }

    /// Selects an input source from the configured source list.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn select_source(&self, source: impl Into<String>) -> crate::Result<Outcome> {
        self.execute(&Command::SelectSource(source.into())).await
    }

    /// Selects a sound mode from the configured sound mode list.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn select_sound_mode(&self, mode: impl Into<String>) -> crate::Result<Outcome> {
        self.execute(&Command::SelectSoundMode(mode.into())).await
    }

    /// Clears the playlist.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn clear_playlist(&self) -> crate::Result<Outcome> {
        self.execute(&Command::ClearPlaylist).await
    }

    /// Enables or disables shuffle.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn set_shuffle(&self, shuffle: bool) -> crate::Result<Outcome> {
        self.execute(&Command::SetShuffle(shuffle)).await
    }

    /// Mutes or unmutes.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails.
    pub async fn mute(&self, mute: bool) -> crate::Result<Outcome> {
        self.execute(&Command::Mute(mute)).await
    }

    /// Sets the volume, as a fraction between 0.0 and 1.0.
    ///
    /// The published value is scaled to the configured volume bounds.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the fraction is out of range, or error if
    /// publishing fails.
    pub async fn set_volume(&self, volume: f64) -> crate::Result<Outcome> {
        self.execute(&Command::SetVolume(volume)).await
    }

    // ========== Identity & configuration ==========

    /// Returns the runtime identifier.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.shared.id
    }

    /// Returns the discovery hash, if the entity was discovered.
    #[must_use]
    pub fn discovery_hash(&self) -> Option<&DiscoveryHash> {
        self.discovery.as_ref()
    }

    /// Returns the current binding.
    #[must_use]
    pub fn binding(&self) -> Arc<Binding> {
        self.shared.binding()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.shared.binding().name().to_string()
    }

    /// Returns the configured unique identifier.
    #[must_use]
    pub fn unique_id(&self) -> Option<String> {
        self.shared.binding().unique_id().map(str::to_string)
    }

    /// Returns the device block.
    #[must_use]
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.shared.binding().device().cloned()
    }

    /// Returns the configured input sources.
    #[must_use]
    pub fn source_list(&self) -> Option<Vec<String>> {
        self.shared.binding().source_list().map(<[String]>::to_vec)
    }

    /// Returns the configured sound modes.
    #[must_use]
    pub fn sound_mode_list(&self) -> Option<Vec<String>> {
        self.shared.binding().sound_mode_list().map(<[String]>::to_vec)
    }

    /// Returns the configured device volume bounds.
    #[must_use]
    pub fn volume_range(&self) -> VolumeRange {
        self.shared.binding().volume()
    }

    /// Returns whether the media image can be fetched from outside.
    #[must_use]
    pub fn media_image_remotely_accessible(&self) -> bool {
        self.shared.binding().media_image_remotely_accessible()
    }

    /// Returns the capabilities, one per configured command topic.
    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        self.shared.binding().supported_features()
    }

    // ========== State ==========

    /// Returns a snapshot of every cached value.
    #[must_use]
    pub fn snapshot(&self) -> EntityState {
        self.shared.state.read().clone()
    }

    /// Returns the cached value of a slot.
    #[must_use]
    pub fn attribute(&self, slot: InboundSlot) -> Option<AttributeValue> {
        self.shared.state.read().get(slot).cloned()
    }

    /// Returns when the cached state last changed.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.shared.state.read().last_updated()
    }

    /// Returns whether the device is available.
    #[must_use]
    pub fn available(&self) -> bool {
        self.shared.availability.is_available()
    }

    /// Returns the extra attributes received on the JSON attributes topic.
    #[must_use]
    pub fn extra_state_attributes(&self) -> Map<String, Value> {
        self.shared.attributes.get()
    }

    /// Returns the player state.
    #[must_use]
    pub fn state(&self) -> Option<PlayerState> {
        self.shared.state.read().state().cloned()
    }

    /// Returns the volume as a fraction of the configured bounds.
    ///
    /// A cached volume of zero reads as unknown.
    #[must_use]
    pub fn volume_level(&self) -> Option<f64> {
        let raw = self
            .attribute(InboundSlot::VolumeLevel)
            .and_then(|value| value.as_float())
            .filter(|raw| raw.abs() > 0.0)?;
        Some(self.volume_range().to_fraction(raw))
    }

    /// Returns whether the volume is muted.
    ///
    /// Without a mute report, a known volume of zero counts as muted.
    #[must_use]
    pub fn is_volume_muted(&self) -> Option<bool> {
        match self.attribute(InboundSlot::VolumeMuted) {
            Some(muted) => muted.as_flag(),
            None => self.volume_level().map(|level| level.abs() < f64::EPSILON),
        }
    }

    /// Returns whether shuffle is enabled.
    #[must_use]
    pub fn shuffle(&self) -> Option<bool> {
        self.attribute(InboundSlot::Shuffle)
            .and_then(|value| value.as_flag())
    }

    /// Returns the track number.
    #[must_use]
    pub fn media_track(&self) -> Option<i64> {
        self.attribute(InboundSlot::MediaTrack)
            .and_then(|value| value.as_integer())
    }

    /// Returns the current input source.
    #[must_use]
    pub fn source(&self) -> Option<String> {
        self.text(InboundSlot::Source)
    }

    /// Returns the current sound mode.
    #[must_use]
    pub fn sound_mode(&self) -> Option<String> {
        self.text(InboundSlot::SoundMode)
    }

    /// Returns the media title.
    #[must_use]
    pub fn media_title(&self) -> Option<String> {
        self.text(InboundSlot::MediaTitle)
    }

    /// Returns the media artist.
    #[must_use]
    pub fn media_artist(&self) -> Option<String> {
        self.text(InboundSlot::MediaArtist)
    }

    /// Returns the album name.
    #[must_use]
    pub fn media_album_name(&self) -> Option<String> {
        self.text(InboundSlot::MediaAlbumName)
    }

    /// Returns the album artist.
    #[must_use]
    pub fn media_album_artist(&self) -> Option<String> {
        self.text(InboundSlot::MediaAlbumArtist)
    }

    /// Returns the media content identifier.
    #[must_use]
    pub fn media_content_id(&self) -> Option<String> {
        self.text(InboundSlot::MediaContentId)
    }

    /// Returns the media content type.
    #[must_use]
    pub fn media_content_type(&self) -> Option<String> {
        self.text(InboundSlot::MediaContentType)
    }

    /// Returns the media duration as reported.
    #[must_use]
    pub fn media_duration(&self) -> Option<String> {
        self.text(InboundSlot::MediaDuration)
    }

    /// Returns the playback position as reported.
    #[must_use]
    pub fn media_position(&self) -> Option<String> {
        self.text(InboundSlot::MediaPosition)
    }

    /// Returns when the playback position was valid, as reported.
    #[must_use]
    pub fn media_position_updated_at(&self) -> Option<String> {
        self.text(InboundSlot::MediaPositionUpdatedAt)
    }

    /// Returns the media image URL.
    #[must_use]
    pub fn media_image_url(&self) -> Option<String> {
        self.text(InboundSlot::MediaImageUrl)
    }

    /// Returns the entity picture URL.
    #[must_use]
    pub fn entity_picture(&self) -> Option<String> {
        self.text(InboundSlot::EntityPicture)
    }

    /// Returns the series title.
    #[must_use]
    pub fn media_series_title(&self) -> Option<String> {
        self.text(InboundSlot::MediaSeriesTitle)
    }

    /// Returns the season.
    #[must_use]
    pub fn media_season(&self) -> Option<String> {
        self.text(InboundSlot::MediaSeason)
    }

    /// Returns the episode.
    #[must_use]
    pub fn media_episode(&self) -> Option<String> {
        self.text(InboundSlot::MediaEpisode)
    }

    /// Returns the channel.
    #[must_use]
    pub fn media_channel(&self) -> Option<String> {
        self.text(InboundSlot::MediaChannel)
    }

    /// Returns the playlist title.
    #[must_use]
    pub fn media_playlist(&self) -> Option<String> {
        self.text(InboundSlot::MediaPlaylist)
    }

    /// Returns the running app identifier.
    #[must_use]
    pub fn app_id(&self) -> Option<String> {
        self.text(InboundSlot::AppId)
    }

    /// Returns the running app name.
    #[must_use]
    pub fn app_name(&self) -> Option<String> {
        self.text(InboundSlot::AppName)
    }

    fn text(&self, slot: InboundSlot) -> Option<String> {
        self.shared.state.read().text(slot).map(str::to_string)
    }
}

impl<T: Transport> Subscribable for MediaPlayer<T> {
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_state_changed(callback)
    }

    fn on_attribute_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(InboundSlot, &AttributeValue) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_attribute_changed(callback)
    }

    fn on_availability_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_availability_changed(callback)
    }

    fn on_attributes_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Map<String, Value>) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_attributes_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.callbacks.unsubscribe(id)
    }
}

impl<T: Transport> fmt::Debug for MediaPlayer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPlayer")
            .field("id", &self.shared.id)
            .field("name", &self.shared.binding().name())
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

// =========================================================================
// Inbound routes
// =========================================================================

/// Builds one route per bound slot, plus availability and attributes.
fn routes(shared: &Arc<Shared>, binding: &Arc<Binding>) -> Vec<InboundRoute> {
    let qos = binding.qos();

    let mut routes: Vec<InboundRoute> = binding
        .topics()
        .inbound_topics()
        .map(|(slot, topic)| InboundRoute {
            target: RouteTarget::Slot(slot),
            topic: topic.to_string(),
            qos,
            handler: slot_handler(Arc::clone(shared), Arc::clone(binding), slot),
        })
        .collect();

    if let Some(availability) = binding.availability() {
        routes.push(InboundRoute {
            target: RouteTarget::Availability,
            topic: availability.topic().to_string(),
            qos,
            handler: availability_handler(Arc::clone(shared), availability.clone()),
        });
    }

    if let Some(attributes) = binding.json_attributes() {
        routes.push(InboundRoute {
            target: RouteTarget::JsonAttributes,
            topic: attributes.topic().to_string(),
            qos,
            handler: attributes_handler(Arc::clone(shared), attributes.clone()),
        });
    }

    routes
}

fn slot_handler(shared: Arc<Shared>, binding: Arc<Binding>, slot: InboundSlot) -> MessageHandler {
    Arc::new(move |msg: &ReceivedMessage| -> crate::Result<()> {
        tracing::trace!(entity = %shared.id, slot = %slot, topic = %msg.topic, payload = %msg.payload, "Message received");

        match binding.resolve(slot, &msg.payload)? {
            Resolution::Accepted(value) => shared.apply(StateChange::attribute(slot, value)),
            Resolution::NotAllowed(value) => {
                tracing::error!(entity = %shared.id, slot = %slot, value = %value, "Value not in allow-list");
            }
        }
        Ok(())
    })
}

fn availability_handler(shared: Arc<Shared>, binding: AvailabilityBinding) -> MessageHandler {
    Arc::new(move |msg: &ReceivedMessage| -> crate::Result<()> {
        tracing::trace!(entity = %shared.id, topic = %msg.topic, payload = %msg.payload, "Availability received");
        let change = shared.availability.handle(&binding, &msg.payload);
        shared.notify(change);
        Ok(())
    })
}

fn attributes_handler(shared: Arc<Shared>, binding: JsonAttributesBinding) -> MessageHandler {
    Arc::new(move |msg: &ReceivedMessage| -> crate::Result<()> {
        tracing::trace!(entity = %shared.id, topic = %msg.topic, "Attributes received");
        let change = shared.attributes.handle(&binding, &msg.payload);
        shared.notify(change);
        Ok(())
    })
}
