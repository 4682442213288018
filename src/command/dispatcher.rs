// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publish gate and transport calls for commands.

use std::fmt;

use super::{Command, Publication};
use crate::binding::Binding;
use crate::error::{Error, ProtocolError};
use crate::protocol::Transport;
use crate::state::StateChange;

/// Why a command was not published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The command slot has no topic.
    NoTopic,
    /// The player is off and `send_if_off` is disabled.
    PlayerOff,
    /// The requested source or sound mode is not in its allow-list.
    NotListed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTopic => f.write_str("no command topic"),
            Self::PlayerOff => f.write_str("player is off"),
            Self::NotListed => f.write_str("value not in allow-list"),
        }
    }
}

/// Result of dispatching a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The payload was published. The update, if any, is due.
    Published(Option<StateChange>),
    /// Nothing was published.
    Skipped(SkipReason),
}

impl Outcome {
    /// Returns whether the payload was published.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }

    /// Returns the optimistic update to apply.
    #[must_use]
    pub fn into_update(self) -> Option<StateChange> {
        match self {
            Self::Published(update) => update,
            Self::Skipped(_) => None,
        }
    }
}

/// Turns commands into publications on a transport.
///
/// The dispatcher does not own entity state: the caller passes whether the
/// player is currently off and applies the returned update itself.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::command::{Command, CommandDispatcher, Outcome, SkipReason};
/// use mqtt_media_player::config::MediaPlayerConfig;
/// use mqtt_media_player::protocol::LoopbackTransport;
/// use mqtt_media_player::slot::CommandSlot;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mqtt_media_player::Result<()> {
/// let config = MediaPlayerConfig::new("Player")
///     .with_command_topic(CommandSlot::Play, "player/play");
/// let transport = LoopbackTransport::new();
///
/// // Commands are sent whatever the power state by default
/// let binding = config.validate()?;
/// let dispatcher = CommandDispatcher::new(&transport, &binding);
/// assert!(dispatcher.dispatch(&Command::Play, true).await?.is_published());
///
/// // Unless the device asks to be left alone while off
/// let binding = config.with_send_if_off(false).validate()?;
/// let dispatcher = CommandDispatcher::new(&transport, &binding);
/// assert!(dispatcher.dispatch(&Command::Play, false).await?.is_published());
/// let outcome = dispatcher.dispatch(&Command::Play, true).await?;
/// assert_eq!(outcome, Outcome::Skipped(SkipReason::PlayerOff));
/// # Ok(())
/// # }
/// ```
pub struct CommandDispatcher<'a, T: Transport> {
    transport: &'a T,
    binding: &'a Binding,
}

impl<'a, T: Transport> CommandDispatcher<'a, T> {
    /// Creates a dispatcher for one binding.
    #[must_use]
    pub const fn new(transport: &'a T, binding: &'a Binding) -> Self {
        Self { transport, binding }
    }

    /// Plans and publishes a command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` for an out of range volume and
    /// `Error::Protocol` if the publish fails. No update is due in either
    /// case.
    pub async fn dispatch(&self, command: &Command, is_off: bool) -> Result<Outcome, Error> {
        let Some(publication) = command.plan(self.binding)? else {
            tracing::debug!(command = %command, "Command value not in allow-list");
            return Ok(Outcome::Skipped(SkipReason::NotListed));
        };
        Ok(self.publish(publication, is_off).await?)
    }

    /// Publishes a planned publication if the gate allows it.
    ///
    /// The gate opens when the slot has a topic and the player is on or
    /// `send_if_off` is set.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails.
    pub async fn publish(
        &self,
        publication: Publication,
        is_off: bool,
    ) -> Result<Outcome, ProtocolError> {
        let Some(topic) = self.binding.command_topic(publication.slot) else {
            tracing::trace!(slot = %publication.slot, "No command topic");
            return Ok(Outcome::Skipped(SkipReason::NoTopic));
        };

        if is_off && !self.binding.send_if_off() {
            tracing::debug!(slot = %publication.slot, "Player is off, command dropped");
            return Ok(Outcome::Skipped(SkipReason::PlayerOff));
        }

        self.transport
            .publish(
                topic,
                &publication.payload,
                self.binding.qos(),
                self.binding.retain(),
            )
            .await?;

        tracing::debug!(
            slot = %publication.slot,
            topic = %topic,
            payload = %publication.payload,
            "Command published"
        );

        Ok(Outcome::Published(publication.local_update))
    }
}
