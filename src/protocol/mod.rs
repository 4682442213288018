// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message transports.
//!
//! An entity never talks to a broker directly. It subscribes, unsubscribes
//! and publishes through a [`Transport`].
//!
//! # Transports
//!
//! - [`MqttTransport`]: a live broker connection (feature `mqtt`)
//! - [`LoopbackTransport`]: an in-process transport that records
//!   publications and lets messages be injected, for tests and simulations
//!
//! Both route incoming messages with a [`TopicRouter`], so several handlers
//! may share a topic filter.

mod loopback;
#[cfg(feature = "mqtt")]
mod mqtt_transport;
mod topic_router;

pub use loopback::{LoopbackTransport, TransportOp};
#[cfg(feature = "mqtt")]
pub use mqtt_transport::{MqttTransport, MqttTransportBuilder};
pub use topic_router::{RouteReport, TopicRouter, topic_matches};

use std::sync::Arc;

use crate::error::ProtocolError;
use crate::subscription::SubscriptionId;
use crate::types::QosLevel;

/// A message delivered to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Payload, decoded as UTF-8.
    pub payload: String,
    /// QoS the message was delivered with.
    pub qos: QosLevel,
    /// Whether the broker delivered a retained message.
    pub retain: bool,
}

impl ReceivedMessage {
    /// Creates a QoS 0, non-retained message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QosLevel::AtMostOnce,
            retain: false,
        }
    }

    /// Marks the message as retained.
    #[must_use]
    pub fn retained(mut self) -> Self {
        self.retain = true;
        self
    }
}

/// A message published through a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic published to.
    pub topic: String,
    /// Payload published.
    pub payload: String,
    /// QoS requested.
    pub qos: QosLevel,
    /// Retain flag requested.
    pub retain: bool,
}

/// Handler invoked for every message matching a subscription.
///
/// An error means the message was rejected. Transports log it; the
/// loopback transport also reports it to whoever injected the message.
pub type MessageHandler = Arc<dyn Fn(&ReceivedMessage) -> crate::Result<()> + Send + Sync>;

/// A publish/subscribe message transport.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Subscribes a handler to a topic filter.
    ///
    /// Returns once the subscription is established.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the subscription cannot be established.
    async fn subscribe(
        &self,
        topic: &str,
        qos: QosLevel,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, ProtocolError>;

    /// Removes a subscription.
    ///
    /// The handler is not invoked again once this returns. Unknown IDs are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the broker could not be told.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProtocolError>;

    /// Publishes a payload.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be sent.
    async fn publish(
        &self,
        topic: &str,
        payload: &str,
        qos: QosLevel,
        retain: bool,
    ) -> Result<(), ProtocolError>;
}
