// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport.
//!
//! [`LoopbackTransport`] behaves like a tiny broker living in the same
//! process: publications are delivered to matching local subscribers,
//! retained payloads are replayed to new subscribers, and every operation
//! is recorded so it can be inspected afterwards.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use mqtt_media_player::protocol::{LoopbackTransport, ReceivedMessage, Transport};
//! use mqtt_media_player::types::QosLevel;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mqtt_media_player::Result<()> {
//! let transport = LoopbackTransport::new();
//! transport
//!     .subscribe(
//!         "player/state",
//!         QosLevel::AtMostOnce,
//!         Arc::new(|msg: &ReceivedMessage| -> mqtt_media_player::Result<()> {
//!             assert_eq!(msg.payload, "playing");
//!             Ok(())
//!         }),
//!     )
//!     .await?;
//!
//! assert_eq!(transport.inject("player/state", "playing")?, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{
    MessageHandler, PublishedMessage, ReceivedMessage, TopicRouter, Transport, topic_matches,
};
use crate::error::ProtocolError;
use crate::subscription::SubscriptionId;
use crate::types::QosLevel;

/// An operation performed on a [`LoopbackTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOp {
    /// A handler was subscribed.
    Subscribe {
        /// The topic filter.
        topic: String,
        /// The requested QoS.
        qos: QosLevel,
    },
    /// A handler was unsubscribed.
    Unsubscribe {
        /// The topic filter.
        topic: String,
    },
    /// A message was published.
    Publish(PublishedMessage),
}

/// A transport that never leaves the process.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    router: TopicRouter,
    retained: Mutex<BTreeMap<String, String>>,
    log: Mutex<Vec<TransportOp>>,
    offline: AtomicBool,
}

impl LoopbackTransport {
    /// Creates a new loopback transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent subscribe and publish fail with
    /// `ProtocolError::NotConnected` (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    fn check_online(&self) -> Result<(), ProtocolError> {
        if self.offline.load(Ordering::Acquire) {
            Err(ProtocolError::NotConnected)
        } else {
            Ok(())
        }
    }

    /// Delivers a message to every matching subscriber, as if a remote
    /// client had published it.
    ///
    /// Returns how many handlers received it.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a handler. The remaining
    /// handlers still receive the message.
    pub fn inject(
        &self,
        topic: impl Into<String>,
        payload: impl Into<String>,
    ) -> crate::Result<usize> {
        self.deliver(&ReceivedMessage::new(topic, payload))
    }

    /// Delivers an already built message.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a handler.
    pub fn deliver(&self, message: &ReceivedMessage) -> crate::Result<usize> {
        let mut report = self.router.route(message);
        if report.errors.is_empty() {
            Ok(report.delivered)
        } else {
            Err(report.errors.swap_remove(0))
        }
    }

    /// Returns every message published so far.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.log
            .lock()
            .iter()
            .filter_map(|op| match op {
                TransportOp::Publish(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the payloads published to one topic.
    #[must_use]
    pub fn published_to(&self, topic: &str) -> Vec<String> {
        self.published()
            .into_iter()
            .filter(|message| message.topic == topic)
            .map(|message| message.payload)
            .collect()
    }

    /// Returns every recorded operation.
    #[must_use]
    pub fn operations(&self) -> Vec<TransportOp> {
        self.log.lock().clone()
    }

    /// Forgets every recorded operation.
    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    /// Returns the topic filters with at least one subscriber.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.router
            .filters()
            .into_iter()
            .map(|(filter, _)| filter)
            .collect()
    }

    /// Returns the number of subscribed handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.router.handler_count()
    }

    /// Returns the retained payload of a topic.
    #[must_use]
    pub fn retained(&self, topic: &str) -> Option<String> {
        self.retained.lock().get(topic).cloned()
    }
}

impl Transport for LoopbackTransport {
    async fn subscribe(
        &self,
        topic: &str,
        qos: QosLevel,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, ProtocolError> {
        self.check_online()?;
        self.log.lock().push(TransportOp::Subscribe {
            topic: topic.to_string(),
            qos,
        });
        let (id, _) = self.router.register(topic, qos, handler.clone());

        let replay: Vec<ReceivedMessage> = self
            .retained
            .lock()
            .iter()
            .filter(|(retained_topic, _)| topic_matches(topic, retained_topic))
            .map(|(retained_topic, payload)| {
                ReceivedMessage::new(retained_topic.clone(), payload.clone()).retained()
            })
            .collect();
        for message in replay {
            if let Err(e) = handler(&message) {
                tracing::warn!(topic = %message.topic, error = %e, "Retained message rejected");
            }
        }
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProtocolError> {
        if let Some((topic, _)) = self.router.unregister(id) {
            self.log.lock().push(TransportOp::Unsubscribe { topic });
        }
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: &str,
        qos: QosLevel,
        retain: bool,
    ) -> Result<(), ProtocolError> {
        self.check_online()?;
        tracing::debug!(topic = %topic, payload = %payload, retain, "Loopback publish");
        self.log.lock().push(TransportOp::Publish(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
            qos,
            retain,
        }));

        if retain {
            let mut retained = self.retained.lock();
            if payload.is_empty() {
                retained.remove(topic);
            } else {
                retained.insert(topic.to_string(), payload.to_string());
            }
        }

        let message = ReceivedMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
            qos,
            retain: false,
        };
        // Handler errors are logged by the router.
        self.router.route(&message);
        Ok(())
    }
}
