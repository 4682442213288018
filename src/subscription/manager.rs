// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport subscriptions owned by one entity.

use std::fmt;

use crate::error::ProtocolError;
use crate::protocol::{MessageHandler, Transport};
use crate::slot::InboundSlot;
use crate::subscription::SubscriptionId;
use crate::types::QosLevel;

/// What an inbound route feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteTarget {
    /// An attribute slot.
    Slot(InboundSlot),
    /// The availability component.
    Availability,
    /// The JSON attributes component.
    JsonAttributes,
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "{slot}"),
            Self::Availability => f.write_str("availability"),
            Self::JsonAttributes => f.write_str("json_attributes"),
        }
    }
}

/// A topic to subscribe together with the handler to run for it.
pub struct InboundRoute {
    /// What the route feeds.
    pub target: RouteTarget,
    /// The topic filter.
    pub topic: String,
    /// QoS to subscribe with.
    pub qos: QosLevel,
    /// Handler invoked for every matching message.
    pub handler: MessageHandler,
}

impl fmt::Debug for InboundRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundRoute")
            .field("target", &self.target)
            .field("topic", &self.topic)
            .field("qos", &self.qos)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct ActiveSubscription {
    target: RouteTarget,
    topic: String,
    id: SubscriptionId,
}

/// The set of live transport subscriptions of one entity.
///
/// Binding always starts from an empty set: any previous subscription is
/// torn down first, and every unsubscribe has completed before the first
/// new subscribe is issued. A payload therefore never reaches both an old
/// and a new handler.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    active: Vec<ActiveSubscription>,
}

impl SubscriptionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes every route.
    ///
    /// Existing subscriptions are removed first, so binding twice behaves
    /// like [`rebind`](Self::rebind).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if a subscription fails. Routes subscribed
    /// before the failure stay active and are removed by the next
    /// [`unbind`](Self::unbind).
    pub async fn bind<T: Transport>(
        &mut self,
        transport: &T,
        routes: Vec<InboundRoute>,
    ) -> Result<(), ProtocolError> {
        self.unbind(transport).await;

        for route in routes {
            let id = transport
                .subscribe(&route.topic, route.qos, route.handler)
                .await?;
            tracing::debug!(target_slot = %route.target, topic = %route.topic, id = %id, "Subscribed");
            self.active.push(ActiveSubscription {
                target: route.target,
                topic: route.topic,
                id,
            });
        }
        Ok(())
    }

    /// Replaces every subscription with a new set of routes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if a new subscription fails.
    pub async fn rebind<T: Transport>(
        &mut self,
        transport: &T,
        routes: Vec<InboundRoute>,
    ) -> Result<(), ProtocolError> {
        self.bind(transport, routes).await
    }

    /// Removes every subscription. Calling it on an empty set does nothing.
    ///
    /// A failed unsubscribe is logged and the subscription is forgotten
    /// anyway.
    pub async fn unbind<T: Transport>(&mut self, transport: &T) {
        for subscription in self.active.drain(..) {
            if let Err(e) = transport.unsubscribe(subscription.id).await {
                tracing::warn!(
                    target_slot = %subscription.target,
                    topic = %subscription.topic,
                    error = %e,
                    "Failed to unsubscribe"
                );
            }
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns whether no subscription is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Returns the subscribed topic of a target.
    #[must_use]
    pub fn topic(&self, target: RouteTarget) -> Option<&str> {
        self.active
            .iter()
            .find(|subscription| subscription.target == target)
            .map(|subscription| subscription.topic.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::protocol::{LoopbackTransport, ReceivedMessage, TransportOp};

    fn route(target: RouteTarget, topic: &str) -> InboundRoute {
        InboundRoute {
            target,
            topic: topic.to_string(),
            qos: QosLevel::AtMostOnce,
            handler: Arc::new(|_msg: &ReceivedMessage| -> crate::Result<()> { Ok(()) }),
        }
    }

    #[tokio::test]
    async fn bind_subscribes_every_route() {
        let transport = LoopbackTransport::new();
        let mut set = SubscriptionSet::new();

        set.bind(
            &transport,
            vec![
                route(RouteTarget::Slot(InboundSlot::State), "p/state"),
                route(RouteTarget::Availability, "p/online"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.topic(RouteTarget::Availability), Some("p/online"));
        assert_eq!(transport.handler_count(), 2);
    }

    #[tokio::test]
    async fn rebind_unsubscribes_before_subscribing() {
        let transport = LoopbackTransport::new();
        let mut set = SubscriptionSet::new();
        set.bind(
            &transport,
            vec![
                route(RouteTarget::Slot(InboundSlot::State), "old/state"),
                route(RouteTarget::Slot(InboundSlot::MediaTitle), "old/title"),
            ],
        )
        .await
        .unwrap();
        transport.clear_log();

        set.rebind(
            &transport,
            vec![route(RouteTarget::Slot(InboundSlot::State), "new/state")],
        )
        .await
        .unwrap();

        let ops = transport.operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], TransportOp::Unsubscribe { .. }));
        assert!(matches!(ops[1], TransportOp::Unsubscribe { .. }));
        assert!(matches!(ops[2], TransportOp::Subscribe { ref topic, .. } if topic == "new/state"));
        assert_eq!(transport.subscriptions(), vec!["new/state".to_string()]);
    }

    #[tokio::test]
    async fn unbind_is_idempotent() {
        let transport = LoopbackTransport::new();
        let mut set = SubscriptionSet::new();
        set.bind(
            &transport,
            vec![route(RouteTarget::JsonAttributes, "p/attrs")],
        )
        .await
        .unwrap();

        set.unbind(&transport).await;
        set.unbind(&transport).await;
        assert!(set.is_empty());
        assert_eq!(transport.handler_count(), 0);
    }

    #[tokio::test]
    async fn failed_subscribe_is_reported() {
        let transport = LoopbackTransport::new();
        transport.set_offline(true);
        let mut set = SubscriptionSet::new();

        let result = set
            .bind(
                &transport,
                vec![route(RouteTarget::Slot(InboundSlot::State), "p/state")],
            )
            .await;
        assert!(matches!(result, Err(ProtocolError::NotConnected)));
        assert!(set.is_empty());
    }
}
