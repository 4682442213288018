// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic routing for message handlers.
//!
//! The [`TopicRouter`] matches incoming messages against the topic filters
//! handlers were registered with, and calls every matching handler.
//!
//! # Architecture
//!
//! ```text
//! MQTT Message: living/player/state → playing
//!                     ↓
//!             TopicRouter.route()
//!                     ↓
//!   Match "living/player/state" against every filter
//!                     ↓
//!      handlers cloned out of the table (lock released)
//!                     ↓
//!            handler(&ReceivedMessage)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::{MessageHandler, ReceivedMessage};
use crate::subscription::SubscriptionId;
use crate::types::QosLevel;

struct Route {
    id: SubscriptionId,
    filter: String,
    qos: QosLevel,
    handler: MessageHandler,
}

/// Result of routing one message.
#[derive(Debug, Default)]
pub struct RouteReport {
    /// Number of handlers the message was delivered to.
    pub delivered: usize,
    /// Errors returned by handlers, in delivery order.
    pub errors: Vec<crate::Error>,
}

/// Routes messages to handlers by topic filter.
///
/// Several handlers may share a filter. The router tracks how many do, so a
/// transport knows when to subscribe to or unsubscribe from the broker.
#[derive(Default)]
pub struct TopicRouter {
    next_id: AtomicU64,
    routes: RwLock<Vec<Route>>,
}

impl TopicRouter {
    /// Creates a new empty topic router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a topic filter.
    ///
    /// Returns the new subscription ID, and whether this is the first
    /// handler for the filter.
    pub fn register(
        &self,
        filter: impl Into<String>,
        qos: QosLevel,
        handler: MessageHandler,
    ) -> (SubscriptionId, bool) {
        let filter = filter.into();
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut routes = self.routes.write();
        let first = !routes.iter().any(|route| route.filter == filter);
        tracing::debug!(filter = %filter, id = %id, first, "Registering handler");
        routes.push(Route {
            id,
            filter,
            qos,
            handler,
        });
        (id, first)
    }

    /// Removes a handler.
    ///
    /// Returns its filter, and whether it was the last handler for that
    /// filter, or `None` if the ID is unknown.
    pub fn unregister(&self, id: SubscriptionId) -> Option<(String, bool)> {
        let mut routes = self.routes.write();
        let index = routes.iter().position(|route| route.id == id)?;
        let route = routes.remove(index);
        let last = !routes.iter().any(|other| other.filter == route.filter);
        tracing::debug!(filter = %route.filter, id = %id, last, "Unregistering handler");
        Some((route.filter, last))
    }

    /// Delivers a message to every handler whose filter matches its topic.
    ///
    /// Handler errors are logged here and returned in the report, so
    /// callers need not log them again.
    ///
    /// Handlers run after the routing table lock is released, so a handler
    /// may register or unregister routes.
    pub fn route(&self, message: &ReceivedMessage) -> RouteReport {
        let handlers: Vec<MessageHandler> = self
            .routes
            .read()
            .iter()
            .filter(|route| topic_matches(&route.filter, &message.topic))
            .map(|route| route.handler.clone())
            .collect();

        if handlers.is_empty() {
            tracing::trace!(topic = %message.topic, "No handler for topic");
        }

        let mut report = RouteReport::default();
        for handler in handlers {
            report.delivered += 1;
            if let Err(e) = handler(message) {
                tracing::error!(
                    topic = %message.topic,
                    payload = %message.payload,
                    error = %e,
                    "Message handler failed"
                );
                report.errors.push(e);
            }
        }
        report
    }

    /// Returns the distinct filters with their highest requested QoS.
    #[must_use]
    pub fn filters(&self) -> Vec<(String, QosLevel)> {
        let routes = self.routes.read();
        let mut filters: Vec<(String, QosLevel)> = Vec::new();
        for route in routes.iter() {
            match filters.iter_mut().find(|(filter, _)| *filter == route.filter) {
                Some((_, qos)) => *qos = (*qos).max(route.qos),
                None => filters.push((route.filter.clone(), route.qos)),
            }
        }
        filters
    }

    /// Returns the highest QoS requested for a filter, or `None` if no
    /// handler holds it.
    #[must_use]
    pub fn filter_qos(&self, filter: &str) -> Option<QosLevel> {
        self.routes
            .read()
            .iter()
            .filter(|route| route.filter == filter)
            .map(|route| route.qos)
            .max()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.routes.read().len()
    }
}

impl std::fmt::Debug for TopicRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRouter")
            .field("handler_count", &self.handler_count())
            .finish()
    }
}

/// Returns whether a topic name matches a topic filter.
///
/// `+` matches exactly one level and `#` matches the remaining levels,
/// including none. Wildcards in the first level never match topics that
/// start with `$`.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::protocol::topic_matches;
///
/// assert!(topic_matches("player/+/state", "player/den/state"));
/// assert!(topic_matches("player/#", "player"));
/// assert!(!topic_matches("#", "$SYS/uptime"));
/// ```
#[must_use]
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');
    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(expected), Some(actual)) if expected == actual => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
