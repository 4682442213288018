// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker transport.
//!
//! [`MqttTransport`] owns one broker connection. A background task polls
//! the `rumqttc` event loop and routes every incoming publish through a
//! [`TopicRouter`]. Any number of entities can share one transport.
//!
//! # Examples
//!
//! ```no_run
//! use mqtt_media_player::protocol::MqttTransport;
//!
//! # async fn example() -> mqtt_media_player::Result<()> {
//! let transport = MqttTransport::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .build()
//!     .await?;
//!
//! if transport.is_connected() {
//!     println!("Connected as {}", transport.client_id());
//! }
//!
//! transport.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{MessageHandler, ReceivedMessage, TopicRouter, Transport};
use crate::error::ProtocolError;
use crate::subscription::SubscriptionId;
use crate::types::QosLevel;

/// Connection settings of an [`MqttTransport`].
#[derive(Debug, Clone)]
struct MqttTransportConfig {
    host: String,
    port: u16,
    client_id: Option<String>,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
}

impl Default for MqttTransportConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            client_id: None,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

/// A transport backed by an MQTT broker connection.
///
/// Cheaply cloneable; clones share the connection and the routing table.
/// Every registration subscribes on the broker with the highest QoS any
/// handler of the filter asked for. The broker then resends retained
/// messages for the filter, which reach every handler of that filter, not
/// only the new one. The broker subscription is dropped when the last
/// handler of a filter is removed.
#[derive(Clone)]
pub struct MqttTransport {
    inner: Arc<MqttTransportInner>,
}

struct MqttTransportInner {
    client: AsyncClient,
    router: TopicRouter,
    config: MqttTransportConfig,
    client_id: String,
    connected: AtomicBool,
}

impl MqttTransport {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }

    /// Returns whether the broker connection is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Returns the client identifier used on the broker.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.router.handler_count()
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be sent.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );
        self.inner.client.disconnect().await?;
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn route(&self, message: &ReceivedMessage) {
        let report = self.inner.router.route(message);
        tracing::trace!(
            topic = %message.topic,
            delivered = report.delivered,
            rejected = report.errors.len(),
            "Routed MQTT message"
        );
    }
}

impl Transport for MqttTransport {
    async fn subscribe(
        &self,
        topic: &str,
        qos: QosLevel,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, ProtocolError> {
        if !self.is_connected() {
            return Err(ProtocolError::NotConnected);
        }
        let (id, first) = self.inner.router.register(topic, qos, handler);
        // A filter already held is subscribed again so the broker applies
        // the highest QoS and sends its retained messages once more.
        let qos = self.inner.router.filter_qos(topic).unwrap_or(qos);
        if let Err(e) = self.inner.client.subscribe(topic, QoS::from(qos)).await {
            self.inner.router.unregister(id);
            return Err(e.into());
        }
        tracing::debug!(topic = %topic, qos = %qos, shared = !first, "Subscribed on broker");
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProtocolError> {
        let Some((topic, last)) = self.inner.router.unregister(id) else {
            return Ok(());
        };
        if last {
            self.inner.client.unsubscribe(&topic).await?;
            tracing::debug!(topic = %topic, "Unsubscribed on broker");
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
        if !self.is_connected() {
            return Err(ProtocolError::NotConnected);
        }
        self.inner
            .client
            .publish(topic, QoS::from(qos), retain, payload.as_bytes().to_vec())
            .await?;
        tracing::debug!(topic = %topic, payload = %payload, retain, "Published");
        Ok(())
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("client_id", &self.inner.client_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for an [`MqttTransport`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use mqtt_media_player::protocol::MqttTransport;
///
/// # async fn example() -> mqtt_media_player::Result<()> {
/// let transport = MqttTransport::builder()
///     .host("broker.local")
///     .client_id("living-room-player")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttTransportBuilder {
    config: MqttTransportConfig,
}

impl MqttTransportBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the client identifier (default: random).
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Connects to the broker.
    ///
    /// Returns once the broker acknowledged the connection.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(self) -> Result<MqttTransport, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = self.config.client_id.clone().unwrap_or_else(|| {
            let random = Uuid::new_v4().simple().to_string();
            format!("mmp-{}", &random[..12])
        });

        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let transport = MqttTransport {
            inner: Arc::new(MqttTransportInner {
                client,
                router: TopicRouter::new(),
                config: self.config.clone(),
                client_id,
                connected: AtomicBool::new(false),
            }),
        };

        let (connack_tx, connack_rx) = oneshot::channel();
        let transport_clone = transport.clone();
        tokio::spawn(async move {
            handle_events(event_loop, transport_clone, Some(connack_tx)).await;
        });

        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                transport.inner.connected.store(true, Ordering::Release);
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    client_id = %transport.inner.client_id,
                    "Connected to MQTT broker"
                );
                Ok(transport)
            }
            Ok(Err(_)) => Err(ProtocolError::ConnectionFailed(
                "MQTT event loop terminated unexpectedly".to_string(),
            )),
            Err(_) => Err(ProtocolError::ConnectionFailed(format!(
                "MQTT connection timeout after {}s",
                timeout.as_secs()
            ))),
        }
    }
}

async fn handle_events(
    mut event_loop: EventLoop,
    transport: MqttTransport,
    mut connack_tx: Option<oneshot::Sender<()>>,
) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                transport.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
                    tracing::warn!(topic = %publish.topic, "Dropping non UTF-8 payload");
                    continue;
                };
                tracing::debug!(topic = %publish.topic, payload = %payload, "MQTT message received");
                let message = ReceivedMessage {
                    topic: publish.topic.clone(),
                    payload,
                    qos: qos_level(publish.qos),
                    retain: publish.retain,
                };
                transport.route(&message);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                transport.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                transport.inner.connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}

fn qos_level(qos: QoS) -> QosLevel {
    match qos {
        QoS::AtMostOnce => QosLevel::AtMostOnce,
        QoS::AtLeastOnce => QosLevel::AtLeastOnce,
        QoS::ExactlyOnce => QosLevel::ExactlyOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let builder = MqttTransportBuilder::default();
        assert_eq!(builder.config.port, 1883);
        assert!(builder.config.host.is_empty());
        assert!(builder.config.client_id.is_none());
        assert!(builder.config.credentials.is_none());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let builder = MqttTransportBuilder::default()
            .host("192.168.1.50")
            .port(8883)
            .client_id("player")
            .credentials("admin", "secret")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(15));

        assert_eq!(builder.config.host, "192.168.1.50");
        assert_eq!(builder.config.port, 8883);
        assert_eq!(builder.config.client_id.as_deref(), Some("player"));
        assert!(builder.config.credentials.is_some());
        assert_eq!(builder.config.keep_alive, Duration::from_secs(45));
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn builder_missing_host_fails() {
        let result = MqttTransportBuilder::default().build().await;
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn qos_round_trip() {
        for level in [
            QosLevel::AtMostOnce,
            QosLevel::AtLeastOnce,
            QosLevel::ExactlyOnce,
        ] {
            assert_eq!(qos_level(QoS::from(level)), level);
        }
    }
}
