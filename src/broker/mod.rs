//! Broker Adapter
//!
//! Glue between an external MQTT broker engine and the topic manager. The
//! engine owns the listeners and the wire protocol; this adapter turns the
//! engine's per-connection subscribe/unsubscribe events into topic manager
//! calls and gates publishes on whether anyone is listening.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, trace};

use crate::config::{BrokerOptions, TopicsConfig};
use crate::hooks::SubscriptionHooks;
use crate::manager::TopicManager;
use crate::topic::validate_topic_name;

#[cfg(test)]
mod tests;

/// Error type reported by broker engines
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Broker error types
#[derive(Debug)]
pub enum BrokerError {
    /// Options rejected before the engine was touched
    InvalidOptions(String),
    /// Publish topic is not a valid topic name
    InvalidTopic(&'static str),
    /// The engine reported a failure
    Engine(EngineError),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::InvalidOptions(msg) => write!(f, "Invalid broker options: {}", msg),
            BrokerError::InvalidTopic(msg) => write!(f, "Invalid topic: {}", msg),
            BrokerError::Engine(e) => write!(f, "Broker engine error: {}", e),
        }
    }
}

impl std::error::Error for BrokerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrokerError::Engine(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<EngineError> for BrokerError {
    fn from(e: EngineError) -> Self {
        BrokerError::Engine(e)
    }
}

/// Point-in-time statistics reported by a broker engine
///
/// Counters an engine does not track stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    /// Engine version string
    pub version: String,
    /// Time since the engine started serving
    pub uptime: Duration,
    /// Clients currently connected
    pub clients_connected: u64,
    /// Clients ever connected
    pub clients_total: u64,
    /// Highest number of concurrently connected clients
    pub clients_maximum: u64,
    /// Live subscriptions across all clients
    pub subscriptions: u64,
    /// Retained messages held
    pub retained: u64,
    /// PUBLISH packets received
    pub messages_received: u64,
    /// PUBLISH packets sent
    pub messages_sent: u64,
    /// PUBLISH packets dropped
    pub messages_dropped: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// The MQTT broker engine the adapter drives
///
/// Implementations wrap a concrete broker: they accept publishes, own the
/// network listeners, and call [`Broker::on_topic_subscribe`] /
/// [`Broker::on_topic_unsubscribe`] from their event hooks.
#[async_trait]
pub trait BrokerEngine: Send + Sync {
    /// Run the listeners until closed
    async fn serve(&self) -> Result<(), EngineError>;

    /// Close the listeners and disconnect clients
    async fn close(&self) -> Result<(), EngineError>;

    /// Deliver a message to the engine's subscribers
    async fn publish(&self, topic: &str, payload: Bytes, retain: bool) -> Result<(), EngineError>;

    /// Snapshot of the engine's statistics
    fn system_info(&self) -> SystemInfo;
}

/// Broker engine plus subscription tracking
pub struct Broker {
    engine: Arc<dyn BrokerEngine>,
    options: BrokerOptions,
    topics: Arc<TopicManager>,
}

impl Broker {
    /// Validate the options and start tracking subscriptions
    ///
    /// Must be called inside a tokio runtime, since the topic manager's
    /// cleanup task starts right away.
    pub fn new(
        engine: Arc<dyn BrokerEngine>,
        hooks: Arc<dyn SubscriptionHooks>,
        options: BrokerOptions,
        topics: TopicsConfig,
    ) -> Result<Self, BrokerError> {
        options.validate().map_err(BrokerError::InvalidOptions)?;

        if options.websocket_enabled {
            debug!("Websocket listener on {}", options.websocket_bind_address);
        }
        if options.tcp_enabled {
            debug!("TCP listener on {}", options.tcp_bind_address);
        }

        let topics = Arc::new(TopicManager::with_config(hooks, topics));

        Ok(Self {
            engine,
            options,
            topics,
        })
    }

    /// Engine hook: a client subscribed to `filter`
    pub fn on_topic_subscribe(&self, filter: &str, client_id: &str, qos: u8) {
        trace!("Client {} subscribed to {} (qos={})", client_id, filter, qos);
        self.topics.subscribe(filter);
    }

    /// Engine hook: a client unsubscribed from `filter`
    pub fn on_topic_unsubscribe(&self, filter: &str, client_id: &str) {
        trace!("Client {} unsubscribed from {}", client_id, filter);
        self.topics.unsubscribe(filter);
    }

    /// Run the engine until it is closed
    pub async fn start(&self) -> Result<(), BrokerError> {
        info!("Starting broker engine");
        self.engine.serve().await?;
        Ok(())
    }

    /// Stop subscription cleanup and close the engine
    pub async fn stop(&self) -> Result<(), BrokerError> {
        info!("Stopping broker engine");
        self.topics.shutdown().await;
        self.engine.close().await?;
        Ok(())
    }

    /// Whether any client is subscribed to a filter matching `topic`
    pub fn has_subscribers(&self, topic: &str) -> bool {
        self.topics.has_subscribers(topic)
    }

    /// Publish a non-retained message unconditionally
    pub async fn send(&self, topic: &str, payload: Bytes) -> Result<(), BrokerError> {
        validate_topic_name(topic).map_err(BrokerError::InvalidTopic)?;
        self.engine.publish(topic, payload, false).await?;
        Ok(())
    }

    /// Build and publish a message only if someone is subscribed
    ///
    /// `build_payload` is not called when no filter matches `topic`.
    /// Returns whether a message was published.
    pub async fn publish_if_subscribed<F>(
        &self,
        topic: &str,
        build_payload: F,
    ) -> Result<bool, BrokerError>
    where
        F: FnOnce() -> Bytes + Send,
    {
        validate_topic_name(topic).map_err(BrokerError::InvalidTopic)?;

        if !self.topics.has_subscribers(topic) {
            trace!("Skipping publish to {}: no subscribers", topic);
            return Ok(false);
        }

        let payload = build_payload();
        self.engine.publish(topic, payload, false).await?;
        Ok(true)
    }

    /// Engine statistics, as reported by the engine
    pub fn system_info(&self) -> SystemInfo {
        self.engine.system_info()
    }

    /// Number of filters tracked by the topic manager
    pub fn topics_manager_size(&self) -> usize {
        self.topics.size()
    }

    /// Shared handle to the topic manager
    pub fn topic_manager(&self) -> &Arc<TopicManager> {
        &self.topics
    }

    pub fn options(&self) -> &BrokerOptions {
        &self.options
    }
}
