//! Topic Manager
//!
//! Tracks which topic filters currently have subscribers so the publish path
//! can skip building payloads nobody will receive. Subscribe and unsubscribe
//! events from the broker engine update the filter registry; the first
//! subscriber and the last unsubscriber of a filter are reported through
//! [`SubscriptionHooks`]. A background scheduler prunes filters that have
//! stayed at zero subscribers for longer than the grace period.

mod cleanup;

pub use cleanup::CleanupScheduler;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::TopicsConfig;
use crate::hooks::SubscriptionHooks;
use crate::registry::FilterRegistry;
use crate::topic::topic_matches_filter;


/// Snapshot of the tracker's size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicStats {
    /// Filters held, including zero-count filters awaiting cleanup
    pub tracked_filters: usize,
    /// Filters with at least one subscriber
    pub active_filters: usize,
}

/// Subscription tracker sitting in front of a broker engine
pub struct TopicManager {
    registry: Arc<FilterRegistry>,
    hooks: Arc<dyn SubscriptionHooks>,
    config: TopicsConfig,
    cleanup: CleanupScheduler,
}

impl TopicManager {
    /// Create a manager that sweeps every `cleanup_threshold` and drops filters
    /// that have been at zero for at least that long
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(hooks: Arc<dyn SubscriptionHooks>, cleanup_threshold: Duration) -> Self {
        Self::with_config(hooks, TopicsConfig::with_threshold(cleanup_threshold))
    }

    /// Create a manager with separate sweep interval and grace period
    ///
    /// The cleanup task starts immediately and runs until [`stop`](Self::stop)
    /// is called or the manager is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_config(hooks: Arc<dyn SubscriptionHooks>, config: TopicsConfig) -> Self {
        let registry = Arc::new(FilterRegistry::new());
        let cleanup = CleanupScheduler::spawn(
            registry.clone(),
            config.cleanup_interval,
            config.cleanup_threshold,
        );

        Self {
            registry,
            hooks,
            config,
            cleanup,
        }
    }

    /// Record one subscription to `filter`
    ///
    /// Runs `on_first_subscriber` inline when this is the filter's first
    /// live subscriber.
    pub fn subscribe(&self, filter: &str) {
        if self.registry.increment(filter) {
            debug!("First subscriber for topic filter {}", filter);
            self.hooks.on_first_subscriber(filter);
        }
    }

    /// Record one unsubscription from `filter`
    ///
    /// Runs `on_last_unsubscriber` inline when this removed the filter's
    /// last live subscriber. Unknown filters and filters already at zero
    /// are ignored.
    pub fn unsubscribe(&self, filter: &str) {
        if self.registry.decrement(filter) {
            debug!("Last subscriber left topic filter {}", filter);
            self.hooks.on_last_unsubscriber(filter);
        }
    }

    /// Whether any live filter matches the concrete `topic`
    pub fn has_subscribers(&self, topic: &str) -> bool {
        let found = self
            .registry
            .any_active(|filter| topic_matches_filter(topic, filter));
        trace!("has_subscribers({}) = {}", topic, found);
        found
    }

    /// Number of tracked filters, including ones awaiting cleanup
    pub fn size(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> TopicStats {
        TopicStats {
            tracked_filters: self.registry.len(),
            active_filters: self.registry.active_count(),
        }
    }

    /// Run a sweep immediately, outside the schedule
    pub fn sweep_now(&self) -> usize {
        self.registry
            .sweep(Instant::now(), self.config.cleanup_threshold)
    }

    pub fn config(&self) -> &TopicsConfig {
        &self.config
    }

    /// Stop the cleanup task; tracking keeps working without it
    pub fn stop(&self) {
        self.cleanup.stop();
    }

    /// Stop the cleanup task and wait until it has exited
    pub async fn shutdown(&self) {
        self.cleanup.shutdown().await;
    }

    /// Whether the cleanup task is still running
    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup.is_running()
    }
}
