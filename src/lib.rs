//! Subwatch - MQTT subscription tracking
//!
//! Sits beside an MQTT broker engine and keeps a count of subscribers per
//! topic filter, so publishers can ask whether anyone is listening before
//! they build a payload. Filters that drop to zero subscribers are kept for
//! a grace period and then pruned by a background task.

pub mod broker;
pub mod config;
pub mod hooks;
pub mod manager;
pub mod registry;
pub mod replay;
pub mod topic;

pub use broker::{Broker, BrokerEngine, BrokerError, EngineError, SystemInfo};
pub use config::{BrokerOptions, Config, ConfigError, TopicsConfig};
pub use hooks::{CompositeHooks, DefaultHooks, FnHooks, SubscriptionHooks};
pub use manager::{CleanupScheduler, TopicManager, TopicStats};
pub use registry::FilterRegistry;
