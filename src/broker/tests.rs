//! Broker adapter tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::*;
use crate::hooks::DefaultHooks;

/// Engine that records publishes instead of delivering them
#[derive(Default)]
struct RecordingEngine {
    published: Mutex<Vec<(String, Bytes, bool)>>,
    closed: AtomicBool,
    fail_publish: AtomicBool,
}

#[async_trait]
impl BrokerEngine for RecordingEngine {
    async fn serve(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Bytes, retain: bool) -> Result<(), EngineError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err("engine down".into());
        }
        self.published
            .lock()
            .push((topic.to_string(), payload, retain));
        Ok(())
    }

    fn system_info(&self) -> SystemInfo {
        let sent = self.published.lock().len() as u64;
        SystemInfo {
            version: "recording-1.0".to_string(),
            uptime: Duration::from_secs(42),
            clients_connected: 3,
            messages_sent: sent,
            ..Default::default()
        }
    }
}

fn broker_with(engine: Arc<RecordingEngine>) -> Broker {
    Broker::new(
        engine,
        Arc::new(DefaultHooks),
        BrokerOptions::default(),
        TopicsConfig::with_threshold(Duration::from_secs(60)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_rejects_no_listeners() {
    let options = BrokerOptions {
        websocket_enabled: false,
        tcp_enabled: false,
        ..Default::default()
    };
    let result = Broker::new(
        Arc::new(RecordingEngine::default()),
        Arc::new(DefaultHooks),
        options,
        TopicsConfig::default(),
    );

    match result {
        Err(BrokerError::InvalidOptions(msg)) => {
            assert_eq!(msg, "at least websocket or TCP must be enabled")
        }
        _ => panic!("expected InvalidOptions"),
    }
}

#[tokio::test]
async fn test_rejects_bad_bind_address() {
    let options = BrokerOptions {
        websocket_bind_address: "localhost".to_string(),
        ..Default::default()
    };
    let result = Broker::new(
        Arc::new(RecordingEngine::default()),
        Arc::new(DefaultHooks),
        options,
        TopicsConfig::default(),
    );
    assert!(matches!(result, Err(BrokerError::InvalidOptions(_))));
}

#[tokio::test]
async fn test_engine_events_drive_tracking() {
    let broker = broker_with(Arc::new(RecordingEngine::default()));

    broker.on_topic_subscribe("blocks/+", "client-a", 0);
    broker.on_topic_subscribe("blocks/+", "client-b", 1);
    assert_eq!(broker.topics_manager_size(), 1);
    assert!(broker.has_subscribers("blocks/latest"));

    broker.on_topic_unsubscribe("blocks/+", "client-a");
    assert!(broker.has_subscribers("blocks/latest"));

    broker.on_topic_unsubscribe("blocks/+", "client-b");
    assert!(!broker.has_subscribers("blocks/latest"));
    assert_eq!(broker.topics_manager_size(), 1);
}

#[tokio::test]
async fn test_publish_skipped_without_subscribers() {
    let engine = Arc::new(RecordingEngine::default());
    let broker = broker_with(engine.clone());
    let builds = AtomicUsize::new(0);

    let published = broker
        .publish_if_subscribed("milestones/latest", || {
            builds.fetch_add(1, Ordering::SeqCst);
            Bytes::from_static(b"{}")
        })
        .await
        .unwrap();

    assert!(!published);
    assert_eq!(builds.load(Ordering::SeqCst), 0, "payload must not be built");
    assert!(engine.published.lock().is_empty());
}

#[tokio::test]
async fn test_publish_when_subscribed() {
    let engine = Arc::new(RecordingEngine::default());
    let broker = broker_with(engine.clone());
    broker.on_topic_subscribe("milestones/#", "client", 0);

    let published = broker
        .publish_if_subscribed("milestones/latest", || Bytes::from_static(b"{\"index\":1}"))
        .await
        .unwrap();

    assert!(published);
    let sent = engine.published.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "milestones/latest");
    assert_eq!(sent[0].1, Bytes::from_static(b"{\"index\":1}"));
    assert!(!sent[0].2, "publishes are not retained");
}

#[tokio::test]
async fn test_publish_rejects_wildcard_topic() {
    let broker = broker_with(Arc::new(RecordingEngine::default()));
    broker.on_topic_subscribe("#", "client", 0);

    let result = broker
        .publish_if_subscribed("outputs/+", Bytes::new)
        .await;
    assert!(matches!(result, Err(BrokerError::InvalidTopic(_))));

    let result = broker.send("outputs/#", Bytes::new()).await;
    assert!(matches!(result, Err(BrokerError::InvalidTopic(_))));
}

#[tokio::test]
async fn test_send_is_unconditional() {
    let engine = Arc::new(RecordingEngine::default());
    let broker = broker_with(engine.clone());

    broker
        .send("nobody/listening", Bytes::from_static(b"x"))
        .await
        .unwrap();
    assert_eq!(engine.published.lock().len(), 1);
}

#[tokio::test]
async fn test_engine_error_propagates() {
    let engine = Arc::new(RecordingEngine::default());
    engine.fail_publish.store(true, Ordering::SeqCst);
    let broker = broker_with(engine);
    broker.on_topic_subscribe("a", "client", 0);

    let err = broker
        .publish_if_subscribed("a", Bytes::new)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Broker engine error: engine down");
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_stop_closes_engine_and_cleanup() {
    let engine = Arc::new(RecordingEngine::default());
    let broker = broker_with(engine.clone());

    broker.start().await.unwrap();
    assert!(broker.topic_manager().is_cleanup_running());

    broker.stop().await.unwrap();
    assert!(engine.closed.load(Ordering::SeqCst));
    assert!(!broker.topic_manager().is_cleanup_running());
}

#[tokio::test]
async fn test_system_info_comes_from_engine() {
    let engine = Arc::new(RecordingEngine::default());
    let broker = broker_with(engine.clone());

    let info = broker.system_info();
    assert_eq!(info.version, "recording-1.0");
    assert_eq!(info.uptime, Duration::from_secs(42));
    assert_eq!(info.clients_connected, 3);
    assert_eq!(info.messages_sent, 0);
    assert_eq!(info.retained, 0, "untracked counters stay at zero");

    broker.send("status", Bytes::from_static(b"up")).await.unwrap();
    assert_eq!(broker.system_info().messages_sent, 1);
}

#[test]
fn test_broker_error_display() {
    let err = BrokerError::InvalidOptions("bad".to_string());
    assert_eq!(format!("{}", err), "Invalid broker options: bad");

    let err = BrokerError::InvalidTopic("topic name cannot contain wildcards");
    assert_eq!(
        format!("{}", err),
        "Invalid topic: topic name cannot contain wildcards"
    );
}
