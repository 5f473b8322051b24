//! Operation events.
//!
//! Every successful create or delete emits one [`OperationEvent`] after the
//! primary write. Sinks are fire-and-forget: `record` is synchronous and a
//! sink failure is logged, never returned.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Kind of write that produced the event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Delete => "DELETE",
        }
    }
}

/// Event published after a successful write.
///
/// Field names on the wire match what the log processor consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationEvent {
    #[serde(rename = "zipkinSpan")]
    pub trace_id: String,
    #[serde(rename = "opName")]
    pub operation_name: Operation,
    #[serde(rename = "username")]
    pub owner_id: String,
    #[serde(rename = "todoId")]
    pub record_id: u64,
}

impl OperationEvent {
    /// Event stamped with a fresh trace id.
    pub fn new(operation_name: Operation, owner_id: impl Into<String>, record_id: u64) -> Self {
        Self {
            trace_id: crate::observability::tracing::new_trace_id(),
            operation_name,
            owner_id: owner_id.into(),
            record_id,
        }
    }
}

/// Destination for operation events.
pub trait EventSink: Send + Sync + 'static {
    /// Hand off `event`. Must not block the caller.
    fn record(&self, event: OperationEvent);
}

/// Writes each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: OperationEvent) {
        info!(
            trace_id = %event.trace_id,
            operation = event.operation_name.as_str(),
            owner = %event.owner_id,
            record_id = event.record_id,
            "Todo operation"
        );
    }
}

/// Forwards events into an unbounded Tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<OperationEvent>,
}

impl ChannelEventSink {
    /// Sink plus the receiving half for the consumer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OperationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn record(&self, event: OperationEvent) {
        if self.tx.send(event).is_err() {
            warn!("Operation event receiver dropped, event discarded");
        }
    }
}

#[cfg(feature = "cache-redis")]
pub use self::redis_sink::RedisEventSink;

#[cfg(feature = "cache-redis")]
mod redis_sink {
    use super::{EventSink, OperationEvent};
    use tracing::warn;

    /// Publishes events as JSON on a Redis pub/sub channel.
    ///
    /// Each publish runs on its own task so `record` returns immediately.
    #[derive(Clone)]
    pub struct RedisEventSink {
        connection: redis::aio::ConnectionManager,
        channel: String,
    }

    impl std::fmt::Debug for RedisEventSink {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisEventSink")
                .field("channel", &self.channel)
                .finish()
        }
    }

    impl RedisEventSink {
        pub fn new(connection: redis::aio::ConnectionManager, channel: impl Into<String>) -> Self {
            Self {
                connection,
                channel: channel.into(),
            }
        }
    }

    impl EventSink for RedisEventSink {
        fn record(&self, event: OperationEvent) {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to encode operation event");
                    return;
                }
            };

            let mut conn = self.connection.clone();
            let channel = self.channel.clone();
            tokio::spawn(async move {
                let published = redis::cmd("PUBLISH")
                    .arg(&channel)
                    .arg(payload)
                    .query_async::<i64>(&mut conn)
                    .await;
                if let Err(e) = published {
                    warn!(channel = %channel, error = %e, "Failed to publish operation event");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let event = OperationEvent {
            trace_id: "abc123".to_string(),
            operation_name: Operation::Create,
            owner_id: "johnd".to_string(),
            record_id: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "zipkinSpan": "abc123",
                "opName": "CREATE",
                "username": "johnd",
                "todoId": 4
            })
        );
    }

    #[test]
    fn test_new_event_gets_trace_id() {
        let a = OperationEvent::new(Operation::Delete, "johnd", 1);
        let b = OperationEvent::new(Operation::Delete, "johnd", 1);
        assert!(!a.trace_id.is_empty());
        assert_ne!(a.trace_id, b.trace_id);
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelEventSink::new();
        sink.record(OperationEvent::new(Operation::Create, "johnd", 4));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.operation_name, Operation::Create);
        assert_eq!(event.record_id, 4);
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelEventSink::new();
        drop(rx);
        sink.record(OperationEvent::new(Operation::Create, "johnd", 4));
    }
}
