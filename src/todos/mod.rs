//! Per-owner todo records.
//!
//! [`TodoService`] reads through the cache and invalidates it on writes; the
//! injected [`TodoStore`] stays the source of truth.

pub mod events;
pub mod service;
pub mod store;
pub mod types;

pub use events::{ChannelEventSink, EventSink, Operation, OperationEvent, TracingEventSink};
pub use service::{FlushSummary, TodoError, TodoService};
pub use store::{InMemoryTodoStore, StoreError, StoreResult, TodoStore};
pub use types::{Todo, TodoList};

#[cfg(feature = "cache-redis")]
pub use events::RedisEventSink;
