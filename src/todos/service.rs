//! Todo operations with cache-aside reads and invalidating writes.
//!
//! ```text
//! list    cache(todos:user:{owner}) ─hit─▶ return
//!                └─miss─▶ store.get ─▶ cache set (list TTL) ─▶ return
//! create  store.put ─▶ del collection ─▶ set todo:{id} ─▶ event
//! delete  store.put ─▶ del collection ∥ del todo:{id} ─▶ event
//! ```
//!
//! The cache never decides the outcome: every operation succeeds exactly
//! when the primary store does.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::events::{EventSink, Operation, OperationEvent};
use super::store::{StoreError, TodoStore};
use super::types::Todo;
use crate::cache::keys::{all_collections_pattern, all_items_pattern};
use crate::cache::{collection_key, item_key, CacheAsideStore, CacheBackend};
use crate::observability::metrics;

/// Errors from todo operations. Only the primary store can fail one.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Keys removed by [`TodoService::flush_cache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub collections: u64,
    pub items: u64,
}

/// Todo operations over a primary store and a best-effort cache.
pub struct TodoService<S, B> {
    store: S,
    cache: CacheAsideStore<B>,
    events: Arc<dyn EventSink>,
    list_ttl: Duration,
}

impl<S: TodoStore, B: CacheBackend> TodoService<S, B> {
    pub fn new(
        store: S,
        cache: CacheAsideStore<B>,
        events: Arc<dyn EventSink>,
        list_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            events,
            list_ttl,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &CacheAsideStore<B> {
        &self.cache
    }

    /// The owner's todos, ordered by id.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Todo>, TodoError> {
        let key = collection_key(owner_id);
        if let Some(cached) = self.cache.get::<Vec<Todo>>(&key).await {
            metrics::record_todo_operation("list");
            return Ok(cached);
        }

        let todos = self.store.get(owner_id).await?.to_vec();
        self.cache.set_with_ttl(&key, &todos, self.list_ttl).await;

        metrics::record_todo_operation("list");
        Ok(todos)
    }

    /// Append a todo for `owner_id` and return it with its assigned id.
    pub async fn create(&self, owner_id: &str, content: &str) -> Result<Todo, TodoError> {
        let mut list = self.store.get(owner_id).await?;
        let todo = list.push(content);
        self.store.put(owner_id, list).await?;

        self.cache.delete(&collection_key(owner_id)).await;
        self.cache.set(&item_key(todo.id), &todo).await;

        debug!(owner = %owner_id, id = todo.id, "Todo created");
        metrics::record_todo_operation("create");
        self.events
            .record(OperationEvent::new(Operation::Create, owner_id, todo.id));
        Ok(todo)
    }

    /// Remove todo `id` for `owner_id`. Removing an absent id succeeds.
    pub async fn delete(&self, owner_id: &str, id: u64) -> Result<(), TodoError> {
        let mut list = self.store.get(owner_id).await?;
        let removed = list.remove(id).is_some();
        self.store.put(owner_id, list).await?;

        let collection = collection_key(owner_id);
        let item = item_key(id);
        tokio::join!(self.cache.delete(&collection), self.cache.delete(&item));

        debug!(owner = %owner_id, id, removed, "Todo deleted");
        metrics::record_todo_operation("delete");
        self.events
            .record(OperationEvent::new(Operation::Delete, owner_id, id));
        Ok(())
    }

    /// Drop every cached collection and item. The store is untouched.
    pub async fn flush_cache(&self) -> FlushSummary {
        let collection_pattern = all_collections_pattern();
        let item_pattern = all_items_pattern();
        let (collections, items) = tokio::join!(
            self.cache.delete_by_pattern(&collection_pattern),
            self.cache.delete_by_pattern(&item_pattern),
        );

        info!(collections, items, "Todo cache flushed");
        FlushSummary { collections, items }
    }
}
