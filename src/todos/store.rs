//! Primary todo store.
//!
//! The source of truth behind the cache. Injected into
//! [`TodoService`](crate::todos::TodoService) as a capability.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use super::types::TodoList;

/// Errors from the primary store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Primary store unavailable: {0}")]
    Unavailable(String),

    #[error("Primary store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-owner record store.
pub trait TodoStore: Send + Sync {
    /// The owner's list. Owners seen for the first time get a list too.
    fn get(&self, owner_id: &str) -> impl Future<Output = StoreResult<TodoList>> + Send;

    /// Replace the owner's list.
    fn put(&self, owner_id: &str, data: TodoList) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Process-local store. New owners start from [`TodoList::seeded`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    inner: Arc<DashMap<String, TodoList>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for InMemoryTodoStore {
    async fn get(&self, owner_id: &str) -> StoreResult<TodoList> {
        let list = self
            .inner
            .entry(owner_id.to_string())
            .or_insert_with(TodoList::seeded)
            .clone();
        Ok(list)
    }

    async fn put(&self, owner_id: &str, data: TodoList) -> StoreResult<()> {
        self.inner.insert(owner_id.to_string(), data);
        Ok(())
    }
}
