//! Cache-aside todo flows, including a full cache outage.

use std::sync::Arc;
use std::time::Duration;

use todo_guard::cache::{CacheAsideStore, CacheBackend};
use todo_guard::todos::{InMemoryTodoStore, Operation, TodoService};

mod common;
use common::{FlakyCacheBackend, RecordingSink};

fn service(
    backend: FlakyCacheBackend,
    sink: Arc<RecordingSink>,
) -> TodoService<InMemoryTodoStore, FlakyCacheBackend> {
    TodoService::new(
        InMemoryTodoStore::new(),
        CacheAsideStore::new(backend),
        sink,
        Duration::from_secs(600),
    )
}

#[tokio::test]
async fn test_create_then_list() {
    let backend = FlakyCacheBackend::new();
    let sink = Arc::new(RecordingSink::default());
    let service = service(backend.clone(), sink.clone());

    // Warm the collection entry so the create has something to invalidate.
    assert_eq!(service.list("johnd").await.unwrap().len(), 3);

    let todo = service.create("johnd", "ship it").await.unwrap();
    let todos = service.list("johnd").await.unwrap();
    assert!(todos.contains(&todo));
    assert!(backend.inner().get("todo:4").await.unwrap().is_some());

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation_name, Operation::Create);
    assert_eq!(events[0].record_id, todo.id);
}

#[tokio::test]
async fn test_delete_then_list() {
    let backend = FlakyCacheBackend::new();
    let sink = Arc::new(RecordingSink::default());
    let service = service(backend.clone(), sink.clone());

    let todo = service.create("johnd", "short lived").await.unwrap();
    service.list("johnd").await.unwrap();

    service.delete("johnd", todo.id).await.unwrap();
    assert!(backend.inner().get("todos:user:johnd").await.unwrap().is_none());
    assert!(backend.inner().get("todo:4").await.unwrap().is_none());

    let todos = service.list("johnd").await.unwrap();
    assert!(!todos.contains(&todo));
    assert_eq!(sink.events().len(), 2);
}

#[tokio::test]
async fn test_total_cache_outage() {
    let backend = FlakyCacheBackend::new();
    backend.set_down(true);
    let sink = Arc::new(RecordingSink::default());
    let service = service(backend.clone(), sink.clone());

    assert_eq!(service.list("johnd").await.unwrap().len(), 3);
    let todo = service.create("johnd", "offline").await.unwrap();
    assert_eq!(service.list("johnd").await.unwrap().len(), 4);
    service.delete("johnd", todo.id).await.unwrap();
    assert_eq!(service.list("johnd").await.unwrap().len(), 3);

    let stats = service.cache().stats();
    assert_eq!(stats.hits, 0);
    assert!(stats.errors > 0);
    assert!(!service.cache().health_check().await);
    assert_eq!(sink.events().len(), 2);
}

#[tokio::test]
async fn test_cache_recovers_after_outage() {
    let backend = FlakyCacheBackend::new();
    let sink = Arc::new(RecordingSink::default());
    let service = service(backend.clone(), sink);

    backend.set_down(true);
    service.list("johnd").await.unwrap();
    backend.set_down(false);

    service.list("johnd").await.unwrap();
    service.list("johnd").await.unwrap();
    assert_eq!(service.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let backend = FlakyCacheBackend::new();
    let sink = Arc::new(RecordingSink::default());
    let service = service(backend, sink);

    service.create("johnd", "mine").await.unwrap();
    assert_eq!(service.list("johnd").await.unwrap().len(), 4);
    assert_eq!(service.list("janed").await.unwrap().len(), 3);
}
