//! Shared utilities for integration tests.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use todo_guard::cache::{CacheBackend, CacheError, CacheResult, InMemoryCacheBackend};
use todo_guard::todos::{EventSink, OperationEvent};

/// Start a programmable login endpoint at `POST /login` on an ephemeral port.
///
/// `f` decides each response's status and JSON body.
#[allow(dead_code)]
pub async fn start_programmable_login<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, Value)> + Send + 'static,
{
    let app = Router::new().route(
        "/login",
        post(move || {
            let f = f.clone();
            async move {
                let (status, body) = f().await;
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Unsigned-looking JWT carrying `username` and `role` claims.
#[allow(dead_code)]
pub fn token_for(username: &str, role: &str) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({ "username": username, "role": role }),
        &jsonwebtoken::EncodingKey::from_secret(b"login-endpoint-secret"),
    )
    .unwrap()
}

/// In-memory cache that can be switched off to simulate an outage.
#[derive(Clone, Default)]
pub struct FlakyCacheBackend {
    inner: InMemoryCacheBackend,
    down: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryCacheBackend {
        &self.inner
    }

    fn check(&self) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::ConnectionError("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl CacheBackend for FlakyCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.set_with_expiry(key, ttl, value).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        self.check()?;
        self.inner.delete_many(keys).await
    }

    async fn keys_matching(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        self.inner.keys_matching(pattern).await
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.check()?;
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "flaky"
    }
}

/// Sink that keeps every event for inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OperationEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: OperationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
