use axum::{extract::State, Json};
use serde::Serialize;

use crate::cache::{CacheBackend, CacheStats};
use crate::http::server::AppState;
use crate::resilience::{CircuitBreakerSnapshot, CircuitState};
use crate::todos::FlushSummary;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub login_circuit: CircuitState,
    pub cache_provider: &'static str,
}

#[derive(Serialize)]
pub struct CacheStatus {
    pub provider: &'static str,
    pub enabled: bool,
    pub healthy: bool,
    pub default_ttl_secs: u64,
    pub list_ttl_secs: u64,
    pub stats: CacheStats,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let login_circuit = state.auth.breaker().state();
    let status = match login_circuit {
        CircuitState::Closed => "operational",
        CircuitState::Open | CircuitState::HalfOpen => "degraded",
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        login_circuit,
        cache_provider: state.todos.cache().backend().provider_name(),
    })
}

pub async fn get_circuit(State(state): State<AppState>) -> Json<CircuitBreakerSnapshot> {
    Json(state.auth.breaker().snapshot())
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheStatus> {
    let cache = state.todos.cache();
    Json(CacheStatus {
        provider: cache.backend().provider_name(),
        enabled: cache.backend().is_enabled(),
        healthy: cache.health_check().await,
        default_ttl_secs: cache.default_ttl().as_secs(),
        list_ttl_secs: state.config.cache.list_ttl_secs,
        stats: cache.stats(),
    })
}

pub async fn flush_cache(State(state): State<AppState>) -> Json<FlushSummary> {
    Json(state.todos.flush_cache().await)
}
