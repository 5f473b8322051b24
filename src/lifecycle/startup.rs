//! Startup orchestration.
//!
//! Builds every component from a validated [`GuardConfig`] in dependency
//! order. Only an unusable login endpoint is fatal; cache and event sink
//! problems degrade with a warning. Background tasks subscribe to the
//! given [`Shutdown`].

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthError, AuthService, HttpCredentialVerifier, JwtClaimsDecoder};
use crate::cache::{CacheAsideStore, CacheBackend, CacheProvider};
use crate::config::{EventSinkKind, GuardConfig};
use crate::http::server::AppState;
use crate::lifecycle::shutdown::Shutdown;
use crate::resilience::CircuitBreaker;
use crate::todos::{EventSink, InMemoryTodoStore, TodoService, TracingEventSink};

/// Name the login breaker reports in logs, metrics and snapshots.
pub const LOGIN_BREAKER: &str = "auth-login";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Login endpoint unusable: {0}")]
    Auth(#[from] AuthError),
}

/// Wire the application from configuration.
pub async fn build_state(
    config: GuardConfig,
    shutdown: &Shutdown,
) -> Result<AppState, StartupError> {
    let breaker = Arc::new(CircuitBreaker::new(
        LOGIN_BREAKER,
        config.circuit_breaker.to_breaker_config(),
    ));
    let verifier = HttpCredentialVerifier::new(&config.auth.login_url)?;
    let auth = AuthService::new(verifier, JwtClaimsDecoder, breaker)
        .with_rejections_tripping(config.auth.rejections_trip_breaker);
    info!(
        login_url = %config.auth.login_url,
        rejections_trip_breaker = config.auth.rejections_trip_breaker,
        "Auth service ready"
    );

    let provider = CacheProvider::from_config_graceful(&config.cache).await;
    if let Some(period) = config.cache.sweep_interval() {
        if provider.spawn_sweeper(period, shutdown.subscribe()).is_some() {
            info!(period_secs = period.as_secs(), "Cache sweeper started");
        }
    }
    let events = build_event_sink(&config, &provider).await;
    let cache = CacheAsideStore::with_default_ttl(provider, config.cache.default_ttl());
    info!(
        provider = cache.backend().provider_name(),
        default_ttl_secs = config.cache.default_ttl_secs,
        list_ttl_secs = config.cache.list_ttl_secs,
        "Cache ready"
    );

    let todos = TodoService::new(
        InMemoryTodoStore::new(),
        cache,
        events,
        config.cache.list_ttl(),
    );

    Ok(AppState {
        auth: Arc::new(auth),
        todos: Arc::new(todos),
        config: Arc::new(config),
    })
}

#[cfg(feature = "cache-redis")]
async fn build_event_sink(config: &GuardConfig, provider: &CacheProvider) -> Arc<dyn EventSink> {
    use crate::cache::RedisCacheBackend;
    use crate::todos::RedisEventSink;

    if config.events.sink == EventSinkKind::Log {
        return Arc::new(TracingEventSink);
    }

    // Share the cache connection when the cache is on the same server.
    let connection = match (provider, config.cache.redis_url.as_deref()) {
        (CacheProvider::Redis(backend), _) => Some(backend.connection()),
        (_, Some(url)) => match RedisCacheBackend::connect(url).await {
            Ok(backend) => Some(backend.connection()),
            Err(e) => {
                tracing::warn!(error = %e, "Redis event sink unavailable, logging events instead");
                None
            }
        },
        (_, None) => None,
    };

    match connection {
        Some(connection) => {
            info!(channel = %config.events.channel, "Publishing operation events to Redis");
            Arc::new(RedisEventSink::new(connection, config.events.channel.clone()))
        }
        None => Arc::new(TracingEventSink),
    }
}

#[cfg(not(feature = "cache-redis"))]
async fn build_event_sink(config: &GuardConfig, _provider: &CacheProvider) -> Arc<dyn EventSink> {
    if config.events.sink == EventSinkKind::Redis {
        tracing::warn!(
            "Redis event sink selected without the cache-redis feature, logging events instead"
        );
    }
    Arc::new(TracingEventSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackendKind;
    use crate::resilience::CircuitState;
    use std::time::Duration;

    #[tokio::test]
    async fn test_build_state_from_defaults() {
        let shutdown = Shutdown::new();
        let state = build_state(GuardConfig::default(), &shutdown).await.unwrap();

        assert_eq!(state.auth.breaker().name(), LOGIN_BREAKER);
        assert!(state.auth.rejections_trip());
        // The memory sweeper is listening for shutdown.
        assert_eq!(shutdown.receiver_count(), 1);
        assert_eq!(state.auth.breaker().state(), CircuitState::Closed);
        assert_eq!(state.todos.cache().backend().provider_name(), "memory");
        assert_eq!(state.todos.list("johnd").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_breaker_settings_are_applied() {
        let mut config = GuardConfig::default();
        config.circuit_breaker.failure_threshold = 7;
        config.cache.backend = CacheBackendKind::None;
        config.auth.rejections_trip_breaker = false;

        let shutdown = Shutdown::new();
        let state = build_state(config, &shutdown).await.unwrap();
        assert_eq!(state.auth.breaker().config().failure_threshold, 7);
        assert!(!state.auth.rejections_trip());
        assert!(!state.todos.cache().backend().is_enabled());
        assert_eq!(shutdown.receiver_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let _state = build_state(GuardConfig::default(), &shutdown).await.unwrap();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(shutdown.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_login_url_is_fatal() {
        let mut config = GuardConfig::default();
        config.auth.login_url = "not a url".to_string();

        assert!(matches!(
            build_state(config, &Shutdown::new()).await,
            Err(StartupError::Auth(_))
        ));
    }
}
