//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::CircuitBreakerConfig;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Breaker protecting the credential-verification endpoint.
    pub circuit_breaker: CircuitBreakerSettings,

    /// Cache backend and TTLs.
    pub cache: CacheConfig,

    /// Credential-verification endpoint.
    pub auth: AuthConfig,

    /// Where operation events are published.
    pub events: EventsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API.
    pub admin: AdminConfig,
}

/// Circuit breaker settings as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// Failures recorded while closed before the circuit opens.
    pub failure_threshold: u32,

    /// Milliseconds the circuit stays open before a trial is admitted.
    pub reset_timeout_ms: u64,

    /// Deadline for each protected call in milliseconds.
    pub call_timeout_ms: u64,

    /// Limit on concurrent half-open trials (unset = unlimited).
    pub half_open_max_trials: Option<u32>,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            reset_timeout_ms: 30_000,
            call_timeout_ms: 5_000,
            half_open_max_trials: None,
        }
    }
}

impl CircuitBreakerSettings {
    /// Convert to the runtime breaker configuration.
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            reset_timeout: Duration::from_millis(self.reset_timeout_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            half_open_max_trials: self.half_open_max_trials,
        }
    }
}

/// Which cache backend to use.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// In-process map.
    #[default]
    Memory,
    /// Redis server (needs the `cache-redis` feature).
    Redis,
    /// Caching disabled.
    None,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,

    /// TTL for item entries and any set without an explicit TTL.
    pub default_ttl_secs: u64,

    /// TTL for collection (list) entries.
    pub list_ttl_secs: u64,

    /// Redis connection URL, required when `backend = "redis"`.
    pub redis_url: Option<String>,

    /// Seconds between sweeps of expired in-memory entries (0 disables).
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            default_ttl_secs: 300,
            list_ttl_secs: 600,
            redis_url: None,
            sweep_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    /// Sweep period, `None` when sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

/// Credential-verification endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    /// URL that accepts `POST {username, password}` and returns an access token.
    pub login_url: String,

    /// Count rejected credentials (4xx) as breaker failures.
    pub rejections_trip_breaker: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: "http://127.0.0.1:8000/login".to_string(),
            rejections_trip_breaker: true,
        }
    }
}

/// Operation event sink selection.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventSinkKind {
    /// Structured log line per event.
    #[default]
    Log,
    /// Redis PUBLISH on `channel` (needs the `cache-redis` feature).
    Redis,
}

/// Operation event configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsConfig {
    pub sink: EventSinkKind,

    /// Pub/sub channel name for the Redis sink.
    pub channel: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            sink: EventSinkKind::Log,
            channel: "log_channel".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = GuardConfig::default();
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.circuit_breaker.reset_timeout_ms, 30_000);
        assert_eq!(config.circuit_breaker.call_timeout_ms, 5_000);
        assert_eq!(config.cache.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.list_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache.sweep_interval(), Some(Duration::from_secs(60)));
        assert!(config.auth.rejections_trip_breaker);
    }

    #[test]
    fn test_zero_sweep_interval_disables_sweeping() {
        let config: GuardConfig = toml::from_str(
            r#"
            [cache]
            sweep_interval_secs = 0

            [auth]
            rejections_trip_breaker = false
            "#,
        )
        .unwrap();

        assert!(config.cache.sweep_interval().is_none());
        assert!(!config.auth.rejections_trip_breaker);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: GuardConfig = toml::from_str(
            r#"
            [circuit_breaker]
            failure_threshold = 5
            half_open_max_trials = 1

            [cache]
            backend = "none"
            "#,
        )
        .unwrap();

        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.reset_timeout_ms, 30_000);
        assert_eq!(config.circuit_breaker.half_open_max_trials, Some(1));
        assert_eq!(config.cache.backend, CacheBackendKind::None);
        assert_eq!(config.cache.list_ttl_secs, 600);
        assert_eq!(config.events.channel, "log_channel");
    }

    #[test]
    fn test_to_breaker_config() {
        let settings = CircuitBreakerSettings {
            failure_threshold: 2,
            reset_timeout_ms: 10_000,
            call_timeout_ms: 250,
            half_open_max_trials: Some(1),
        };
        let config = settings.to_breaker_config();
        assert_eq!(config.failure_threshold, 2);
        assert_eq!(config.reset_timeout, Duration::from_secs(10));
        assert_eq!(config.call_timeout, Duration::from_millis(250));
        assert_eq!(config.half_open_max_trials, Some(1));
    }
}
