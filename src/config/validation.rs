//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds and timeouts > 0)
//! - Check addresses and URLs parse
//! - Check cross-field requirements (Redis backend needs a URL)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use crate::config::schema::{CacheBackendKind, EventSinkKind, GuardConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let cb = &config.circuit_breaker;
    if cb.failure_threshold == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.failure_threshold",
            "must be at least 1",
        ));
    }
    if cb.reset_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.reset_timeout_ms",
            "must be greater than 0",
        ));
    }
    if cb.call_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "circuit_breaker.call_timeout_ms",
            "must be greater than 0",
        ));
    }
    if cb.half_open_max_trials == Some(0) {
        errors.push(ValidationError::new(
            "circuit_breaker.half_open_max_trials",
            "must be at least 1 when set",
        ));
    }

    if config.cache.default_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.default_ttl_secs", "must be greater than 0"));
    }
    if config.cache.list_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.list_ttl_secs", "must be greater than 0"));
    }
    let needs_redis = config.cache.backend == CacheBackendKind::Redis
        || config.events.sink == EventSinkKind::Redis;
    match config.cache.redis_url.as_deref() {
        Some(raw) => {
            if let Err(e) = url::Url::parse(raw) {
                errors.push(ValidationError::new("cache.redis_url", format!("invalid URL: {}", e)));
            }
        }
        None if needs_redis => {
            errors.push(ValidationError::new(
                "cache.redis_url",
                "required when the cache backend or event sink is redis",
            ));
        }
        None => {}
    }

    match url::Url::parse(&config.auth.login_url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(ValidationError::new(
            "auth.login_url",
            format!("unsupported scheme '{}'", parsed.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "auth.login_url",
            format!("invalid URL: {}", e),
        )),
    }

    if config.events.channel.trim().is_empty() {
        errors.push(ValidationError::new("events.channel", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("'{}' is not a socket address", config.admin.bind_address),
            ));
        }
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
        if config.admin.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "admin.request_timeout_secs",
                "must be greater than 0",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GuardConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = GuardConfig::default();
        config.circuit_breaker.failure_threshold = 0;
        config.circuit_breaker.call_timeout_ms = 0;
        config.cache.backend = CacheBackendKind::Redis;
        config.auth.login_url = "not a url".to_string();
        config.admin.bind_address = "localhost".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "circuit_breaker.failure_threshold",
                "circuit_breaker.call_timeout_ms",
                "cache.redis_url",
                "auth.login_url",
                "admin.bind_address",
            ]
        );
    }

    #[test]
    fn test_redis_sink_requires_url() {
        let mut config = GuardConfig::default();
        config.events.sink = EventSinkKind::Redis;
        assert!(validate_config(&config).is_err());

        config.cache.redis_url = Some("redis://127.0.0.1:6379".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_disabled_admin_skips_admin_checks() {
        let mut config = GuardConfig::default();
        config.admin.enabled = false;
        config.admin.api_key.clear();
        assert!(validate_config(&config).is_ok());
    }
}
