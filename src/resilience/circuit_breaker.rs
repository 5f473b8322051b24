//! Circuit breaker for remote dependencies.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: probing whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: first call after next_attempt_time has passed
//! Half-Open → Closed: trial succeeds (failure_count reset to 0)
//! Half-Open → Open: trial fails (threshold not consulted)
//! ```
//!
//! # Design Decisions
//! - One breaker per protected dependency, shared through `Arc`
//! - All state lives behind a single mutex; the lock is held for the
//!   admission check and for each handler, never across an await
//! - Fail fast in Open state: the operation closure is not even called
//! - Successes while Closed do not reset the failure count
//! - Half-Open admits every concurrent caller unless `half_open_max_trials`
//!   is configured

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::timeouts::{execute_with_timeout, Settled};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are rejected without touching the dependency.
    Open,
    /// Calls are let through to test recovery.
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding used for the state gauge.
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration of a breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failures (while Closed) that trip the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays Open before admitting a trial.
    pub reset_timeout: Duration,
    /// Deadline for each protected call.
    pub call_timeout: Duration,
    /// Upper bound on concurrent Half-Open trials. `None` admits everyone.
    pub half_open_max_trials: Option<u32>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            reset_timeout: Duration::from_millis(30_000),
            call_timeout: Duration::from_millis(5_000),
            half_open_max_trials: None,
        }
    }
}

/// Errors surfaced by [`CircuitBreaker::call`].
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open; the operation was not attempted.
    #[error("Circuit breaker is OPEN")]
    Open,

    /// The operation did not settle within the call timeout.
    #[error("Call timeout exceeded")]
    Timeout,

    /// The operation's own error, unchanged.
    #[error("{0}")]
    Operation(E),

    /// The operation task was cancelled before it settled.
    #[error("Operation task aborted")]
    Aborted,
}

impl<E> CircuitBreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CircuitBreakerError::Timeout)
    }
}

/// Point-in-time view of a breaker, for logs and the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    /// Milliseconds since the last recorded failure.
    pub last_failure_ms_ago: Option<u64>,
    /// Milliseconds until an Open breaker admits a trial (0 once eligible).
    pub next_attempt_in_ms: Option<u64>,
    pub half_open_trials_in_flight: u32,
    /// Number of times the breaker has tripped to Open.
    pub times_opened: u64,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    next_attempt_time: Option<Instant>,
    trials_in_flight: u32,
    times_opened: u64,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            next_attempt_time: None,
            trials_in_flight: 0,
            times_opened: 0,
        }
    }
}

/// Guards a single remote dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerState>>,
}

/// Marks a call admitted while Half-Open; releases the trial slot on drop,
/// including when the caller abandons the call.
struct TrialPermit {
    inner: Arc<Mutex<BreakerState>>,
}

impl Drop for TrialPermit {
    fn drop(&mut self) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.trials_in_flight = guard.trials_in_flight.saturating_sub(1);
    }
}

impl CircuitBreaker {
    /// Create a breaker in the Closed state.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        tracing::info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            reset_timeout_ms = config.reset_timeout.as_millis() as u64,
            call_timeout_ms = config.call_timeout.as_millis() as u64,
            half_open_max_trials = ?config.half_open_max_trials,
            "Circuit breaker initialized"
        );
        metrics::record_circuit_state(&name, CircuitState::Closed);

        Self {
            name,
            config,
            inner: Arc::new(Mutex::new(BreakerState::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. Does not perform the Open → Half-Open move; only a
    /// call can do that.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Instant at which an Open breaker starts admitting a trial.
    pub fn next_attempt_time(&self) -> Option<Instant> {
        let guard = self.lock();
        match guard.state {
            CircuitState::Open => guard.next_attempt_time,
            _ => None,
        }
    }

    pub fn last_failure_time(&self) -> Option<Instant> {
        self.lock().last_failure_time
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let guard = self.lock();
        let now = Instant::now();
        let next_attempt_in_ms = match guard.state {
            CircuitState::Open => guard
                .next_attempt_time
                .map(|at| at.saturating_duration_since(now).as_millis() as u64),
            _ => None,
        };

        CircuitBreakerSnapshot {
            name: self.name.clone(),
            state: guard.state,
            failure_count: guard.failure_count,
            failure_threshold: self.config.failure_threshold,
            last_failure_ms_ago: guard
                .last_failure_time
                .map(|at| now.saturating_duration_since(at).as_millis() as u64),
            next_attempt_in_ms,
            half_open_trials_in_flight: guard.trials_in_flight,
            times_opened: guard.times_opened,
        }
    }

    /// Execute `operation` under breaker protection.
    ///
    /// The closure is only invoked if the admission check passes. Its future
    /// runs on a separate task raced against `call_timeout`.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let _permit = self.admit::<E>()?;

        match execute_with_timeout(operation(), self.config.call_timeout).await {
            Settled::Completed(Ok(value)) => {
                self.on_success();
                Ok(value)
            }
            Settled::Completed(Err(e)) => {
                self.on_failure("error");
                Err(CircuitBreakerError::Operation(e))
            }
            Settled::Elapsed => {
                self.on_failure("timeout");
                Err(CircuitBreakerError::Timeout)
            }
            Settled::Aborted => {
                self.on_failure("aborted");
                Err(CircuitBreakerError::Aborted)
            }
            Settled::Panicked(payload) => {
                self.on_failure("panic");
                std::panic::resume_unwind(payload)
            }
        }
    }

    /// Admission check. Moves Open → Half-Open once the reset timeout has
    /// strictly elapsed, then rejects if still Open.
    fn admit<E>(&self) -> Result<Option<TrialPermit>, CircuitBreakerError<E>> {
        let mut guard = self.lock();
        let now = Instant::now();

        if guard.state == CircuitState::Open {
            if let Some(next_attempt) = guard.next_attempt_time {
                if now > next_attempt {
                    self.transition(&mut guard, CircuitState::HalfOpen);
                }
            }
        }

        match guard.state {
            CircuitState::Closed => Ok(None),
            CircuitState::Open => {
                tracing::debug!(component = %self.name, "Call rejected, circuit open");
                metrics::record_circuit_rejection(&self.name);
                Err(CircuitBreakerError::Open)
            }
            CircuitState::HalfOpen => {
                if let Some(max) = self.config.half_open_max_trials {
                    if guard.trials_in_flight >= max {
                        tracing::debug!(
                            component = %self.name,
                            in_flight = guard.trials_in_flight,
                            "Call rejected, half-open trial limit reached"
                        );
                        metrics::record_circuit_rejection(&self.name);
                        return Err(CircuitBreakerError::Open);
                    }
                }
                guard.trials_in_flight += 1;
                Ok(Some(TrialPermit {
                    inner: self.inner.clone(),
                }))
            }
        }
    }

    fn on_success(&self) {
        let mut guard = self.lock();
        metrics::record_circuit_call(&self.name, "success");

        if guard.state == CircuitState::HalfOpen {
            guard.failure_count = 0;
            guard.next_attempt_time = None;
            self.transition(&mut guard, CircuitState::Closed);
            tracing::info!(component = %self.name, "Circuit breaker CLOSED after successful call");
        }
    }

    fn on_failure(&self, outcome: &'static str) {
        let mut guard = self.lock();
        let now = Instant::now();
        metrics::record_circuit_call(&self.name, outcome);

        guard.failure_count = guard.failure_count.saturating_add(1);
        guard.last_failure_time = Some(now);

        if guard.state == CircuitState::HalfOpen
            || guard.failure_count >= self.config.failure_threshold
        {
            guard.next_attempt_time = Some(now + self.config.reset_timeout);
            if guard.state != CircuitState::Open {
                guard.times_opened += 1;
            }
            self.transition(&mut guard, CircuitState::Open);
            tracing::warn!(
                component = %self.name,
                failures = guard.failure_count,
                outcome,
                reset_timeout_ms = self.config.reset_timeout.as_millis() as u64,
                "Circuit breaker OPENED"
            );
        } else {
            tracing::debug!(
                component = %self.name,
                failures = guard.failure_count,
                threshold = self.config.failure_threshold,
                outcome,
                "Protected call failed"
            );
        }
    }

    fn transition(&self, guard: &mut MutexGuard<'_, BreakerState>, to: CircuitState) {
        let from = guard.state;
        guard.state = to;
        if from != to {
            if to == CircuitState::HalfOpen {
                tracing::info!(component = %self.name, "Circuit breaker moving to HALF_OPEN state");
            }
            metrics::record_circuit_transition(&self.name, to);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
