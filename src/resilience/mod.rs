//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a remote dependency:
//!     → circuit_breaker.rs (admission check: pass, trial, or fail fast)
//!     → timeouts.rs (race the operation against call_timeout)
//!     → circuit_breaker.rs (record success/failure, transition state)
//! ```
//!
//! # Design Decisions
//! - Every protected call has a deadline
//! - Open circuits fail fast without touching the dependency
//! - A timed out operation is abandoned, not cancelled

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerSnapshot,
    CircuitState,
};
pub use timeouts::{execute_with_timeout, Settled};
