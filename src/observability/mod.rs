//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker, cache and todo service produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!     → tracing.rs (trace IDs attached to operation events)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;
