//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → breaker → verifier → cache provider → event sink → AppState
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → admin server drains → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: leaves first, orchestration last
//! - The cache never fails startup; it degrades to no-op instead

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_state, StartupError};
