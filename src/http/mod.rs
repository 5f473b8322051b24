//! HTTP admin surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout, request ID)
//!     → admin router (bearer key check)
//!     → read-only handlers over AppState
//! ```

pub mod server;

pub use server::{AppAuthService, AppState, AppTodoService, HttpServer};
