//! Circuit-breaker and cache-aside guards for a todo-list backend.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod todos;

pub use config::schema::GuardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
