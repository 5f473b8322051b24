//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Hold the shared application state handed to handlers
//! - Create the Axum router with the admin routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown signal fires

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::auth::{AuthService, HttpCredentialVerifier, JwtClaimsDecoder};
use crate::cache::CacheProvider;
use crate::config::GuardConfig;
use crate::todos::{InMemoryTodoStore, TodoService};

/// Login orchestration as wired by the binary.
pub type AppAuthService = AuthService<HttpCredentialVerifier, JwtClaimsDecoder>;

/// Todo orchestration as wired by the binary.
pub type AppTodoService = TodoService<InMemoryTodoStore, CacheProvider>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AppAuthService>,
    pub todos: Arc<AppTodoService>,
    pub config: Arc<GuardConfig>,
}

/// HTTP server for the admin API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over `state`.
    pub fn new(state: AppState) -> Self {
        let timeout = Duration::from_secs(state.config.admin.request_timeout_secs);
        let router = Self::build_router(state, timeout);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, timeout: Duration) -> Router {
        setup_admin_router(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    /// The router with all layers applied, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Admin API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Admin API draining");
            })
            .await?;

        tracing::info!("Admin API stopped");
        Ok(())
    }
}
