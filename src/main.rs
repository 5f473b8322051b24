//! todo-guard
//!
//! Runs the login circuit breaker and the todo cache-aside layer, and exposes
//! their state over a small admin API.
//!
//! # Architecture Overview
//!
//! ```text
//!     login ──▶ AuthService ──▶ CircuitBreaker ──▶ CredentialVerifier ──▶ login endpoint
//!
//!     todos ──▶ TodoService ──▶ CacheAsideStore ──▶ CacheProvider (memory | redis | none)
//!                    │
//!                    ├────────▶ TodoStore (source of truth)
//!                    └────────▶ EventSink (log | redis pub/sub)
//!
//!     admin ──▶ HttpServer ──▶ /admin/{status,circuit,cache}
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use todo_guard::config::{load_config, GuardConfig};
use todo_guard::lifecycle::{build_state, Shutdown};
use todo_guard::observability::{logging, metrics};
use todo_guard::HttpServer;

#[derive(Parser)]
#[command(
    name = "todo-guard",
    version,
    about = "Circuit breaker and cache-aside guards for the todo backend"
)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "todo-guard starting");

    tracing::info!(
        failure_threshold = config.circuit_breaker.failure_threshold,
        reset_timeout_ms = config.circuit_breaker.reset_timeout_ms,
        call_timeout_ms = config.circuit_breaker.call_timeout_ms,
        cache_backend = ?config.cache.backend,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let admin_enabled = config.admin.enabled;
    let bind_address = config.admin.bind_address.clone();
    let shutdown = Shutdown::new();
    let state = build_state(config, &shutdown).await?;

    if admin_enabled {
        let listener = TcpListener::bind(&bind_address).await?;
        let server = HttpServer::new(state);
        let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        shutdown.trigger_on_ctrl_c().await;
        server_task.await??;
    } else {
        tracing::info!("Admin API disabled");
        shutdown.trigger_on_ctrl_c().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
