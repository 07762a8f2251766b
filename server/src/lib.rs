//! In-memory todo HTTP service.
//!
//! # Overview
//! A `TodoStore` behind a read/write lock, a `MetricsCollector` counting
//! requests, and an axum router mapping the REST surface onto them. Every
//! request passes through `logging(metrics(router))`. `Lifecycle` owns
//! startup and bounded graceful shutdown.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod store;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub use config::Config;
pub use error::{ApiError, ServeError};
pub use lifecycle::{shutdown_signal, DrainOutcome, Lifecycle, Phase};
pub use metrics::MetricsCollector;
pub use model::{CreateTodo, MetricsSnapshot, Todo, TodoId, UpdateTodo};
pub use store::TodoStore;

/// Build version served by `GET /version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state handed to every handler.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub store: TodoStore,
    pub metrics: MetricsCollector,
}

impl AppState {
    pub fn new(store: TodoStore, metrics: MetricsCollector) -> Self {
        Self { store, metrics }
    }
}

/// The fully wired application with a fresh store and counters.
pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    routes::router()
        .layer(axum::middleware::from_fn_with_state(
            state.metrics.clone(),
            middleware::count_requests,
        ))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Serves a fresh app on `listener` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, shutdown: F) -> Result<DrainOutcome, ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    Lifecycle::default().serve(listener, app(), shutdown).await
}

/// Installs the fmt subscriber, honouring `RUST_LOG` when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "todo_server=info".into()),
        )
        .init();
}
