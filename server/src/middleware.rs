//! Request middleware, applied as `logging(metrics(router))`.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::metrics::MetricsCollector;

/// Counts the request before it reaches the router, whatever the outcome.
pub async fn count_requests(
    State(metrics): State<MetricsCollector>,
    request: Request,
    next: Next,
) -> Response {
    metrics.increment_requests();
    next.run(request).await
}

/// What the logging stage observed about one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub elapsed: Duration,
}

/// Emits one log line per request once the response has been produced.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    let record = RequestRecord {
        method,
        path,
        status: response.status(),
        elapsed: start.elapsed(),
    };
    tracing::info!(
        method = %record.method,
        path = %record.path,
        status = record.status.as_u16(),
        elapsed = ?record.elapsed,
        "request completed"
    );
    response
}
