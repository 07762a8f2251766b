//! Route table and handlers.
//!
//! Every handler is a thin translation between HTTP and one store or metrics
//! call. Bodies are decoded by hand from raw bytes so that any decode failure,
//! whatever the content type, is a 400 rather than axum's 415/422.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{
    error::ApiError,
    model::{CreateTodo, Todo, TodoId, UpdateTodo},
    AppState, VERSION,
};

const TODOS_PREFIX: &str = "/todos/";

pub fn router() -> Router<AppState> {
    // `get` would also answer HEAD, which this API does not serve.
    Router::new()
        .route(
            "/healthz",
            get(healthz)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/version",
            get(version)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/metrics",
            get(metrics)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/todos",
            get(list_todos)
                .post(create_todo)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        // `{*id}` does not match an empty segment, so `/todos/` is routed
        // separately and rejected by the id extractor.
        .route(TODOS_PREFIX, todo_item_routes())
        .route("/todos/{*id}", todo_item_routes())
        .fallback(not_found)
}

fn todo_item_routes() -> MethodRouter<AppState> {
    get(get_todo)
        .put(update_todo)
        .delete(delete_todo)
        .head(item_method_not_allowed)
        .fallback(item_method_not_allowed)
}

/// Id taken from everything after `/todos/`, parsed as base-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub TodoId);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_path_id(parts.uri.path()).map(PathId)
    }
}

pub fn parse_path_id(path: &str) -> Result<TodoId, ApiError> {
    path.strip_prefix(TODOS_PREFIX)
        .and_then(|raw| raw.parse().ok())
        .ok_or(ApiError::InvalidId)
}

fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn version() -> &'static str {
    VERSION
}

async fn metrics(State(state): State<AppState>) -> Response {
    let snapshot = state.metrics.snapshot(&state.store).await;
    match serde_json::to_string_pretty(&snapshot) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode metrics snapshot");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.store.list().await)
}

async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input: CreateTodo = decode(&body)?;
    let title = input.validated_title().ok_or(ApiError::InvalidPayload)?;
    let todo = state.store.create(title).await;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Todo>, ApiError> {
    state.store.get(id).await.map(Json).ok_or(ApiError::NotFound)
}

// Unlike create, an empty title is accepted here.
async fn update_todo(
    State(state): State<AppState>,
    PathId(id): PathId,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let input: UpdateTodo = decode(&body)?;
    state
        .store
        .update(id, input.title, input.completed)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn delete_todo(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// A malformed id is reported before an unsupported method.
async fn item_method_not_allowed(PathId(_): PathId) -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_id() {
        assert_eq!(parse_path_id("/todos/42"), Ok(42));
    }

    #[test]
    fn rejects_empty_id() {
        assert_eq!(parse_path_id("/todos/"), Err(ApiError::InvalidId));
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert_eq!(parse_path_id("/todos/abc"), Err(ApiError::InvalidId));
        assert_eq!(parse_path_id("/todos/1.5"), Err(ApiError::InvalidId));
    }

    #[test]
    fn rejects_negative_id() {
        assert_eq!(parse_path_id("/todos/-1"), Err(ApiError::InvalidId));
    }

    #[test]
    fn rejects_extra_segments() {
        assert_eq!(parse_path_id("/todos/1/extra"), Err(ApiError::InvalidId));
    }

    #[test]
    fn decode_rejects_empty_body() {
        let result: Result<CreateTodo, _> = decode(&Bytes::new());
        assert_eq!(result.unwrap_err(), ApiError::InvalidPayload);
    }
}
