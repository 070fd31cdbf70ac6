//! HTTP backend for the todo list.
//!
//! # Overview
//! An axum router over a single SQLite table. Routes live under `/api`;
//! `GET /` answers a liveness check. Every response is JSON except the empty
//! 204 returned by delete.
//!
//! # Design
//! - The store is opened by the caller and handed to [`app`], so tests can
//!   run against `TodoStore::open_in_memory()` and the binary against a file.
//! - Handlers only extract and forward; validation lives in [`service`].
//! - Errors become `{ "error": "..." }` bodies via `error::Error`'s
//!   `IntoResponse` impl.

pub mod config;
pub mod error;
pub mod service;
pub mod store;

use std::future::Future;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use todo_types::{Todo, UpdateTodo};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::{Error, Result};
pub use service::TodoService;
pub use store::TodoStore;

pub const LIVENESS_MESSAGE: &str = "Todo API is running";

pub fn app(store: TodoStore) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        );

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .with_state(TodoService::new(store))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, store: TodoStore) -> std::io::Result<()> {
    axum::serve(listener, app(store)).await
}

/// Like [`run`], but stops accepting connections once `shutdown` resolves
/// and waits for in-flight requests to finish.
pub async fn run_until<F>(
    listener: TcpListener,
    store: TodoStore,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn root() -> Json<Value> {
    Json(json!({ "message": LIVENESS_MESSAGE }))
}

async fn list_todos(State(service): State<TodoService>) -> Result<Json<Vec<Todo>>> {
    Ok(Json(service.list().await?))
}

async fn get_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<Json<Todo>> {
    let id = service::parse_id(&id)?;
    Ok(Json(service.get(id).await?))
}

// Bodies are decoded from raw bytes whatever the Content-Type says. A
// missing, non-string or undecodable title all surface as the same 400.
async fn create_todo(
    State(service): State<TodoService>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>)> {
    let value = serde_json::from_slice::<Value>(&body).ok();
    let title = value
        .as_ref()
        .and_then(|value| value.get("title"))
        .and_then(Value::as_str);
    let todo = service.create(title).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

// Order: id, then existence, then body.
async fn update_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>> {
    let id = service::parse_id(&id)?;
    service.get(id).await?;
    let patch: UpdateTodo =
        serde_json::from_slice(&body).map_err(|e| Error::invalid_input(e.to_string()))?;
    Ok(Json(service.update(id, &patch).await?))
}

async fn delete_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = service::parse_id(&id)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
