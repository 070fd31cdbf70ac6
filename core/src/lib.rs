//! Client library for the todo service.
//!
//! # Overview
//! [`TodoClient`] builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. [`TodoApiClient`] wraps it with a
//! blocking `ureq` agent for callers that just want to talk to the server.
//!
//! # Design
//! - Both clients hold only a base URL (plus the agent); nothing is cached
//!   between calls.
//! - Each CRUD operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the parsing rules are testable offline.
//! - Wire types come from `todo-types`, shared with the server.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{TodoClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use todo_types::{CreateTodo, Todo, UpdateTodo};
pub use transport::TodoApiClient;
