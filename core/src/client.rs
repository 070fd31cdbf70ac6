//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `TodoApiClient` in `transport` runs the round-trip in between.

use serde::de::DeserializeOwned;
use todo_types::{CreateTodo, Todo, UpdateTodo};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

pub(crate) const LIST_TODOS: &str = "failed to fetch todos";
pub(crate) const GET_TODO: &str = "failed to fetch todo";
pub(crate) const CREATE_TODO: &str = "failed to create todo";
pub(crate) const UPDATE_TODO: &str = "failed to update todo";
pub(crate) const DELETE_TODO: &str = "failed to delete todo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoClient {
    base_url: String,
}

impl Default for TodoClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        get(self.collection_url())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        get(self.item_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Post, self.collection_url(), input)
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Patch, self.item_url(id), input)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(LIST_TODOS, response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(GET_TODO, response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(CREATE_TODO, response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(UPDATE_TODO, response)
    }

    /// Delete answers 204 with no body; nothing is parsed.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(DELETE_TODO, &response)
    }
}

fn get(url: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json<T: serde::Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(ApiError::Serialization)?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn parse_json<T: DeserializeOwned>(
    operation: &'static str,
    response: HttpResponse,
) -> Result<T, ApiError> {
    check_status(operation, &response)?;
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(operation: &'static str, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound { operation });
    }
    Err(ApiError::Http {
        operation,
        status: response.status,
        status_text: response.status_text().to_string(),
        body: response.body.clone(),
    })
}
