//! CRUD operations over the todo store, with input validation.
//!
//! # Design
//! Handlers stay thin: they extract raw path segments and bodies, then call
//! into `TodoService`, which decides what is valid and what is missing. The
//! service holds nothing besides the store handle.
//!
//! Create trims and requires a non-blank title. Update stores a supplied
//! title verbatim; it is not re-trimmed or checked for blankness.

use todo_types::{Todo, UpdateTodo};

use crate::error::{Error, Result};
use crate::store::TodoStore;

pub const TITLE_REQUIRED: &str = "title is required";
pub const INVALID_ID: &str = "Invalid id";

#[derive(Clone)]
pub struct TodoService {
    store: TodoStore,
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.store.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Todo> {
        self.store.get(id).await?.ok_or(Error::NotFound)
    }

    /// Insert a new todo. `title` is `None` when the body had no string
    /// `title` field.
    pub async fn create(&self, title: Option<&str>) -> Result<Todo> {
        let title = normalize_title(title)?;
        let todo = self.store.insert(title).await?;
        tracing::debug!(id = todo.id, "created todo");
        Ok(todo)
    }

    pub async fn update(&self, id: i64, patch: &UpdateTodo) -> Result<Todo> {
        let todo = self.store.update(id, patch).await?.ok_or(Error::NotFound)?;
        tracing::debug!(id, "updated todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(Error::NotFound);
        }
        tracing::debug!(id, "deleted todo");
        Ok(())
    }
}

/// Parse a path segment into a todo id. Integers outside the `i64` range
/// are rejected as invalid rather than looked up and reported missing.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| Error::invalid_input(INVALID_ID))
}

fn normalize_title(title: Option<&str>) -> Result<&str> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title),
        _ => Err(Error::invalid_input(TITLE_REQUIRED)),
    }
}
