//! SQLite-backed todo store.
//!
//! # Design
//! A single connection opened in WAL mode sits behind a mutex, so the store
//! can be cloned into axum state and shared by every request. Each method
//! runs on the blocking pool and holds the lock for exactly one store
//! round-trip, keeping fsyncs and checkpoints off the async workers. The
//! `completed` column is an integer in SQLite; `TodoRow` is the only place
//! that sees it, everything above this module works with `todo_types::Todo`.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::{params, Connection, OptionalExtension, Row};
use todo_types::{Todo, UpdateTodo};

use crate::error::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, completed, created_at FROM todos";

/// Handle to the todo table. Cheap to clone.
#[derive(Clone)]
pub struct TodoStore {
    conn: Arc<Mutex<Connection>>,
    journal_mode: String,
}

impl TodoStore {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(%journal_mode, "todo store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            journal_mode,
        })
    }

    /// Journal mode reported by SQLite after enabling WAL. In-memory
    /// databases report `memory`.
    pub fn journal_mode(&self) -> &str {
        &self.journal_mode
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let mut conn = conn.lock().map_err(|_| Error::StorePoisoned)?;
            Ok(f(&mut *conn)?)
        })
        .await?
    }

    /// All todos, newest first.
    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC"))?;
            let todos = stmt
                .query_map([], TodoRow::from_row)?
                .map(|row| row.map(Todo::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(todos)
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Todo>> {
        self.with_conn(move |conn| select_by_id(conn, id)).await
    }

    /// Insert a todo with `completed = 0`. The title is stored as given.
    pub async fn insert(&self, title: &str) -> Result<Todo> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("INSERT INTO todos (title) VALUES (?1)", params![title])?;
            let id = tx.last_insert_rowid();
            let todo = select_by_id(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(todo)
        })
        .await
    }

    /// Merge `patch` into the stored row. Returns `None` if no row has `id`.
    pub async fn update(&self, id: i64, patch: &UpdateTodo) -> Result<Option<Todo>> {
        let patch = patch.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let Some(existing) = select_by_id(&tx, id)? else {
                return Ok(None);
            };
            let title = patch.title.unwrap_or(existing.title);
            let completed = patch.completed.unwrap_or(existing.completed);
            tx.execute(
                "UPDATE todos SET title = ?1, completed = ?2 WHERE id = ?3",
                params![title, encode_completed(completed), id],
            )?;
            let updated = select_by_id(&tx, id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
    }

    /// Hard delete. Returns `false` if no row had `id`.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }
}

fn select_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Todo>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        TodoRow::from_row,
    )
    .optional()
    .map(|row| row.map(Todo::from))
}

/// A row of the `todos` table, exactly as SQLite stores it.
struct TodoRow {
    id: i64,
    title: String,
    completed: i64,
    created_at: String,
}

impl TodoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            completed: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            completed: decode_completed(row.completed),
            created_at: row.created_at,
        }
    }
}

fn encode_completed(completed: bool) -> i64 {
    i64::from(completed)
}

// Any non-zero value counts as done.
fn decode_completed(value: i64) -> bool {
    value != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_flag_maps_both_ways() {
        assert_eq!(encode_completed(true), 1);
        assert_eq!(encode_completed(false), 0);
        assert!(decode_completed(1));
        assert!(!decode_completed(0));
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = TodoStore::open_in_memory().unwrap();
        let todo = store.insert("Buy milk").await.unwrap();
        assert_eq!(todo.id, 1);
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert!(!todo.created_at.is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = TodoStore::open_in_memory().unwrap();
        let a = store.insert("A").await.unwrap();
        let b = store.insert("B").await.unwrap();
        let todos = store.list().await.unwrap();
        assert_eq!(todos, vec![b, a]);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = TodoStore::open_in_memory().unwrap();
        let todo = store.insert("Walk dog").await.unwrap();

        let updated = store
            .update(todo.id, &UpdateTodo::completed(true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Walk dog");
        assert!(updated.completed);

        let updated = store
            .update(todo.id, &UpdateTodo::title("Walk cat"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Walk cat");
        assert!(updated.completed);
        assert_eq!(updated.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn update_missing_row_returns_none() {
        let store = TodoStore::open_in_memory().unwrap();
        let result = store.update(42, &UpdateTodo::completed(true)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = TodoStore::open_in_memory().unwrap();
        let todo = store.insert("Gone soon").await.unwrap();
        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
        assert!(store.get(todo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = TodoStore::open_in_memory().unwrap();
        let first = store.insert("first").await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert("second").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn file_store_uses_wal_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todos.db");

        let created = {
            let store = TodoStore::open(&path).unwrap();
            assert_eq!(store.journal_mode(), "wal");
            store.insert("Persist me").await.unwrap()
        };

        let store = TodoStore::open(&path).unwrap();
        let todos = store.list().await.unwrap();
        assert_eq!(todos, vec![created]);
    }

    #[test]
    fn in_memory_store_reports_memory_journal() {
        let store = TodoStore::open_in_memory().unwrap();
        assert_eq!(store.journal_mode(), "memory");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = TodoStore::open_in_memory().unwrap();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&format!("todo {i}")).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.list().await.unwrap().len(), 16);
    }
}
