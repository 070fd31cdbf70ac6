//! CRUD lifecycle against a live server.
//!
//! Starts the real server on a random port with an in-memory store, then
//! exercises every `TodoApiClient` operation over HTTP.

use std::net::SocketAddr;

use todo_core::{ApiError, CreateTodo, TodoApiClient, UpdateTodo};
use todo_server::TodoStore;

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, TodoStore::open_in_memory().unwrap()).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn crud_lifecycle() {
    let api = TodoApiClient::new(&format!("http://{}", spawn_server()));

    // Step 1: list — should be empty.
    assert!(api.list_todos().unwrap().is_empty(), "expected empty list");

    // Step 2: create two todos; the title is trimmed.
    let first = api.create_todo(&CreateTodo::new("  Integration test  ")).unwrap();
    assert_eq!(first.title, "Integration test");
    assert!(!first.completed);
    let second = api.create_todo(&CreateTodo::new("Second")).unwrap();

    // Step 3: list — newest first.
    let todos = api.list_todos().unwrap();
    assert_eq!(todos, vec![second.clone(), first.clone()]);

    // Step 4: get the first todo.
    assert_eq!(api.get_todo(first.id).unwrap(), first);

    // Step 5: update title only.
    let updated = api
        .update_todo(first.id, &UpdateTodo::title("Updated title"))
        .unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(!updated.completed);

    // Step 6: update completed only.
    let updated = api.update_todo(first.id, &UpdateTodo::completed(true)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(updated.completed);
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.created_at, first.created_at);

    // Step 7: delete both.
    api.delete_todo(first.id).unwrap();
    api.delete_todo(second.id).unwrap();

    // Step 8: second delete — NotFound.
    let err = api.delete_todo(first.id).unwrap_err();
    assert!(err.is_not_found(), "{err:?}");

    // Step 9: update after delete — NotFound.
    let err = api
        .update_todo(first.id, &UpdateTodo::completed(false))
        .unwrap_err();
    assert!(err.is_not_found(), "{err:?}");

    // Step 10: list — empty again.
    assert!(api.list_todos().unwrap().is_empty(), "expected empty list after delete");
}

#[test]
fn blank_title_is_rejected_with_status_text() {
    let api = TodoApiClient::new(&format!("http://{}", spawn_server()));

    let err = api.create_todo(&CreateTodo::new("   ")).unwrap_err();
    match &err {
        ApiError::Http {
            status,
            status_text,
            body,
            ..
        } => {
            assert_eq!(*status, 400);
            assert_eq!(status_text, "Bad Request");
            assert!(body.contains("title is required"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(api.list_todos().unwrap().is_empty());
}
