use http::StatusCode;
use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::client::api::{ClientError, TodoChanges, TodoClient};
use todo_api::client::state::{Board, LoadState};
use todo_api::domain::todo::TodoId;
use todo_api::http::{routes::todos, routing};
use todo_api::infrastructure::memory_repo::InMemoryTodoRepository;

/// Serves the API on an ephemeral port and returns a client pointed at it.
async fn spawn_server() -> TodoClient {
    let service = TodoServiceImpl::new(InMemoryTodoRepository::default());
    let router = routing::app(todos::router(todos::AppState { service }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    TodoClient::new(format!("http://{addr}/"))
}

#[tokio::test]
async fn client_round_trip() {
    let client = spawn_server().await;

    let created = client.create("Buy milk", None).await.unwrap();
    assert_eq!(created.description, None);
    assert!(!created.completed);

    let changes = TodoChanges { completed: Some(true), ..Default::default() };
    let updated = client.update(created.id, &changes).await.unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");

    assert_eq!(client.get(created.id).await.unwrap(), updated);
    assert_eq!(client.list().await.unwrap(), vec![updated]);

    client.delete(created.id).await.unwrap();
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn client_surfaces_server_messages() {
    let client = spawn_server().await;

    match client.create("  ", None).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "Title is required");
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = client.delete(TodoId(42)).await.unwrap_err();
    assert_eq!(err.to_string(), "Todo not found");
}

#[tokio::test]
async fn board_follows_responses() {
    let client = spawn_server().await;
    let mut board = Board::default();

    board.fetch_succeeded(client.list().await.unwrap());
    assert_eq!(board.load, LoadState::Loaded);

    let first = client.create("first", Some("details")).await.unwrap();
    board.created(first.clone());
    let second = client.create("second", None).await.unwrap();
    board.created(second.clone());

    // Local merges agree with what the server now lists.
    assert_eq!(board.todos, client.list().await.unwrap());

    client.delete(first.id).await.unwrap();
    board.deleted(first.id);
    assert_eq!(board.todos, vec![second]);
}

#[tokio::test]
async fn unreachable_server_fails_the_fetch() {
    // Bind then drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TodoClient::new(format!("http://{addr}"));
    let mut board = Board::default();
    match client.list().await {
        Ok(todos) => board.fetch_succeeded(todos),
        Err(e) => {
            assert!(matches!(e, ClientError::Transport(_)));
            board.fetch_failed(e.to_string());
        }
    }
    assert!(matches!(board.load, LoadState::Failed(_)));
}
