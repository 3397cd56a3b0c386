use async_trait::async_trait;
use super::todo::{Todo, TodoId, CreateTodo, UpdateTodo};

/// Data access for the `todos` table.
///
/// Implementations own all persisted state; callers hold no copies between requests.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: CreateTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// All todos, newest `created_at` first, ties broken by descending id.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    /// `Ok(None)` when no row has this id.
    async fn update(&self, id: TodoId, input: UpdateTodo) -> anyhow::Result<Option<Todo>>;
    /// `Ok(false)` when no row has this id.
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}
