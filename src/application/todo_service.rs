use crate::domain::error::{Operation, TodoError};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use async_trait::async_trait;

/// The CRUD operations behind the HTTP handlers.
///
/// Inputs are already validated; this layer resolves existence and wraps
/// storage failures with the operation they happened in.
#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError>;
    async fn get(&self, id: TodoId) -> Result<Todo, TodoError>;
    async fn list(&self) -> Result<Vec<Todo>, TodoError>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Todo, TodoError>;
    async fn delete(&self, id: TodoId) -> Result<(), TodoError>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let todo = self.repo.create(input).await.map_err(|e| TodoError::storage(Operation::Create, e))?;
        tracing::info!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.repo
            .get(id)
            .await
            .map_err(|e| TodoError::storage(Operation::Get, e))?
            .ok_or(TodoError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.repo.list().await.map_err(|e| TodoError::storage(Operation::List, e))
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Todo, TodoError> {
        let todo = self
            .repo
            .update(id, input)
            .await
            .map_err(|e| TodoError::storage(Operation::Update, e))?
            .ok_or(TodoError::NotFound)?;
        tracing::debug!(%id, completed = todo.completed, "todo updated");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> Result<(), TodoError> {
        let deleted = self.repo.delete(id).await.map_err(|e| TodoError::storage(Operation::Delete, e))?;
        if !deleted {
            return Err(TodoError::NotFound);
        }
        tracing::info!(%id, "todo deleted");
        Ok(())
    }
}
