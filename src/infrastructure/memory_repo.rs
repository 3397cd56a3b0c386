use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    repository::TodoRepository,
    todo::{timestamp, CreateTodo, Todo, TodoId, UpdateTodo},
};

/// Process-local store, lost on restart. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    inner: Arc<Mutex<Store>>,
}

#[derive(Default)]
struct Store {
    last_id: i64,
    items: BTreeMap<TodoId, Todo>,
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let mut store = self.inner.lock().await;
        store.last_id += 1;
        let now = timestamp();
        let todo = Todo {
            id: TodoId(store.last_id),
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        store.items.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.inner.lock().await.items.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self.inner.lock().await.items.values().cloned().collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(todos)
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>> {
        let mut store = self.inner.lock().await;
        let Some(todo) = store.items.get_mut(&id) else { return Ok(None) };
        todo.apply(input, timestamp());
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        Ok(self.inner.lock().await.items.remove(&id).is_some())
    }
}
