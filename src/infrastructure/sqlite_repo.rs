use std::{path::Path, str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    repository::TodoRepository,
    todo::{timestamp, CreateTodo, Todo, TodoId, UpdateTodo},
};

const COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    /// Opens a pool on `database_url`, creating the database file and its
    /// directory if needed. In-memory databases get a single long-lived
    /// connection since each connection would otherwise see its own database.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url {database_url}"))?
            .create_if_missing(true);
        let in_memory = is_in_memory(database_url);
        let pool_options = if in_memory {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None::<Duration>).max_lifetime(None::<Duration>)
        } else {
            prepare_parent_dir(database_url)?;
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("connecting to {database_url}"))?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .context("applying migrations")?;
        Ok(())
    }

    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let now = timestamp();
        let result = sqlx::query(
            "INSERT INTO todos (title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(false)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&*self.pool)
        .await
        .context("inserting todo")?;
        Ok(Todo {
            id: TodoId(result.last_insert_rowid()),
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await
            .with_context(|| format!("selecting todo {id}"))?;
        row.map(row_to_todo).transpose()
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"))
            .fetch_all(&*self.pool)
            .await
            .context("selecting todos")?;
        rows.into_iter().map(row_to_todo).collect()
    }

    /// One statement that only writes the supplied columns, so concurrent
    /// updates of different fields do not undo each other.
    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>> {
        let (description_supplied, description) = match input.description {
            Some(description) => (true, description),
            None => (false, None),
        };
        let row = sqlx::query(&format!(
            "UPDATE todos SET
                title = COALESCE(?2, title),
                description = CASE WHEN ?3 THEN ?4 ELSE description END,
                completed = COALESCE(?5, completed),
                updated_at = MAX(?6, created_at)
             WHERE id = ?1
             RETURNING {COLUMNS}"
        ))
        .bind(id.0)
        .bind(&input.title)
        .bind(description_supplied)
        .bind(&description)
        .bind(input.completed)
        .bind(format_timestamp(timestamp()))
        .fetch_optional(&*self.pool)
        .await
        .with_context(|| format!("updating todo {id}"))?;
        row.map(row_to_todo).transpose()
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await
            .with_context(|| format!("deleting todo {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_todo(row: SqliteRow) -> Result<Todo> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// Fixed-width UTC text so that ORDER BY on the column is chronological.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw).with_context(|| format!("malformed timestamp {raw:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn prepare_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    // On Windows, absolute paths may look like /C:/path; strip the leading slash
    let path = match path.strip_prefix('/') {
        Some(rest) if cfg!(windows) && rest.get(1..2) == Some(":") => rest,
        _ => path,
    };
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteTodoRepository {
        let repo = SqliteTodoRepository::connect("sqlite::memory:", 5).await.unwrap();
        repo.init().await.unwrap();
        repo
    }

    fn new_todo(title: &str) -> CreateTodo {
        CreateTodo { title: title.into(), description: None }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = repo().await;
        let created = repo.create(CreateTodo { title: "Buy milk".into(), description: Some("semi".into()) }).await.unwrap();
        assert!(!created.completed);
        assert_eq!(created.created_at, created.updated_at);
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let repo = repo().await;
        let a = repo.create(new_todo("a")).await.unwrap();
        let b = repo.create(new_todo("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = repo().await;
        for title in ["first", "second", "third"] {
            repo.create(new_todo(title)).await.unwrap();
        }
        let titles: Vec<_> = repo.list().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let repo = repo().await;
        let created = repo.create(CreateTodo { title: "Buy milk".into(), description: Some("semi".into()) }).await.unwrap();
        let updated = repo
            .update(created.id, UpdateTodo { completed: Some(true), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Buy milk");
        assert!(updated.updated_at >= created.created_at);
        assert_eq!(repo.get(created.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn missing_rows_are_reported() {
        let repo = repo().await;
        assert!(repo.get(TodoId(7)).await.unwrap().is_none());
        assert!(repo.update(TodoId(7), UpdateTodo::default()).await.unwrap().is_none());
        assert!(!repo.delete(TodoId(7)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = repo().await;
        let created = repo.create(new_todo("gone")).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_clears_description_only_when_supplied() {
        let repo = repo().await;
        let created = repo.create(CreateTodo { title: "Buy milk".into(), description: Some("semi".into()) }).await.unwrap();
        let renamed = repo.update(created.id, UpdateTodo { title: Some("Buy oat milk".into()), ..Default::default() }).await.unwrap().unwrap();
        assert_eq!(renamed.description.as_deref(), Some("semi"));
        let cleared = repo.update(created.id, UpdateTodo { description: Some(None), ..Default::default() }).await.unwrap().unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.title, "Buy oat milk");
    }

    #[tokio::test]
    async fn list_orders_by_created_at_not_insertion() {
        let repo = repo().await;
        let newer = repo.create(new_todo("newer")).await.unwrap();
        // Inserted later, but stamped earlier.
        sqlx::query("INSERT INTO todos (title, completed, created_at, updated_at) VALUES ('older', 0, ?1, ?1)")
            .bind("2000-01-01T00:00:00.000Z")
            .execute(&*repo.pool)
            .await
            .unwrap();
        let todos = repo.list().await.unwrap();
        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["newer", "older"]);
        assert!(todos[1].id > newer.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_of_different_fields_both_stick() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("todos.db").display());
        let repo = SqliteTodoRepository::connect(&url, 5).await.unwrap();
        repo.init().await.unwrap();

        for round in 0..10 {
            let created = repo.create(new_todo("start")).await.unwrap();
            let mut tasks = Vec::new();
            for i in 0..20 {
                let repo = repo.clone();
                tasks.push(tokio::spawn(async move {
                    repo.update(created.id, UpdateTodo { title: Some(format!("title {i}")), ..Default::default() }).await
                }));
            }
            let toggler = repo.clone();
            tasks.push(tokio::spawn(async move {
                toggler.update(created.id, UpdateTodo { completed: Some(true), ..Default::default() }).await
            }));
            for task in tasks {
                task.await.unwrap().unwrap().unwrap();
            }
            let stored = repo.get(created.id).await.unwrap().unwrap();
            assert!(stored.completed, "round {round}: completed was reverted");
            assert!(stored.title.starts_with("title "));
        }
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(format_timestamp(at), "2024-05-01T10:00:00.000Z");
        assert_eq!(parse_timestamp("2024-05-01T10:00:00.000Z").unwrap(), at);
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:todos?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://todos.db"));
    }
}
