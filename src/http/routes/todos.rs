use axum::{extract::State, routing::get, Router, Json};
use axum::http::StatusCode;

use crate::application::todo_service::TodoService;
use crate::application::validation::{validate_create_payload, validate_identifier, validate_update_payload, CreateTodoPayload, UpdateTodoPayload};
use crate::domain::{error::TodoError, todo::Todo};
use crate::http::routing::method_not_allowed;
use crate::http::types::{ApiJson, ApiPath};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>).fallback(method_not_allowed))
        .route("/todos/:id", get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>).fallback(method_not_allowed))
        .with_state(state)
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<Vec<Todo>>, TodoError> {
    Ok(Json(state.service.list().await?))
}

async fn create_todo<S: TodoService>(State(state): State<AppState<S>>, ApiJson(payload): ApiJson<CreateTodoPayload>) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let input = validate_create_payload(payload)?;
    let todo = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, ApiPath(id): ApiPath<String>) -> Result<Json<Todo>, TodoError> {
    let id = validate_identifier(&id)?;
    Ok(Json(state.service.get(id).await?))
}

// The body is extracted as a Result so a malformed id is reported ahead of a malformed body.
async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<String>,
    body: Result<ApiJson<UpdateTodoPayload>, TodoError>,
) -> Result<Json<Todo>, TodoError> {
    let id = validate_identifier(&id)?;
    let ApiJson(payload) = body?;
    let input = validate_update_payload(payload)?;
    Ok(Json(state.service.update(id, input).await?))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, ApiPath(id): ApiPath<String>) -> Result<StatusCode, TodoError> {
    let id = validate_identifier(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
