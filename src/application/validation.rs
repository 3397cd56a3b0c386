//! Input checks run before any storage access.
//!
//! Each function turns raw request input into a normalized domain value or the
//! [`TodoError`] the client should see.

use serde::{Deserialize, Deserializer};

use crate::domain::error::TodoError;
use crate::domain::todo::{CreateTodo, TodoId, UpdateTodo};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Partial update body. The outer `Option` of `title`/`description` records
/// whether the key was sent at all, so `{"description": null}` differs from `{}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn validate_identifier(raw: &str) -> Result<TodoId, TodoError> {
    raw.parse::<i64>().map(TodoId).map_err(|_| TodoError::InvalidIdentifier)
}

pub fn validate_create_payload(payload: CreateTodoPayload) -> Result<CreateTodo, TodoError> {
    let title = payload.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(TodoError::MissingTitle);
    }
    Ok(CreateTodo { title: title.to_owned(), description: normalize_description(payload.description) })
}

pub fn validate_update_payload(payload: UpdateTodoPayload) -> Result<UpdateTodo, TodoError> {
    let title = match payload.title {
        None => None,
        Some(title) => {
            let title = title.as_deref().map(str::trim).unwrap_or_default();
            if title.is_empty() {
                return Err(TodoError::EmptyTitle);
            }
            Some(title.to_owned())
        }
    };
    Ok(UpdateTodo {
        title,
        description: payload.description.map(normalize_description),
        completed: payload.completed,
    })
}

// Blank descriptions are stored as "no description".
fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
