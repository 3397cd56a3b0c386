use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Merges the supplied fields over the stored ones and stamps `updated_at`.
    ///
    /// `updated_at` never goes backwards past `created_at`, even if the clock does.
    pub fn apply(&mut self, input: UpdateTodo, now: DateTime<Utc>) {
        if let Some(title) = input.title { self.title = title; }
        if let Some(description) = input.description { self.description = description; }
        if let Some(completed) = input.completed { self.completed = completed; }
        self.updated_at = now.max(self.created_at);
    }
}

/// A validated create request: title trimmed and non-empty, blank description dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
}

/// A validated partial update. `None` leaves the stored field untouched;
/// `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// Current time at the resolution the stores persist (milliseconds), so a
/// freshly created todo compares equal to the same row read back.
pub fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
