use std::fmt;

/// The storage operation a [`TodoError::Storage`] failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation { List, Get, Create, Update, Delete }

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "fetch todos",
            Operation::Get => "fetch todo",
            Operation::Create => "create todo",
            Operation::Update => "update todo",
            Operation::Delete => "delete todo",
        })
    }
}

/// Failures of the todo CRUD operations.
///
/// `Display` is the message returned to clients. For [`TodoError::Storage`] it
/// stays generic; the underlying cause is only reachable through `source()`.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("Invalid todo ID")]
    InvalidIdentifier,
    #[error("Title is required")]
    MissingTitle,
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("{0}")]
    InvalidBody(String),
    #[error("Todo not found")]
    NotFound,
    #[error("Failed to {operation}")]
    Storage {
        operation: Operation,
        #[source]
        source: anyhow::Error,
    },
}

impl TodoError {
    pub fn storage(operation: Operation, source: anyhow::Error) -> Self {
        Self::Storage { operation, source }
    }

    /// True for failures caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage { .. })
    }
}
