//! Store error types

use thiserror::Error;

use crate::model::{GoalId, TaskId};

/// Errors from goal store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Goal not found: {0}")]
    GoalNotFound(GoalId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task {0} is a milestone, not a subtask")]
    NotASubtask(TaskId),

    #[error("Task {parent} cannot have subtasks: {reason}")]
    InvalidParent { parent: TaskId, reason: &'static str },

    #[error("{0} must not be empty")]
    EmptyText(&'static str),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
