//! Goal and task row types
//!
//! Status enums persist as the upper-case strings `ACTIVE`, `IN_PROGRESS`, etc.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Goal identifier (SQLite rowid)
pub type GoalId = i64;

/// Task identifier (SQLite rowid)
pub type TaskId = i64;

/// Unknown status string read back from the database
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} status: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

/// Lifecycle status of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    /// The goal currently in focus
    #[default]
    Active,
    /// Parked by a switch to another goal
    Idle,
    /// Every milestone is done or skipped
    Completed,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Idle => "IDLE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "IDLE" => Ok(Self::Idle),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(ParseStatusError {
                kind: "goal",
                value: other.to_string(),
            }),
        }
    }
}

/// Progress status of a milestone or subtask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Skipped => "SKIPPED",
        }
    }

    /// Still waiting for work (PENDING or IN_PROGRESS)
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// The status a subtask takes when the user toggles it
    ///
    /// DONE goes back to PENDING; anything else becomes DONE.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Done => Self::Pending,
            _ => Self::Done,
        }
    }

    /// Checkbox marker shown in front of a subtask
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Done => "[x]",
            Self::Skipped => "[-]",
            Self::Pending | Self::InProgress => "[ ]",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            "SKIPPED" => Ok(Self::Skipped),
            other => Err(ParseStatusError {
                kind: "task",
                value: other.to_string(),
            }),
        }
    }
}

macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: ParseStatusError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

sql_text_enum!(GoalStatus);
sql_text_enum!(TaskStatus);

/// Derive a milestone's status from its subtasks after one of them changed
///
/// All subtasks DONE makes the milestone DONE; anything else means work has
/// started but is unfinished, so the milestone is IN_PROGRESS. This is
/// recomputed from scratch on every change, so un-checking a subtask of a
/// finished milestone reopens it.
pub fn derive_milestone_status(children: &[TaskStatus]) -> TaskStatus {
    if children.iter().all(|s| *s == TaskStatus::Done) {
        TaskStatus::Done
    } else {
        TaskStatus::InProgress
    }
}

/// A user objective that owns a tree of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

/// A milestone (no parent) or a subtask (parent is a milestone)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub goal_id: GoalId,
    pub parent_task_id: Option<TaskId>,
    pub description: String,
    pub status: TaskStatus,
    pub estimated_duration_mins: Option<i64>,
    pub proof_of_work: Option<String>,
}

impl Task {
    /// Top-level task of a goal
    pub fn is_milestone(&self) -> bool {
        self.parent_task_id.is_none()
    }

    /// Label used in selection lists: `[x] Write tests`
    pub fn label(&self) -> String {
        format!("{} {}", self.status.marker(), self.description)
    }
}
