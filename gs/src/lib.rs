//! GoalStore - SQLite-backed goal and task tree
//!
//! Persists goals, their two-level task trees (milestones and subtasks), and the
//! pointer to the goal currently in focus. Every compound status change happens
//! inside a single SQLite transaction so the tree never shows a half-applied
//! cascade.
//!
//! # Schema
//!
//! ```text
//! goals     (id, name, status, created_at)
//! tasks     (id, goal_id -> goals, parent_task_id -> tasks, description, status,
//!            estimated_duration_mins, proof_of_work)
//! app_state (key, value)          -- holds `current_goal_id`
//! ```
//!
//! A task with no parent is a milestone; a task whose parent is a milestone is a
//! subtask. Ascending ids give the processing order.
//!
//! # Example
//!
//! ```ignore
//! use goalstore::GoalStore;
//!
//! let mut store = GoalStore::open("kairos.db")?;
//! let goal = store.create_goal("Learn Go")?;
//! let syntax = store.add_milestone(goal.id, "Syntax")?;
//! let first = store.add_subtask(syntax.id, "Read the tour")?;
//! store.set_current_goal(goal.id)?;
//!
//! let toggled = store.toggle_subtask(first.id)?;
//! assert!(toggled.milestone_completed);
//! ```

mod error;
mod model;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use model::{Goal, GoalId, GoalStatus, ParseStatusError, Task, TaskId, TaskStatus, derive_milestone_status};
pub use store::{CURRENT_GOAL_KEY, GoalStore, Toggled};
