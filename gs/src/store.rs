//! Core GoalStore implementation

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::model::{Goal, GoalId, GoalStatus, Task, TaskId, TaskStatus, derive_milestone_status};
use crate::schema;

/// `app_state` key holding the id of the goal in focus
pub const CURRENT_GOAL_KEY: &str = "current_goal_id";

const GOAL_COLUMNS: &str = "id, name, status, created_at";
const TASK_COLUMNS: &str =
    "id, goal_id, parent_task_id, description, status, estimated_duration_mins, proof_of_work";

/// Result of toggling a subtask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    /// The subtask after the toggle
    pub subtask: Task,
    /// The parent milestone after its status was re-derived
    pub milestone: Task,
    /// The toggle finished the milestone
    pub milestone_completed: bool,
}

/// SQLite store for goals, tasks, and the active-goal pointer
pub struct GoalStore {
    conn: Connection,
}

impl GoalStore {
    /// Open or create a store at the given database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "open: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let _mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Self::init(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("open_in_memory: called");
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    // === Goals ===

    /// Insert a new ACTIVE goal and point focus at it
    ///
    /// Any other ACTIVE goal is demoted to IDLE in the same transaction.
    pub fn create_goal(&mut self, name: &str) -> StoreResult<Goal> {
        let name = non_empty(name, "goal name")?;
        debug!(%name, "create_goal: called");
        let created_at = Utc::now();

        let tx = self.conn.transaction()?;
        demote_active(&tx)?;
        tx.execute(
            "INSERT INTO goals (name, status, created_at) VALUES (?1, ?2, ?3)",
            params![name, GoalStatus::Active, created_at.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();
        write_current_goal(&tx, id)?;
        tx.commit()?;

        info!(goal_id = id, %name, "Created goal");
        Ok(Goal {
            id,
            name: name.to_string(),
            status: GoalStatus::Active,
            created_at,
        })
    }

    pub fn get_goal(&self, id: GoalId) -> StoreResult<Option<Goal>> {
        debug!(id, "get_goal: called");
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], goal_from_row).optional()?)
    }

    /// All goals in creation order
    pub fn list_goals(&self) -> StoreResult<Vec<Goal>> {
        debug!("list_goals: called");
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let goals = stmt.query_map([], goal_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    /// Mark a goal COMPLETED
    ///
    /// Returns false without writing when the goal is already completed.
    pub fn complete_goal(&self, id: GoalId) -> StoreResult<bool> {
        debug!(id, "complete_goal: called");
        let goal = self.get_goal(id)?.ok_or(StoreError::GoalNotFound(id))?;
        if goal.status == GoalStatus::Completed {
            debug!(id, "complete_goal: already completed");
            return Ok(false);
        }
        self.conn.execute(
            "UPDATE goals SET status = ?1 WHERE id = ?2",
            params![GoalStatus::Completed, id],
        )?;
        info!(goal_id = id, "Goal completed");
        Ok(true)
    }

    /// Make a goal the single ACTIVE goal and point focus at it
    ///
    /// Every goal is reset to IDLE, completed ones included, before this one is
    /// activated. All three writes happen in one transaction.
    pub fn activate_goal(&mut self, id: GoalId) -> StoreResult<Goal> {
        debug!(id, "activate_goal: called");
        let tx = self.conn.transaction()?;

        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        let mut goal = tx
            .query_row(&sql, [id], goal_from_row)
            .optional()?
            .ok_or(StoreError::GoalNotFound(id))?;

        idle_all(&tx)?;
        tx.execute(
            "UPDATE goals SET status = ?1 WHERE id = ?2",
            params![GoalStatus::Active, id],
        )?;
        write_current_goal(&tx, id)?;
        tx.commit()?;

        goal.status = GoalStatus::Active;
        info!(goal_id = id, name = %goal.name, "Activated goal");
        Ok(goal)
    }

    /// Delete a goal and all of its tasks
    ///
    /// Clears the active-goal pointer when it referenced this goal. Returns
    /// whether a goal was deleted.
    pub fn delete_goal(&mut self, id: GoalId) -> StoreResult<bool> {
        debug!(id, "delete_goal: called");
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        if read_current_goal(&tx)? == Some(id.to_string()) {
            debug!(id, "delete_goal: clearing pointer to deleted goal");
            tx.execute("DELETE FROM app_state WHERE key = ?1", [CURRENT_GOAL_KEY])?;
        }
        tx.commit()?;

        if deleted > 0 {
            info!(goal_id = id, "Deleted goal");
        }
        Ok(deleted > 0)
    }

    // === Tasks ===

    /// Append a PENDING milestone to a goal
    pub fn add_milestone(&self, goal_id: GoalId, description: &str) -> StoreResult<Task> {
        let description = non_empty(description, "milestone description")?;
        debug!(goal_id, %description, "add_milestone: called");
        if self.get_goal(goal_id)?.is_none() {
            return Err(StoreError::GoalNotFound(goal_id));
        }
        self.insert_task(goal_id, None, description)
    }

    /// Append a PENDING subtask to a milestone
    pub fn add_subtask(&self, milestone_id: TaskId, description: &str) -> StoreResult<Task> {
        let description = non_empty(description, "subtask description")?;
        debug!(milestone_id, %description, "add_subtask: called");
        let parent = self.get_task(milestone_id)?.ok_or(StoreError::TaskNotFound(milestone_id))?;
        if !parent.is_milestone() {
            return Err(StoreError::InvalidParent {
                parent: milestone_id,
                reason: "parent is a subtask",
            });
        }
        self.insert_task(parent.goal_id, Some(milestone_id), description)
    }

    fn insert_task(&self, goal_id: GoalId, parent: Option<TaskId>, description: &str) -> StoreResult<Task> {
        self.conn.execute(
            "INSERT INTO tasks (goal_id, parent_task_id, description, status) VALUES (?1, ?2, ?3, ?4)",
            params![goal_id, parent, description, TaskStatus::Pending],
        )?;
        Ok(Task {
            id: self.conn.last_insert_rowid(),
            goal_id,
            parent_task_id: parent,
            description: description.to_string(),
            status: TaskStatus::Pending,
            estimated_duration_mins: None,
            proof_of_work: None,
        })
    }

    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        debug!(id, "get_task: called");
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], task_from_row).optional()?)
    }

    /// Top-level tasks of a goal in id order
    pub fn milestones(&self, goal_id: GoalId) -> StoreResult<Vec<Task>> {
        debug!(goal_id, "milestones: called");
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE goal_id = ?1 AND parent_task_id IS NULL ORDER BY id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt.query_map([goal_id], task_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Subtasks of a milestone in id order
    pub fn subtasks(&self, milestone_id: TaskId) -> StoreResult<Vec<Task>> {
        debug!(milestone_id, "subtasks: called");
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE parent_task_id = ?1 ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt.query_map([milestone_id], task_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Earliest milestone of a goal that is still PENDING or IN_PROGRESS
    pub fn current_milestone(&self, goal_id: GoalId) -> StoreResult<Option<Task>> {
        debug!(goal_id, "current_milestone: called");
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE goal_id = ?1 AND parent_task_id IS NULL AND status IN (?2, ?3) \
             ORDER BY id ASC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(
                &sql,
                params![goal_id, TaskStatus::Pending, TaskStatus::InProgress],
                task_from_row,
            )
            .optional()?)
    }

    /// Flip a subtask between DONE and not-DONE and re-derive its milestone
    ///
    /// Both writes share one transaction.
    pub fn toggle_subtask(&mut self, id: TaskId) -> StoreResult<Toggled> {
        debug!(id, "toggle_subtask: called");
        let tx = self.conn.transaction()?;

        let task_sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let mut subtask = tx
            .query_row(&task_sql, [id], task_from_row)
            .optional()?
            .ok_or(StoreError::TaskNotFound(id))?;
        let milestone_id = subtask.parent_task_id.ok_or(StoreError::NotASubtask(id))?;

        subtask.status = subtask.status.toggled();
        tx.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![subtask.status, id],
        )?;

        let siblings: Vec<TaskStatus> = {
            let mut stmt = tx.prepare("SELECT status FROM tasks WHERE parent_task_id = ?1")?;
            stmt.query_map([milestone_id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut milestone = tx
            .query_row(&task_sql, [milestone_id], task_from_row)
            .optional()?
            .ok_or(StoreError::TaskNotFound(milestone_id))?;
        let previous = milestone.status;
        milestone.status = derive_milestone_status(&siblings);
        if milestone.status != previous {
            tx.execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                params![milestone.status, milestone_id],
            )?;
        }
        tx.commit()?;

        let milestone_completed = previous != TaskStatus::Done && milestone.status == TaskStatus::Done;
        info!(
            task_id = id,
            status = %subtask.status,
            milestone_id,
            milestone_status = %milestone.status,
            "Toggled subtask"
        );
        Ok(Toggled {
            subtask,
            milestone,
            milestone_completed,
        })
    }

    // === Active-goal pointer ===

    /// Raw pointer value
    ///
    /// A value that does not parse as a goal id reads as `None`.
    pub fn current_goal_id(&self) -> StoreResult<Option<GoalId>> {
        debug!("current_goal_id: called");
        let Some(raw) = read_current_goal(&self.conn)? else {
            return Ok(None);
        };
        match raw.trim().parse::<GoalId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(%raw, error = %e, "current_goal_id: unparsable pointer");
                Ok(None)
            }
        }
    }

    pub fn set_current_goal(&self, id: GoalId) -> StoreResult<()> {
        debug!(id, "set_current_goal: called");
        write_current_goal(&self.conn, id)
    }

    pub fn clear_current_goal(&self) -> StoreResult<()> {
        debug!("clear_current_goal: called");
        self.conn
            .execute("DELETE FROM app_state WHERE key = ?1", [CURRENT_GOAL_KEY])?;
        Ok(())
    }

    /// Goal the pointer references, repairing a stale pointer
    ///
    /// A pointer to a deleted goal, or one that is not an id at all, is
    /// cleared and reported as no active goal.
    pub fn resolve_current_goal(&self) -> StoreResult<Option<Goal>> {
        debug!("resolve_current_goal: called");
        if read_current_goal(&self.conn)?.is_none() {
            return Ok(None);
        }
        let goal = match self.current_goal_id()? {
            Some(id) => self.get_goal(id)?,
            None => None,
        };
        if goal.is_none() {
            warn!("Active-goal pointer is stale, clearing it");
            self.clear_current_goal()?;
        }
        Ok(goal)
    }
}

fn non_empty<'a>(text: &'a str, what: &'static str) -> StoreResult<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyText(what));
    }
    Ok(trimmed)
}

fn demote_active(tx: &Transaction<'_>) -> StoreResult<usize> {
    let demoted = tx.execute(
        "UPDATE goals SET status = ?1 WHERE status = ?2",
        params![GoalStatus::Idle, GoalStatus::Active],
    )?;
    debug!(demoted, "demote_active: done");
    Ok(demoted)
}

fn idle_all(tx: &Transaction<'_>) -> StoreResult<usize> {
    let reset = tx.execute("UPDATE goals SET status = ?1", [GoalStatus::Idle])?;
    debug!(reset, "idle_all: done");
    Ok(reset)
}

fn read_current_goal(conn: &Connection) -> StoreResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            [CURRENT_GOAL_KEY],
            |row| row.get(0),
        )
        .optional()?)
}

fn write_current_goal(conn: &Connection, id: GoalId) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![CURRENT_GOAL_KEY, id.to_string()],
    )?;
    Ok(())
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        created_at,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        parent_task_id: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        estimated_duration_mins: row.get(5)?,
        proof_of_work: row.get(6)?,
    })
}
