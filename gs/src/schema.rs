//! Schema migrations
//!
//! Applied in order on open; the last applied version is kept in
//! `PRAGMA user_version`.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreResult;

const MIGRATIONS: &[&str] = &[
    // v1: goals, two-level tasks, key/value app state
    r#"
    CREATE TABLE IF NOT EXISTS goals (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE',
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY,
        goal_id INTEGER NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
        parent_task_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING',
        estimated_duration_mins INTEGER,
        proof_of_work TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_goal_id ON tasks(goal_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_parent_task_id ON tasks(parent_task_id);

    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#,
];

/// Current schema version
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Bring the database up to the latest schema version
pub fn migrate(conn: &mut Connection) -> StoreResult<()> {
    let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    debug!(current, latest = latest_version(), "migrate: called");

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        let version = idx as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(version, "Applied schema migration");
    }

    Ok(())
}
