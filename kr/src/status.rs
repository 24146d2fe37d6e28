//! Progress overview of the active goal
//!
//! Read-only: a stale pointer is reported as "no active goal" but left for
//! focus mode to repair.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use goalstore::{Goal, GoalStatus, GoalStore, StoreResult, TaskStatus};
use serde::Serialize;

/// One milestone and how many of its subtasks are done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneProgress {
    pub description: String,
    pub status: TaskStatus,
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub goal: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    /// Description of the milestone focus mode would show next
    pub current_milestone: Option<String>,
    pub milestones: Vec<MilestoneProgress>,
}

impl StatusReport {
    /// Finished subtasks and all subtasks, across milestones
    pub fn subtask_totals(&self) -> (usize, usize) {
        self.milestones
            .iter()
            .fold((0, 0), |(done, total), m| (done + m.done, total + m.total))
    }
}

/// Build the report for the goal the pointer names, if it still exists
pub fn build_status(store: &GoalStore) -> StoreResult<Option<StatusReport>> {
    let Some(goal_id) = store.current_goal_id()? else {
        return Ok(None);
    };
    let Some(goal) = store.get_goal(goal_id)? else {
        return Ok(None);
    };
    report_for(store, goal).map(Some)
}

fn report_for(store: &GoalStore, goal: Goal) -> StoreResult<StatusReport> {
    let mut milestones = Vec::new();
    for milestone in store.milestones(goal.id)? {
        let subtasks = store.subtasks(milestone.id)?;
        milestones.push(MilestoneProgress {
            done: subtasks.iter().filter(|t| t.status == TaskStatus::Done).count(),
            total: subtasks.len(),
            description: milestone.description,
            status: milestone.status,
        });
    }
    let current_milestone = store.current_milestone(goal.id)?.map(|m| m.description);

    Ok(StatusReport {
        goal: goal.name,
        status: goal.status,
        created_at: goal.created_at,
        current_milestone,
        milestones,
    })
}

/// Plain-text rendering for the terminal
pub fn render_text(report: &StatusReport) -> String {
    let (done, total) = report.subtask_totals();
    let created = report.created_at.with_timezone(&Local).format("%Y-%m-%d");

    let mut out = String::new();
    let _ = writeln!(out, "Goal:     {} ({})", report.goal, report.status);
    let _ = writeln!(out, "Created:  {}", created);
    let _ = writeln!(out, "Progress: {}/{} subtasks", done, total);
    if let Some(current) = &report.current_milestone {
        let _ = writeln!(out, "Current:  {}", current);
    }
    out.push('\n');
    for m in &report.milestones {
        let _ = writeln!(out, "{} {} ({}/{})", m.status.marker(), m.description, m.done, m.total);
    }
    out
}
