//! Goal creation workflow
//!
//! Decompose the goal, let the user approve the milestones, then persist the
//! goal, each milestone, and its generated subtasks. Milestone decomposition
//! failures are recorded and skipped so one bad reply does not sink the goal.

use goalstore::{Goal, GoalStore, TaskId};
use tracing::{debug, info, warn};

use crate::decompose::Decomposer;
use crate::error::{CreateError, ValidationError};
use crate::prompt::Prompter;
use crate::ui;

/// What happened to one milestone during creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneReport {
    pub task_id: TaskId,
    pub description: String,
    pub subtask_count: usize,
    /// Why decomposition failed, if it did
    pub error: Option<String>,
}

/// A goal that was stored, with per-milestone results
#[derive(Debug, Clone)]
pub struct CreatedGoal {
    pub goal: Goal,
    pub milestones: Vec<MilestoneReport>,
}

impl CreatedGoal {
    pub fn subtask_count(&self) -> usize {
        self.milestones.iter().map(|m| m.subtask_count).sum()
    }

    pub fn failed_milestones(&self) -> impl Iterator<Item = &MilestoneReport> {
        self.milestones.iter().filter(|m| m.error.is_some())
    }
}

#[derive(Debug, Clone)]
pub enum CreationOutcome {
    Created(CreatedGoal),
    /// The user rejected the proposed milestones
    Cancelled,
}

/// Trim goal text, rejecting blank goals
pub fn normalize_goal(goal: &str) -> Result<&str, ValidationError> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(ValidationError::EmptyGoal);
    }
    Ok(goal)
}

/// Trim context text; blank context counts as none
pub fn normalize_context(context: Option<&str>) -> Option<&str> {
    context.map(str::trim).filter(|c| !c.is_empty())
}

/// Run the whole creation workflow
pub async fn create_goal(
    store: &mut GoalStore,
    decomposer: &dyn Decomposer,
    prompter: &mut dyn Prompter,
    goal: &str,
    context: Option<&str>,
) -> Result<CreationOutcome, CreateError> {
    let goal = normalize_goal(goal)?;
    let context = normalize_context(context);
    debug!(%goal, ?context, "create_goal: called");

    ui::title("Analyzing your goal...");
    let milestones = decomposer.decompose_goal(goal, context).await?;

    ui::subtitle("Proposed milestones:");
    for milestone in &milestones {
        println!("- {}", milestone);
    }
    println!();

    if !prompter.confirm("Do these look good?")? {
        info!(%goal, "Goal creation cancelled by user");
        return Ok(CreationOutcome::Cancelled);
    }

    // Inserting also moves the focus pointer to the new goal
    let stored = store.create_goal(goal)?;
    ui::title("Generating detailed plan... (this might take a moment)");

    let mut reports = Vec::with_capacity(milestones.len());
    for description in &milestones {
        let milestone = store.add_milestone(stored.id, description)?;

        let report = match decomposer.decompose_milestone(description).await {
            Ok(subtasks) => {
                for subtask in &subtasks {
                    store.add_subtask(milestone.id, subtask)?;
                }
                MilestoneReport {
                    task_id: milestone.id,
                    description: milestone.description,
                    subtask_count: subtasks.len(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(milestone = %description, error = %e, "Failed to generate subtasks");
                ui::error(&format!("Failed to generate subtasks for '{}': {}", description, e));
                MilestoneReport {
                    task_id: milestone.id,
                    description: milestone.description,
                    subtask_count: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        reports.push(report);
    }

    let created = CreatedGoal {
        goal: stored,
        milestones: reports,
    };
    info!(
        goal_id = created.goal.id,
        milestones = created.milestones.len(),
        subtasks = created.subtask_count(),
        "Goal created"
    );
    Ok(CreationOutcome::Created(created))
}
