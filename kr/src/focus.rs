//! Focus progression
//!
//! Each pass re-reads the store: find the active goal, find its current
//! milestone, offer the milestone's subtasks as toggles. A toggle loops back to
//! a fresh pass; everything else ends the session.

use goalstore::{Goal, GoalStore, StoreResult, Task, TaskId};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::prompt::Prompter;
use crate::ui;

pub const SEPARATOR_LABEL: &str = "---";
pub const SWITCH_CONTEXT_LABEL: &str = "> I'm Exhausted (Switch Context)";

/// One entry in the focus menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAction {
    Toggle(TaskId),
    Separator,
    SwitchContext,
}

/// What one pass over the store found
#[derive(Debug, Clone)]
pub enum FocusState {
    NoActiveGoal,
    /// Every milestone is done or skipped
    GoalCompleted {
        goal: Goal,
        /// This pass wrote the COMPLETED status
        newly: bool,
    },
    Working {
        goal: Goal,
        milestone: Task,
        subtasks: Vec<Task>,
    },
}

/// How a focus session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    NoActiveGoal,
    GoalCompleted(Goal),
    /// Nothing chosen, or the separator
    Idle,
    SwitchContext,
}

/// Menu for a milestone: its subtasks, then the two fixed entries
pub fn build_actions(subtasks: &[Task]) -> Vec<(String, FocusAction)> {
    subtasks
        .iter()
        .map(|task| (task.label(), FocusAction::Toggle(task.id)))
        .chain([
            (SEPARATOR_LABEL.to_string(), FocusAction::Separator),
            (SWITCH_CONTEXT_LABEL.to_string(), FocusAction::SwitchContext),
        ])
        .collect()
}

/// Derive the focus state from the store
///
/// Repairs a stale active-goal pointer and marks an exhausted goal completed.
pub fn load_state(store: &GoalStore) -> StoreResult<FocusState> {
    let Some(goal) = store.resolve_current_goal()? else {
        debug!("load_state: no active goal");
        return Ok(FocusState::NoActiveGoal);
    };

    let Some(milestone) = store.current_milestone(goal.id)? else {
        let newly = store.complete_goal(goal.id)?;
        let goal = store.get_goal(goal.id)?.unwrap_or(goal);
        return Ok(FocusState::GoalCompleted { goal, newly });
    };

    let subtasks = store.subtasks(milestone.id)?;
    if subtasks.is_empty() {
        warn!(milestone_id = milestone.id, "Current milestone has no subtasks");
    }
    Ok(FocusState::Working {
        goal,
        milestone,
        subtasks,
    })
}

/// Run focus mode until the user stops or the goal is done
pub fn run_focus(store: &mut GoalStore, prompter: &mut dyn Prompter) -> Result<FocusOutcome, SessionError> {
    debug!("run_focus: called");
    let mut notice: Option<String> = None;

    loop {
        let (goal, milestone, subtasks) = match load_state(store)? {
            FocusState::NoActiveGoal => return Ok(FocusOutcome::NoActiveGoal),
            FocusState::GoalCompleted { goal, newly } => {
                if newly {
                    info!(goal_id = goal.id, "All milestones finished");
                }
                return Ok(FocusOutcome::GoalCompleted(goal));
            }
            FocusState::Working {
                goal,
                milestone,
                subtasks,
            } => (goal, milestone, subtasks),
        };

        ui::clear_screen()?;
        ui::header(&goal.name);
        if let Some(text) = notice.take() {
            ui::success(&text);
            println!();
        }
        ui::subtitle(&format!("CURRENT TASK: {}", milestone.description));
        println!();

        let actions = build_actions(&subtasks);
        let labels: Vec<String> = actions.iter().map(|(label, _)| label.clone()).collect();
        let Some(index) = prompter.select(&labels)? else {
            debug!("run_focus: selection cancelled");
            return Ok(FocusOutcome::Idle);
        };

        match actions.get(index).map(|(_, action)| *action) {
            Some(FocusAction::Toggle(task_id)) => {
                let toggled = store.toggle_subtask(task_id)?;
                if toggled.milestone_completed {
                    notice = Some("Milestone completed! Moving to next...".to_string());
                }
            }
            Some(FocusAction::SwitchContext) => return Ok(FocusOutcome::SwitchContext),
            Some(FocusAction::Separator) | None => return Ok(FocusOutcome::Idle),
        }
    }
}
