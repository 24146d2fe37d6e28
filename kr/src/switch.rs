//! Goal selection
//!
//! Numbered goal list: `<n>` activates a goal, `d<n>` deletes one and redraws,
//! empty input leaves everything as it was.

use colored::Colorize;
use goalstore::{Goal, GoalStatus, GoalStore};
use tracing::{debug, info};

use crate::error::{SessionError, ValidationError};
use crate::prompt::{Prompter, parse_choice};
use crate::ui;

/// A parsed goal-list command; indices are zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    Select(usize),
    Delete(usize),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Selected(Goal),
    Cancelled,
    NoGoals,
}

/// Parse user input against a list of `count` goals
pub fn parse_command(input: &str, count: usize) -> Result<SwitchCommand, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(SwitchCommand::Cancel);
    }

    let no_selection = || ValidationError::NoSelection(input.to_string());
    match input.strip_prefix(['d', 'D']) {
        Some(rest) => parse_choice(rest, count)
            .map(SwitchCommand::Delete)
            .ok_or_else(no_selection),
        None => parse_choice(input, count)
            .map(SwitchCommand::Select)
            .ok_or_else(no_selection),
    }
}

fn status_label(status: GoalStatus) -> colored::ColoredString {
    match status {
        GoalStatus::Active => status.as_str().green().bold(),
        GoalStatus::Idle => status.as_str().dimmed(),
        GoalStatus::Completed => status.as_str().blue(),
    }
}

fn print_goals(goals: &[Goal]) {
    ui::title("Goals");
    for (i, goal) in goals.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("{:>2})", i + 1).dimmed(),
            goal.name,
            status_label(goal.status)
        );
    }
    println!();
}

/// Run the goal list until the user selects, cancels, or runs out of goals
pub fn run_switch(store: &mut GoalStore, prompter: &mut dyn Prompter) -> Result<SwitchOutcome, SessionError> {
    debug!("run_switch: called");
    loop {
        let goals = store.list_goals()?;
        if goals.is_empty() {
            return Ok(SwitchOutcome::NoGoals);
        }

        print_goals(&goals);
        let Some(input) = prompter.input("Select a goal (number), d<number> to delete, Enter to cancel")? else {
            return Ok(SwitchOutcome::Cancelled);
        };

        match parse_command(&input, goals.len()) {
            Ok(SwitchCommand::Cancel) => return Ok(SwitchOutcome::Cancelled),
            Ok(SwitchCommand::Select(index)) => {
                let goal = store.activate_goal(goals[index].id)?;
                info!(goal_id = goal.id, "Switched goal");
                return Ok(SwitchOutcome::Selected(goal));
            }
            Ok(SwitchCommand::Delete(index)) => {
                let goal = &goals[index];
                if store.delete_goal(goal.id)? {
                    ui::warning(&format!("Deleted '{}'", goal.name));
                }
            }
            Err(e) => ui::warning(&e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::mock::{Answer, ScriptedPrompter};

    fn inputs(lines: &[Option<&str>]) -> ScriptedPrompter {
        ScriptedPrompter::new(
            lines
                .iter()
                .map(|l| Answer::Input(l.map(str::to_string)))
                .collect(),
        )
    }

    fn three_goals() -> (GoalStore, Vec<Goal>) {
        let mut store = GoalStore::open_in_memory().unwrap();
        let goals = ["Learn Go", "Run a 10k", "Read SICP"]
            .iter()
            .map(|name| store.create_goal(name).unwrap())
            .collect();
        (store, goals)
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("2", 3), Ok(SwitchCommand::Select(1)));
        assert_eq!(parse_command(" d3 ", 3), Ok(SwitchCommand::Delete(2)));
        assert_eq!(parse_command("D1", 3), Ok(SwitchCommand::Delete(0)));
        assert_eq!(parse_command("", 3), Ok(SwitchCommand::Cancel));
        assert_eq!(
            parse_command("4", 3),
            Err(ValidationError::NoSelection("4".to_string()))
        );
        assert!(parse_command("d0", 3).is_err());
        assert!(parse_command("x", 3).is_err());
    }

    #[test]
    fn test_no_goals() {
        let mut store = GoalStore::open_in_memory().unwrap();
        let mut prompter = inputs(&[]);
        assert_eq!(run_switch(&mut store, &mut prompter).unwrap(), SwitchOutcome::NoGoals);
    }

    #[test]
    fn test_select_activates_and_points() {
        let (mut store, goals) = three_goals();
        let mut prompter = inputs(&[Some("1")]);

        let outcome = run_switch(&mut store, &mut prompter).unwrap();
        let SwitchOutcome::Selected(goal) = outcome else {
            panic!("expected a selection, got {outcome:?}");
        };
        assert_eq!(goal.id, goals[0].id);
        assert_eq!(store.current_goal_id().unwrap(), Some(goals[0].id));

        let statuses: Vec<_> = store.list_goals().unwrap().iter().map(|g| g.status).collect();
        assert_eq!(statuses, vec![GoalStatus::Active, GoalStatus::Idle, GoalStatus::Idle]);
    }

    #[test]
    fn test_delete_then_redraw_then_cancel() {
        let (mut store, goals) = three_goals();
        store.set_current_goal(goals[2].id).unwrap();
        let mut prompter = inputs(&[Some("d3"), Some("9"), None]);

        assert_eq!(run_switch(&mut store, &mut prompter).unwrap(), SwitchOutcome::Cancelled);

        let names: Vec<_> = store.list_goals().unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Learn Go", "Run a 10k"]);
        assert_eq!(store.current_goal_id().unwrap(), None);
    }

    #[test]
    fn test_deleting_last_goal_ends_session() {
        let mut store = GoalStore::open_in_memory().unwrap();
        store.create_goal("Only").unwrap();
        let mut prompter = inputs(&[Some("d1")]);

        assert_eq!(run_switch(&mut store, &mut prompter).unwrap(), SwitchOutcome::NoGoals);
    }

    #[test]
    fn test_cancel_changes_nothing() {
        let (mut store, goals) = three_goals();
        store.set_current_goal(goals[2].id).unwrap();
        let mut prompter = inputs(&[Some("")]);

        assert_eq!(run_switch(&mut store, &mut prompter).unwrap(), SwitchOutcome::Cancelled);
        assert_eq!(store.current_goal_id().unwrap(), Some(goals[2].id));
        assert_eq!(store.list_goals().unwrap().len(), 3);
    }
}
