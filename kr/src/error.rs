//! Workflow error types

use goalstore::StoreError;
use thiserror::Error;

use crate::decompose::GenerationError;

/// Input rejected before anything is generated or stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Goal must not be empty")]
    EmptyGoal,

    #[error("No such entry: {0}")]
    NoSelection(String),
}

/// Errors from the goal creation workflow
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to decompose goal: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to save goal: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

/// Errors from the interactive sessions (focus, switch, chill)
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyGoal.to_string(), "Goal must not be empty");
        assert_eq!(
            ValidationError::NoSelection("7".to_string()).to_string(),
            "No such entry: 7"
        );
    }

    #[test]
    fn test_create_error_wraps_sources() {
        let err: CreateError = ValidationError::EmptyGoal.into();
        assert_eq!(err.to_string(), "Goal must not be empty");

        let err: CreateError = GenerationError::EmptyList.into();
        assert_eq!(err.to_string(), "Failed to decompose goal: Generated list was empty");

        let err: CreateError = StoreError::GoalNotFound(3).into();
        assert_eq!(err.to_string(), "Failed to save goal: Goal not found: 3");
    }
}
