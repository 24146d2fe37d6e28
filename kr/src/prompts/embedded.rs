//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Goal -> milestones
pub const GOAL: &str = include_str!("../../prompts/goal.pmt");

/// Milestone -> subtasks
pub const MILESTONE: &str = include_str!("../../prompts/milestone.pmt");

/// Break-time reading suggestion
pub const CHILL: &str = include_str!("../../prompts/chill.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "goal" => Some(GOAL),
        "milestone" => Some(MILESTONE),
        "chill" => Some(CHILL),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
