//! Kairos - AI goal decomposition and focus mode
//!
//! A goal is broken into milestones and subtasks by an LLM, stored in a local
//! SQLite database, and worked through one subtask at a time.
//!
//! # Modules
//!
//! - [`decompose`] - Goal, milestone, and break-suggestion generation
//! - [`create`] - Goal creation workflow
//! - [`focus`] - Focus progression over the active goal
//! - [`switch`] - Goal selection and deletion
//! - [`chill`] - Break suggestions
//! - [`status`] - Progress overview
//! - [`llm`] - LLM client trait with Gemini and Anthropic implementations
//! - [`prompts`] - Handlebars prompt templates
//! - [`prompt`] - Interactive terminal input
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod chill;
pub mod cli;
pub mod config;
pub mod create;
pub mod decompose;
pub mod error;
pub mod focus;
pub mod llm;
pub mod prompt;
pub mod prompts;
pub mod status;
pub mod switch;
pub mod ui;

// Re-export commonly used types
pub use config::{ChillConfig, Config, LlmConfig, StorageConfig};
pub use create::{CreatedGoal, CreationOutcome, create_goal};
pub use decompose::{Decomposer, GenerationError, LlmDecomposer};
pub use error::{CreateError, SessionError, ValidationError};
pub use focus::{FocusOutcome, run_focus};
pub use llm::{LlmClient, LlmError, create_client};
pub use prompt::{Prompter, TerminalPrompter};
