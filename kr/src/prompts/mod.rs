//! Prompt Template System
//!
//! Loads and renders the `.pmt` templates behind each generative call.
//!
//! Template loading chain:
//! 1. `<config_dir>/kairos/prompts/{name}.pmt` (user override)
//! 2. Embedded fallback compiled into the binary
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PromptLoader, TemplateError};
