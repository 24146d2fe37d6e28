//! Generative task decomposition
//!
//! Turns a goal into milestones, a milestone into subtasks, and a list of
//! interests into a break-time suggestion. The [`Decomposer`] trait is the
//! seam; [`LlmDecomposer`] is the real implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError, StopReason};
use crate::prompts::{PromptLoader, TemplateError};

const SYSTEM_PROMPT: &str = "You are a productivity assistant. Be concise and practical.";

/// Errors from a generative call
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("No content generated")]
    NoContent,

    #[error("Failed to parse JSON list: {source}, text: {raw}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("Generated list was empty")]
    EmptyList,
}

/// Source of milestones, subtasks, and break suggestions
#[async_trait]
pub trait Decomposer: Send + Sync {
    /// Break a goal into ordered milestone descriptions
    async fn decompose_goal(&self, goal: &str, context: Option<&str>) -> Result<Vec<String>, GenerationError>;

    /// Break a milestone into ordered subtask descriptions
    async fn decompose_milestone(&self, milestone: &str) -> Result<Vec<String>, GenerationError>;

    /// Suggest something to read during a break
    async fn suggest_content(&self, interests: &[String]) -> Result<String, GenerationError>;
}

/// Parse a model reply into a list of non-blank strings
///
/// Accepts a bare JSON array or one wrapped in a markdown code fence.
pub fn parse_string_list(raw: &str) -> Result<Vec<String>, GenerationError> {
    debug!(raw_len = raw.len(), "parse_string_list: called");
    let mut text = raw.trim();
    text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text = text.strip_suffix("```").unwrap_or(text).trim();

    let items: Vec<String> = serde_json::from_str(text).map_err(|source| GenerationError::Parse {
        source,
        raw: raw.to_string(),
    })?;

    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        return Err(GenerationError::EmptyList);
    }
    Ok(items)
}

#[derive(Serialize)]
struct GoalPrompt<'a> {
    goal: &'a str,
    context: Option<&'a str>,
}

#[derive(Serialize)]
struct MilestonePrompt<'a> {
    milestone: &'a str,
}

#[derive(Serialize)]
struct ChillPrompt {
    interests: String,
}

/// Decomposer backed by an LLM client and the prompt templates
pub struct LlmDecomposer {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
}

impl LlmDecomposer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Render a template, send it, and return the reply text
    async fn generate<T: Serialize + Sync>(&self, template: &str, context: &T) -> Result<String, GenerationError> {
        let prompt = self.prompts.render(template, context)?;
        let request = CompletionRequest::single(SYSTEM_PROMPT, prompt, self.max_tokens);

        let response = self.llm.complete(request).await?;
        debug!(
            template,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "generate: response received"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(template, "Response truncated at max tokens");
        }

        response
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::NoContent)
    }
}

#[async_trait]
impl Decomposer for LlmDecomposer {
    async fn decompose_goal(&self, goal: &str, context: Option<&str>) -> Result<Vec<String>, GenerationError> {
        debug!(%goal, has_context = context.is_some(), "decompose_goal: called");
        let raw = self.generate("goal", &GoalPrompt { goal, context }).await?;
        let milestones = parse_string_list(&raw)?;
        info!(count = milestones.len(), "Generated milestones");
        Ok(milestones)
    }

    async fn decompose_milestone(&self, milestone: &str) -> Result<Vec<String>, GenerationError> {
        debug!(%milestone, "decompose_milestone: called");
        let raw = self.generate("milestone", &MilestonePrompt { milestone }).await?;
        let subtasks = parse_string_list(&raw)?;
        info!(count = subtasks.len(), %milestone, "Generated subtasks");
        Ok(subtasks)
    }

    async fn suggest_content(&self, interests: &[String]) -> Result<String, GenerationError> {
        debug!(?interests, "suggest_content: called");
        let context = ChillPrompt {
            interests: interests.join(", "),
        };
        let suggestion = self.generate("chill", &context).await?;
        Ok(suggestion.trim().to_string())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Decomposer with canned answers
    ///
    /// Unscripted milestones fail with `NoContent`, which makes partial
    /// creation easy to exercise.
    #[derive(Default)]
    pub struct ScriptedDecomposer {
        goal: Option<Vec<String>>,
        milestones: HashMap<String, Vec<String>>,
        suggestions: Mutex<VecDeque<String>>,
        calls: Mutex<Vec<String>>,
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    impl ScriptedDecomposer {
        pub fn new(milestones: &[&str]) -> Self {
            Self {
                goal: Some(owned(milestones)),
                ..Self::default()
            }
        }

        /// Decomposer whose goal decomposition always fails
        pub fn failing() -> Self {
            Self::default()
        }

        pub fn with_subtasks(mut self, milestone: &str, subtasks: &[&str]) -> Self {
            self.milestones.insert(milestone.to_string(), owned(subtasks));
            self
        }

        pub fn with_suggestions(self, suggestions: &[&str]) -> Self {
            *self.suggestions.lock().unwrap() = owned(suggestions).into();
            self
        }

        /// Log of calls in order: `goal:<text>`, `milestone:<text>`, `suggest`
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Decomposer for ScriptedDecomposer {
        async fn decompose_goal(&self, goal: &str, _context: Option<&str>) -> Result<Vec<String>, GenerationError> {
            self.calls.lock().unwrap().push(format!("goal:{goal}"));
            self.goal.clone().ok_or(GenerationError::NoContent)
        }

        async fn decompose_milestone(&self, milestone: &str) -> Result<Vec<String>, GenerationError> {
            self.calls.lock().unwrap().push(format!("milestone:{milestone}"));
            self.milestones.get(milestone).cloned().ok_or(GenerationError::NoContent)
        }

        async fn suggest_content(&self, _interests: &[String]) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push("suggest".to_string());
            self.suggestions.lock().unwrap().pop_front().ok_or(GenerationError::NoContent)
        }
    }
}
