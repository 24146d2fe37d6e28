//! Chill mode
//!
//! A break screen: one suggestion drawn from the configured interests, with
//! a limited number of skips. Nothing here touches the goal store.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::ChillConfig;
use crate::decompose::Decomposer;
use crate::error::SessionError;
use crate::prompt::Prompter;
use crate::ui;

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("valid URL regex"));

/// One entry in the chill menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChillAction {
    OpenUrl,
    Skip,
    SwitchBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChillOutcome {
    BackToWork,
    /// The URL found in the suggestion, if any
    Opened(Option<String>),
    Cancelled,
}

/// First http(s) URL in `text`, without trailing punctuation
pub fn first_url(text: &str) -> Option<String> {
    RE_URL
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string())
}

/// Menu for the current screen; Skip disappears once no skips are left
pub fn build_actions(skips_left: u32) -> Vec<(String, ChillAction)> {
    let mut actions = vec![("> Open URL".to_string(), ChillAction::OpenUrl)];
    if skips_left > 0 {
        actions.push((format!("> Skip ({} left)", skips_left), ChillAction::Skip));
    }
    actions.push(("> Switch back to Code".to_string(), ChillAction::SwitchBack));
    actions
}

/// Show suggestions until the user opens one, goes back, or cancels
pub async fn run_chill(
    decomposer: &dyn Decomposer,
    prompter: &mut dyn Prompter,
    config: &ChillConfig,
) -> Result<ChillOutcome, SessionError> {
    debug!(interests = ?config.interests, max_skips = config.max_skips, "run_chill: called");
    let mut skips_left = config.max_skips;

    loop {
        let suggestion = decomposer.suggest_content(&config.interests).await?;

        ui::header("chill mode");
        ui::status("STATUS:", "RECHARGE / INGEST");
        println!();
        ui::subtitle("Top Pick from your Queue:");
        println!("\"{}\"", suggestion);
        println!();

        let actions = build_actions(skips_left);
        let labels: Vec<String> = actions.iter().map(|(label, _)| label.clone()).collect();
        let Some(index) = prompter.select(&labels)? else {
            return Ok(ChillOutcome::Cancelled);
        };

        match actions.get(index).map(|(_, action)| *action) {
            Some(ChillAction::OpenUrl) => {
                let url = first_url(&suggestion);
                match &url {
                    Some(url) => ui::success(&format!("Open: {}", url)),
                    None => ui::warning("No link in this suggestion."),
                }
                info!(?url, "Chill suggestion opened");
                return Ok(ChillOutcome::Opened(url));
            }
            Some(ChillAction::Skip) => {
                skips_left -= 1;
                ui::status("Skipped.", &format!("{} skips remaining", skips_left));
            }
            Some(ChillAction::SwitchBack) => {
                ui::success("Back to work!");
                return Ok(ChillOutcome::BackToWork);
            }
            None => return Ok(ChillOutcome::Cancelled),
        }
    }
}
