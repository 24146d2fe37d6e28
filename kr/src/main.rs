//! Kairos - AI goal decomposition and focus mode
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, OptionExt, Result, bail};
use goalstore::GoalStore;
use tracing::{debug, info};

use kairos::chill::{ChillOutcome, run_chill};
use kairos::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use kairos::config::{self, Config};
use kairos::create::{CreationOutcome, create_goal, normalize_goal};
use kairos::decompose::LlmDecomposer;
use kairos::focus::{FocusOutcome, run_focus};
use kairos::llm::create_client;
use kairos::prompt::{Prompter, TerminalPrompter};
use kairos::prompts::PromptLoader;
use kairos::status::{build_status, render_text};
use kairos::switch::{SwitchOutcome, run_switch};
use kairos::ui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "Kairos loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_focus(&config),
        Some(Command::Add { goal, context }) => cmd_add(config, cli.config, goal, context).await,
        Some(Command::Switch) => cmd_switch(&config),
        Some(Command::Chill) => cmd_chill(config, cli.config).await,
        Some(Command::Status { format }) => cmd_status(&config, format),
    }
}

fn open_store(config: &Config) -> Result<GoalStore> {
    let path = &config.storage.db_path;
    GoalStore::open(path).context(format!("Failed to open database at {}", path.display()))
}

/// Build the LLM-backed decomposer, asking for an API key if none is configured
fn decomposer(mut config: Config, config_path: Option<PathBuf>, prompter: &mut dyn Prompter) -> Result<LlmDecomposer> {
    let api_key = match config.llm.api_key() {
        Some(key) => key,
        None => {
            let key = prompt_api_key(&config, prompter)?;
            let path = config_path
                .or_else(config::user_config_path)
                .ok_or_eyre("No config directory to save the API key in")?;
            config.llm.api_key = Some(key.clone());
            config.save(&path).context("Failed to save API key")?;
            ui::success(&format!("API key saved to {}", path.display()));
            key
        }
    };

    let client = create_client(&config.llm, api_key).context("Failed to create LLM client")?;
    let prompts = PromptLoader::new(config::user_prompts_dir());
    Ok(LlmDecomposer::new(client, prompts, config.llm.max_tokens))
}

fn prompt_api_key(config: &Config, prompter: &mut dyn Prompter) -> Result<String> {
    let label = format!(
        "No API key found ({} is unset). Enter your {} API key:",
        config.llm.api_key_env, config.llm.provider
    );
    let key = prompter.input(&label)?.map(|k| k.trim().to_string()).unwrap_or_default();
    if key.is_empty() {
        bail!("An API key is required for '{}'", config.llm.provider);
    }
    Ok(key)
}

/// Default command: work through the active goal
fn cmd_focus(config: &Config) -> Result<()> {
    debug!("cmd_focus: called");
    let mut store = open_store(config)?;
    let mut prompter = TerminalPrompter::new()?;

    match run_focus(&mut store, &mut prompter).context("Focus mode failed")? {
        FocusOutcome::NoActiveGoal => {
            ui::warning("No active goal. Run 'kairos add' to create one, or 'kairos switch' to pick one.");
        }
        FocusOutcome::GoalCompleted(goal) => {
            ui::success(&format!("Goal '{}' completed! Run 'kairos add' to set a new one.", goal.name));
        }
        FocusOutcome::SwitchContext => ui::subtitle("Take a break. Run 'kairos chill'."),
        FocusOutcome::Idle => {}
    }
    Ok(())
}

async fn cmd_add(config: Config, config_path: Option<PathBuf>, words: Vec<String>, context: Option<String>) -> Result<()> {
    debug!(?words, ?context, "cmd_add: called");
    let mut prompter = TerminalPrompter::new()?;

    let (goal, context) = if words.is_empty() {
        let Some(goal) = prompter.input("What is your goal?")? else {
            return Ok(());
        };
        let context = match context {
            Some(c) => Some(c),
            None => prompter.input("Any context? (experience, constraints; Enter to skip)")?,
        };
        (goal, context)
    } else {
        (words.join(" "), context)
    };
    let goal = normalize_goal(&goal)?.to_string();

    let mut store = open_store(&config)?;
    let decomposer = decomposer(config, config_path, &mut prompter)?;

    let outcome = create_goal(&mut store, &decomposer, &mut prompter, &goal, context.as_deref())
        .await
        .context("Failed to create goal")?;

    match outcome {
        CreationOutcome::Created(created) => {
            let failed = created.failed_milestones().count();
            if failed > 0 {
                ui::warning(&format!(
                    "{} milestone(s) have no subtasks yet; they stay in the plan.",
                    failed
                ));
            }
            ui::status(
                "Planned:",
                &format!(
                    "{} milestones, {} subtasks",
                    created.milestones.len(),
                    created.subtask_count()
                ),
            );
            ui::success("Goal setup complete! Run 'kairos' to start working.");
        }
        CreationOutcome::Cancelled => ui::warning("Goal discarded."),
    }
    Ok(())
}

fn cmd_switch(config: &Config) -> Result<()> {
    debug!("cmd_switch: called");
    let mut store = open_store(config)?;
    let mut prompter = TerminalPrompter::new()?;

    match run_switch(&mut store, &mut prompter).context("Goal selection failed")? {
        SwitchOutcome::Selected(goal) => ui::success(&format!("Switched to '{}'. Run 'kairos' to focus.", goal.name)),
        SwitchOutcome::NoGoals => ui::warning("No goals yet. Run 'kairos add' to create one."),
        SwitchOutcome::Cancelled => {}
    }
    Ok(())
}

async fn cmd_chill(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    debug!("cmd_chill: called");
    let mut prompter = TerminalPrompter::new()?;
    let chill = config.chill.clone();
    let decomposer = decomposer(config, config_path, &mut prompter)?;

    let outcome = run_chill(&decomposer, &mut prompter, &chill)
        .await
        .context("Chill mode failed")?;
    debug!(?outcome, "cmd_chill: finished");
    if outcome == ChillOutcome::Cancelled {
        ui::warning("Break over.");
    }
    Ok(())
}

fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_status: called");
    let store = open_store(config)?;
    let report = build_status(&store).context("Failed to read status")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => match report {
            Some(report) => print!("{}", render_text(&report)),
            None => println!("No active goal."),
        },
    }
    Ok(())
}
