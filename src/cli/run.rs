use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::{Agent, FileContextItem, FolderContextItem};
use crate::commands::{CommandExecutor, CommandRegistry, default_registry};
use crate::config::AppConfig;
use crate::console::console;
use crate::input::{InputCollector, ScriptedInput, TerminalInput};
use crate::session::{Session, SessionOutcome, parse_script};

/// Built-in commands minus the categories the config disables.
pub fn build_registry(
    config: &AppConfig,
    input: Arc<dyn InputCollector>,
) -> Result<CommandRegistry> {
    let mut registry = default_registry(input)?;
    for category in &config.disabled_categories {
        let removed = registry.disable_category(category);
        console().verbose(&format!(
            "Disabled command category '{}' ({} command(s))",
            category, removed
        ));
    }
    Ok(registry)
}

/// Agent from config, with `open` paths already in its context.
pub fn build_agent(config: &AppConfig, name: Option<String>, open: &[PathBuf]) -> Result<Agent> {
    let mut agent = Agent::from_config(config);
    if let Some(name) = name {
        agent = Agent::new(name).with_settings(agent.settings().clone());
    }

    for path in open {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;
        let index = if metadata.is_dir() {
            agent
                .ensure_context()
                .add(Box::new(FolderContextItem::new(path)))
        } else {
            agent
                .ensure_context()
                .add(Box::new(FileContextItem::new(path)))
        };
        console().verbose(&format!("Opened {} as context item {}", path.display(), index));
    }

    Ok(agent)
}

fn input_collector(answers: Option<&Path>) -> Result<Arc<dyn InputCollector>> {
    Ok(match answers {
        Some(path) => Arc::new(ScriptedInput::from_file(path)?),
        None => Arc::new(TerminalInput::new()),
    })
}

pub async fn handle_run(
    script: &Path,
    open: &[PathBuf],
    name: Option<String>,
    answers: Option<&Path>,
    config: &AppConfig,
) -> Result<SessionOutcome> {
    let content = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script: {}", script.display()))?;
    let calls = parse_script(&content)?;

    let registry = build_registry(config, input_collector(answers)?)?;
    let agent = build_agent(config, name, open)?;

    console().verbose(&format!(
        "Running {} call(s) as '{}'",
        calls.len(),
        agent.name()
    ));

    let mut session = Session::new(CommandExecutor::new(Arc::new(registry)), agent);
    let outcome = session.run(calls).await;

    if let Some(context) = session.agent_mut().context_mut() {
        context.clear();
    }

    match &outcome {
        SessionOutcome::Completed { executed, .. } => {
            console().verbose(&format!("Run completed after {} call(s)", executed));
        }
        SessionOutcome::Exhausted { executed } => {
            console().warning(&format!(
                "Script ended after {} call(s) without the goals being accomplished",
                executed
            ));
        }
    }

    Ok(outcome)
}

pub fn handle_commands(open: &[PathBuf], config: &AppConfig) -> Result<()> {
    let registry = build_registry(config, Arc::new(TerminalInput::new()))?;
    let agent = build_agent(config, None, open)?;

    console().plain(&registry.get_help(None));

    let unavailable: Vec<&str> = registry
        .list_commands()
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| {
            registry
                .lookup(name)
                .is_ok_and(|descriptor| !descriptor.is_available(&agent))
        })
        .collect();
    if !unavailable.is_empty() {
        console().info(&format!("Currently unavailable: {}", unavailable.join(", ")));
    }

    let schemas = serde_json::to_string_pretty(&registry.tool_schemas(&agent))?;
    console().verbose(&schemas);

    Ok(())
}
