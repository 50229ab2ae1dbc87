use anyhow::{Context, Result};

use crate::agent::Agent;
use crate::commands::{CommandCall, CommandCallResult, CommandExecutor, CommandOutcome};
use crate::console::console;

const RESULT_DISPLAY_LIMIT: usize = 500;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A command asked to end the run.
    Completed { reason: String, executed: usize },
    /// The calls ran out without anyone ending the run.
    Exhausted { executed: usize },
}

/// Drives one agent through a sequence of command calls, one at a time.
pub struct Session {
    executor: CommandExecutor,
    agent: Agent,
    executed: usize,
    exit_reason: Option<String>,
}

impl Session {
    pub fn new(executor: CommandExecutor, agent: Agent) -> Self {
        Self {
            executor,
            agent,
            executed: 0,
            exit_reason: None,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn executed(&self) -> usize {
        self.executed
    }

    pub fn is_finished(&self) -> bool {
        self.exit_reason.is_some()
    }

    /// Runs one call. Returns `None` once the run has ended; nothing executes after that.
    pub async fn step(&mut self, call: &CommandCall) -> Option<CommandCallResult> {
        if self.is_finished() {
            return None;
        }

        let result = self.executor.execute_call(call, &mut self.agent).await;
        self.executed += 1;

        if let Ok(CommandOutcome::Exit { reason }) = &result.result {
            self.exit_reason = Some(reason.clone());
        }
        Some(result)
    }

    /// Runs calls in order until they run out or one ends the run.
    pub async fn run<I>(&mut self, calls: I) -> SessionOutcome
    where
        I: IntoIterator<Item = CommandCall>,
    {
        for call in calls {
            if self.is_finished() {
                break;
            }

            console().command_call(&call.command, &argument_summary(&call));
            let Some(result) = self.step(&call).await else {
                break;
            };

            match &result.result {
                Ok(_) => console().command_result(&result.feedback(), RESULT_DISPLAY_LIMIT),
                Err(e) => console().error(&e.to_string()),
            }
        }

        self.outcome()
    }

    pub fn outcome(&self) -> SessionOutcome {
        match &self.exit_reason {
            Some(reason) => SessionOutcome::Completed {
                reason: reason.clone(),
                executed: self.executed,
            },
            None => SessionOutcome::Exhausted {
                executed: self.executed,
            },
        }
    }
}

fn argument_summary(call: &CommandCall) -> String {
    match &call.arguments {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses a call script: one JSON object per line, blank lines and `#` comments skipped.
/// Calls without an id get `call_<line>`.
pub fn parse_script(content: &str) -> Result<Vec<CommandCall>> {
    let mut calls = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut call: CommandCall = serde_json::from_str(line)
            .with_context(|| format!("Invalid command call on line {}", line_no + 1))?;
        if call.id.is_empty() {
            call.id = format!("call_{}", line_no + 1);
        }
        calls.push(call);
    }

    Ok(calls)
}
