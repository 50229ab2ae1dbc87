mod context;

pub use context::{
    AgentContext, ContextError, ContextItem, FileContextItem, FolderContextItem, StaticContextItem,
};

use std::time::Duration;

use crate::config::AppConfig;

/// Per-agent settings the commands consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSettings {
    pub input_timeout: Option<Duration>,
}

impl From<&AppConfig> for AgentSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_timeout: config.input_timeout(),
        }
    }
}

/// The actor commands run on behalf of. Owns its context exclusively.
#[derive(Debug)]
pub struct Agent {
    name: String,
    settings: AgentSettings,
    context: Option<AgentContext>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: AgentSettings::default(),
            context: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.agent_name.clone()).with_settings(AgentSettings::from(config))
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// `None` until something opens the first item.
    pub fn context(&self) -> Option<&AgentContext> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut AgentContext> {
        self.context.as_mut()
    }

    /// Creates the context on first use; it then lives as long as the agent.
    pub fn ensure_context(&mut self) -> &mut AgentContext {
        self.context.get_or_insert_with(AgentContext::new)
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Splits the agent into its read-only profile and its mutable context,
    /// so a handler gets the context explicitly instead of digging for it.
    pub(crate) fn parts_mut(&mut self) -> (AgentProfile<'_>, Option<&mut AgentContext>) {
        (
            AgentProfile {
                name: &self.name,
                settings: &self.settings,
            },
            self.context.as_mut(),
        )
    }
}

/// Read-only view of an agent handed to command handlers.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile<'a> {
    pub name: &'a str,
    pub settings: &'a AgentSettings,
}
