use indexmap::IndexMap;
use serde_json::Value;

use super::descriptor::{CommandCategory, CommandDescriptor};
use super::error::{CommandError, CommandResult};
use crate::agent::Agent;

/// Source of command descriptors, registered as a group.
pub trait CommandProvider: Send + Sync {
    fn provide_commands(&self) -> Vec<CommandDescriptor>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

/// Commands keyed by name, kept in registration order.
///
/// Registering a name twice is rejected and leaves the registry unchanged.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> CommandResult<()> {
        if self.commands.contains_key(descriptor.name()) {
            return Err(CommandError::DuplicateCommand {
                command: descriptor.name().to_string(),
            });
        }
        self.commands
            .insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Registers every command of a provider. Stops at the first duplicate;
    /// commands registered before it stay registered.
    pub fn register_provider(&mut self, provider: &dyn CommandProvider) -> CommandResult<()> {
        for descriptor in provider.provide_commands() {
            self.register(descriptor)?;
        }
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Option<CommandDescriptor> {
        self.commands.shift_remove(name)
    }

    /// Removes every command of the named category and returns how many went.
    pub fn disable_category(&mut self, category: &str) -> usize {
        let before = self.commands.len();
        self.commands
            .retain(|_, descriptor| descriptor.category().name != category);
        before - self.commands.len()
    }

    pub fn lookup(&self, name: &str) -> CommandResult<&CommandDescriptor> {
        self.commands
            .get(name)
            .ok_or_else(|| CommandError::CommandNotFound {
                command: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Commands whose availability holds for `agent` right now.
    pub fn list_available<'a>(
        &'a self,
        agent: &'a Agent,
    ) -> impl Iterator<Item = &'a CommandDescriptor> + 'a {
        self.commands
            .values()
            .filter(move |descriptor| descriptor.is_available(agent))
    }

    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        self.commands
            .values()
            .map(|descriptor| (descriptor.name(), descriptor.description()))
            .collect()
    }

    /// The tool menu offered to the LLM for this agent.
    pub fn tool_schemas(&self, agent: &Agent) -> Vec<Value> {
        self.list_available(agent)
            .map(CommandDescriptor::tool_schema)
            .collect()
    }

    pub fn categories(&self) -> Vec<CommandCategory> {
        let mut categories: Vec<CommandCategory> = Vec::new();
        for descriptor in self.commands.values() {
            if !categories.contains(&descriptor.category()) {
                categories.push(descriptor.category());
            }
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get_help(&self, command_name: Option<&str>) -> String {
        if let Some(name) = command_name {
            match self.commands.get(name) {
                Some(descriptor) => descriptor.usage(),
                None => format!("Unknown command: {}", name),
            }
        } else {
            let mut help = String::from("Available commands:\n");

            for category in self.categories() {
                help.push_str(&format!("\n{}:\n", category.title));
                for descriptor in self
                    .commands
                    .values()
                    .filter(|d| d.category() == category)
                {
                    help.push_str(&format!(
                        "  {:<20} {}\n",
                        descriptor.name(),
                        descriptor.description()
                    ));
                }
            }

            help
        }
    }
}
