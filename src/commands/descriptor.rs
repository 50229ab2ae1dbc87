use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

use super::error::CommandResult;
use super::parameters::{CommandParameters, ParameterSpec};
use super::validator::ValidatedArguments;
use crate::agent::{Agent, AgentContext, AgentProfile};

/// What a handler hands back when it does not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Text fed back to the agent.
    Success(String),
    /// The whole run should end normally. Not an error.
    Exit { reason: String },
}

impl CommandOutcome {
    pub fn is_exit(&self) -> bool {
        matches!(self, CommandOutcome::Exit { .. })
    }
}

/// Grouping used for help output and for disabling commands from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandCategory {
    pub name: &'static str,
    pub title: &'static str,
}

impl CommandCategory {
    pub const GENERAL: CommandCategory = CommandCategory::new("general", "General");
    pub const SYSTEM: CommandCategory = CommandCategory::new("system", "System");
    pub const USER_INTERACTION: CommandCategory =
        CommandCategory::new("user_interaction", "User Interaction");

    pub const fn new(name: &'static str, title: &'static str) -> Self {
        Self { name, title }
    }
}

/// Everything a handler may touch during one call. The context is passed
/// explicitly and is `None` when the agent has never opened anything.
pub struct HandlerContext<'a> {
    pub agent: AgentProfile<'a>,
    pub context: Option<&'a mut AgentContext>,
}

/// Executable logic bound to a command descriptor.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: HandlerContext<'_>,
        args: &ValidatedArguments,
    ) -> CommandResult<CommandOutcome>;
}

pub type AvailabilityPredicate = Arc<dyn Fn(&Agent) -> bool + Send + Sync>;

/// Gate evaluated on every invocation attempt, never cached.
#[derive(Clone)]
pub struct Availability {
    predicate: AvailabilityPredicate,
    reason: String,
}

impl Availability {
    pub fn new(
        reason: impl Into<String>,
        predicate: impl Fn(&Agent) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Arc::new(predicate),
            reason: reason.into(),
        }
    }

    /// Available only while the agent has a context.
    pub fn context_present() -> Self {
        Self::new("no context items are open", Agent::has_context)
    }

    pub fn check(&self, agent: &Agent) -> bool {
        (self.predicate)(agent)
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Debug for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Availability")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// Immutable metadata plus handler for one command.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    category: CommandCategory,
    parameters: CommandParameters,
    availability: Option<Availability>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: CommandCategory::GENERAL,
            parameters: CommandParameters::new(),
            availability: None,
            handler,
        }
    }

    pub fn with_category(mut self, category: CommandCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters = self.parameters.with(name, spec);
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> CommandCategory {
        self.category
    }

    pub fn parameters(&self) -> &CommandParameters {
        &self.parameters
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Commands without a predicate are always available.
    pub fn is_available(&self, agent: &Agent) -> bool {
        self.availability
            .as_ref()
            .is_none_or(|availability| availability.check(agent))
    }

    pub fn unavailable_reason(&self) -> &str {
        self.availability
            .as_ref()
            .map(Availability::reason)
            .unwrap_or("not available")
    }

    /// Entry in OpenAI function-calling format.
    pub fn tool_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters.to_json_schema()
            }
        })
    }

    pub fn usage(&self) -> String {
        if self.parameters.is_empty() {
            format!("{} - {}", self.name, self.description)
        } else {
            format!(
                "{} - {}\n\nParameters:\n{}",
                self.name,
                self.description,
                self.parameters.usage()
            )
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("category", &self.category.name)
            .field("parameters", &self.parameters)
            .field("availability", &self.availability)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::StaticContextItem;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn execute(
            &self,
            _ctx: HandlerContext<'_>,
            _args: &ValidatedArguments,
        ) -> CommandResult<CommandOutcome> {
            Ok(CommandOutcome::Success(String::new()))
        }
    }

    #[test]
    fn test_descriptor_without_predicate_is_always_available() {
        let descriptor = CommandDescriptor::new("noop", "Does nothing", Arc::new(Noop));
        assert!(descriptor.is_available(&Agent::new("a")));
        assert_eq!(descriptor.category(), CommandCategory::GENERAL);
    }

    #[test]
    fn test_availability_is_evaluated_against_current_state() {
        let descriptor = CommandDescriptor::new("noop", "Does nothing", Arc::new(Noop))
            .with_availability(Availability::context_present());
        let mut agent = Agent::new("a");

        assert!(!descriptor.is_available(&agent));
        assert_eq!(descriptor.unavailable_reason(), "no context items are open");

        agent
            .ensure_context()
            .add(Box::new(StaticContextItem::new("item", "")));
        assert!(descriptor.is_available(&agent));
    }

    #[test]
    fn test_tool_schema_format() {
        let descriptor = CommandDescriptor::new("ask", "Ask something", Arc::new(Noop))
            .with_parameter("question", ParameterSpec::string("The question").required());
        let schema = descriptor.tool_schema();

        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "ask");
        assert_eq!(schema["function"]["description"], "Ask something");
        assert_eq!(schema["function"]["parameters"]["required"], json!(["question"]));
    }

    #[test]
    fn test_usage_includes_parameters() {
        let descriptor = CommandDescriptor::new("ask", "Ask something", Arc::new(Noop))
            .with_parameter("question", ParameterSpec::string("The question").required());

        assert_eq!(
            descriptor.usage(),
            "ask - Ask something\n\nParameters:\n  question (string, required): The question"
        );
    }

    #[test]
    fn test_exit_outcome() {
        assert!(CommandOutcome::Exit { reason: "done".into() }.is_exit());
        assert!(!CommandOutcome::Success("ok".into()).is_exit());
    }
}
