use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::descriptor::{CommandOutcome, HandlerContext};
use super::error::{ArgumentIssue, CommandError, CommandResult};
use super::registry::CommandRegistry;
use super::validator::validate;
use crate::agent::Agent;
use crate::console::console;

/// One requested invocation, as it arrives from the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandCall {
    #[serde(default)]
    pub id: String,
    pub command: String,
    /// A JSON object, or a string holding one (LLM tool calls send strings).
    #[serde(default)]
    pub arguments: Value,
}

impl CommandCall {
    pub fn new(id: impl Into<String>, command: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            arguments,
        }
    }

    fn resolved_arguments(&self) -> CommandResult<Value> {
        match &self.arguments {
            Value::String(raw) if raw.trim().is_empty() => Ok(Value::Null),
            Value::String(raw) => serde_json::from_str(raw).map_err(|e| {
                CommandError::invalid_argument(
                    &self.command,
                    "arguments",
                    ArgumentIssue::MalformedJson(e.to_string()),
                )
            }),
            other => Ok(other.clone()),
        }
    }
}

#[derive(Debug)]
pub struct CommandCallResult {
    pub call_id: String,
    pub command: String,
    pub result: CommandResult<CommandOutcome>,
}

impl CommandCallResult {
    pub fn is_exit(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_exit())
    }

    /// Text to feed back to the planner for this call.
    pub fn feedback(&self) -> String {
        match &self.result {
            Ok(CommandOutcome::Success(output)) => output.clone(),
            Ok(CommandOutcome::Exit { reason }) => format!("Shutting down: {}", reason),
            Err(error) => format!("Error: {}", error),
        }
    }
}

/// Resolves, validates, gates and runs commands against one agent at a time.
#[derive(Clone)]
pub struct CommandExecutor {
    registry: Arc<CommandRegistry>,
}

impl CommandExecutor {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Lookup, argument validation, availability, then the handler.
    /// The handler is never reached if any earlier step fails.
    pub async fn execute(
        &self,
        name: &str,
        raw_args: &Value,
        agent: &mut Agent,
    ) -> CommandResult<CommandOutcome> {
        let descriptor = self.registry.lookup(name)?;
        let args = validate(name, descriptor.parameters(), raw_args)?;

        if !descriptor.is_available(agent) {
            return Err(CommandError::CommandUnavailable {
                command: name.to_string(),
                reason: descriptor.unavailable_reason().to_string(),
            });
        }

        console().debug(&format!("Executing {}({})", name, args.summary()));

        let (profile, context) = agent.parts_mut();
        let ctx = HandlerContext {
            agent: profile,
            context,
        };
        descriptor.handler().execute(ctx, &args).await
    }

    pub async fn execute_call(&self, call: &CommandCall, agent: &mut Agent) -> CommandCallResult {
        let result = match call.resolved_arguments() {
            Ok(args) => self.execute(&call.command, &args, agent).await,
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            console().verbose(&format!("Command '{}' failed: {}", call.command, e));
        }

        CommandCallResult {
            call_id: call.id.clone(),
            command: call.command.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::StaticContextItem;
    use crate::commands::{
        Availability, CommandDescriptor, CommandHandler, ParameterSpec, ValidatedArguments,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler for CountingHandler {
        async fn execute(
            &self,
            ctx: HandlerContext<'_>,
            args: &ValidatedArguments,
        ) -> CommandResult<CommandOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let open = ctx.context.map(|c| c.len()).unwrap_or(0);
            Ok(CommandOutcome::Success(format!(
                "{} saw {} item(s) and {:?}",
                ctx.agent.name,
                open,
                args.get_str("text")
            )))
        }
    }

    fn executor_with(descriptor: CommandDescriptor) -> CommandExecutor {
        let mut registry = CommandRegistry::new();
        registry.register(descriptor).unwrap();
        CommandExecutor::new(Arc::new(registry))
    }

    fn counting(calls: &Arc<AtomicUsize>) -> CommandDescriptor {
        CommandDescriptor::new(
            "echo",
            "Echo text",
            Arc::new(CountingHandler {
                calls: calls.clone(),
            }),
        )
        .with_parameter("text", ParameterSpec::string("Text to echo").required())
    }

    #[tokio::test]
    async fn test_execute_runs_handler_with_validated_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = executor_with(counting(&calls));
        let mut agent = Agent::new("Scout");

        let outcome = executor
            .execute("echo", &json!({"text": "hi"}), &mut agent)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Success("Scout saw 0 item(s) and Some(\"hi\")".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = executor_with(counting(&calls));
        let mut agent = Agent::new("Scout");

        let err = executor
            .execute("unknown", &json!({}), &mut agent)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::CommandNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_argument_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = executor_with(counting(&calls));
        let mut agent = Agent::new("Scout");

        let err = executor
            .execute("echo", &json!({}), &mut agent)
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_command_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor =
            executor_with(counting(&calls).with_availability(Availability::context_present()));
        let mut agent = Agent::new("Scout");

        let err = executor
            .execute("echo", &json!({"text": "hi"}), &mut agent)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::CommandUnavailable { ref reason, .. } if reason == "no context items are open"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        agent
            .ensure_context()
            .add(Box::new(StaticContextItem::new("item", "")));
        let outcome = executor
            .execute("echo", &json!({"text": "hi"}), &mut agent)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Success("Scout saw 1 item(s) and Some(\"hi\")".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_call_parses_string_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = executor_with(counting(&calls));
        let mut agent = Agent::new("Scout");

        let call = CommandCall::new("call_1", "echo", json!("{\"text\": \"hi\"}"));
        let result = executor.execute_call(&call, &mut agent).await;

        assert_eq!(result.call_id, "call_1");
        assert!(result.result.is_ok());
        assert!(!result.is_exit());
    }

    #[tokio::test]
    async fn test_execute_call_with_malformed_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = executor_with(counting(&calls));
        let mut agent = Agent::new("Scout");

        let call = CommandCall::new("call_1", "echo", json!("{not json"));
        let result = executor.execute_call(&call, &mut agent).await;

        assert!(result.feedback().starts_with("Error: Invalid argument 'arguments'"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_command_call_deserializes_without_id() {
        let call: CommandCall =
            serde_json::from_str(r#"{"command": "echo", "arguments": {"text": "hi"}}"#).unwrap();
        assert_eq!(call.id, "");
        assert_eq!(call.arguments, json!({"text": "hi"}));
    }
}
