use async_trait::async_trait;
use std::sync::Arc;

use super::descriptor::{
    Availability, CommandCategory, CommandDescriptor, CommandHandler, CommandOutcome,
    HandlerContext,
};
use super::error::{CommandError, CommandResult};
use super::parameters::ParameterSpec;
use super::registry::CommandProvider;
use super::validator::ValidatedArguments;
use crate::console::console;

pub const GOALS_ACCOMPLISHED: &str = "goals_accomplished";
pub const CLOSE_CONTEXT_ITEM: &str = "close_context_item";

/// Ends the run. Logs the reason and hands back `Exit`; the session driver
/// does the actual shutdown so cleanup still happens.
pub struct GoalsAccomplishedCommand;

#[async_trait]
impl CommandHandler for GoalsAccomplishedCommand {
    async fn execute(
        &self,
        _ctx: HandlerContext<'_>,
        args: &ValidatedArguments,
    ) -> CommandResult<CommandOutcome> {
        let reason = args.get_str("reason").unwrap_or_default().to_string();
        console().titled("Shutting down...\n", &reason);
        Ok(CommandOutcome::Exit { reason })
    }
}

pub struct CloseContextItemCommand;

#[async_trait]
impl CommandHandler for CloseContextItemCommand {
    async fn execute(
        &self,
        ctx: HandlerContext<'_>,
        args: &ValidatedArguments,
    ) -> CommandResult<CommandOutcome> {
        let context = ctx.context.ok_or_else(|| CommandError::CommandUnavailable {
            command: CLOSE_CONTEXT_ITEM.to_string(),
            reason: "no context items are open".to_string(),
        })?;

        // 0 and negatives included: every miss reports the valid range.
        let index = args.get_integer("index").unwrap_or(0);
        if index <= 0 || index as usize > context.len() {
            return Err(CommandError::invalid_index(
                CLOSE_CONTEXT_ITEM,
                index,
                context.len(),
            ));
        }

        let closed = context
            .close(index as usize)
            .map_err(|e| e.for_command(CLOSE_CONTEXT_ITEM))?;
        console().verbose(&format!("Closed context item: {}", closed.description()));

        Ok(CommandOutcome::Success(format!(
            "Context item {} closed ✅",
            index
        )))
    }
}

pub fn goals_accomplished() -> CommandDescriptor {
    CommandDescriptor::new(
        GOALS_ACCOMPLISHED,
        "Goals are accomplished and there is nothing left to do",
        Arc::new(GoalsAccomplishedCommand),
    )
    .with_category(CommandCategory::SYSTEM)
    .with_parameter(
        "reason",
        ParameterSpec::string("A summary to the user of how the goals were accomplished")
            .required()
            .with_min_length(1),
    )
}

pub fn close_context_item() -> CommandDescriptor {
    CommandDescriptor::new(
        CLOSE_CONTEXT_ITEM,
        "Close an open file, folder or other context item",
        Arc::new(CloseContextItemCommand),
    )
    .with_category(CommandCategory::SYSTEM)
    .with_parameter(
        "index",
        ParameterSpec::integer("The 1-based index of the context item to close").required(),
    )
    .with_availability(Availability::context_present())
}

pub struct SystemCommands;

impl CommandProvider for SystemCommands {
    fn provide_commands(&self) -> Vec<CommandDescriptor> {
        vec![goals_accomplished(), close_context_item()]
    }

    fn provider_name(&self) -> &'static str {
        "system"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, StaticContextItem};
    use crate::commands::{ArgumentIssue, CommandExecutor, CommandRegistry};
    use serde_json::json;

    fn executor() -> CommandExecutor {
        let mut registry = CommandRegistry::new();
        registry.register_provider(&SystemCommands).unwrap();
        CommandExecutor::new(Arc::new(registry))
    }

    fn agent_with_items(names: &[&str]) -> Agent {
        let mut agent = Agent::new("Scout");
        let context = agent.ensure_context();
        for name in names {
            context.add(Box::new(StaticContextItem::new(*name, "")));
        }
        agent
    }

    fn remaining(agent: &Agent) -> Vec<String> {
        agent
            .context()
            .map(|c| c.iter().map(|(_, item)| item.description()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_close_without_context_is_unavailable() {
        let mut agent = Agent::new("Scout");
        let err = executor()
            .execute(CLOSE_CONTEXT_ITEM, &json!({"index": 1}), &mut agent)
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::CommandUnavailable { .. }));
        assert!(agent.context().is_none());
    }

    #[tokio::test]
    async fn test_close_second_of_three_then_second_again() {
        let executor = executor();
        let mut agent = agent_with_items(&["one", "two", "three"]);

        let outcome = executor
            .execute(CLOSE_CONTEXT_ITEM, &json!({"index": 2}), &mut agent)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Success("Context item 2 closed ✅".to_string())
        );
        assert_eq!(remaining(&agent), vec!["one", "three"]);

        executor
            .execute(CLOSE_CONTEXT_ITEM, &json!({"index": 2}), &mut agent)
            .await
            .unwrap();
        assert_eq!(remaining(&agent), vec!["one"]);
    }

    #[tokio::test]
    async fn test_close_index_past_end() {
        let mut agent = agent_with_items(&["one", "two"]);
        let err = executor()
            .execute(CLOSE_CONTEXT_ITEM, &json!({"index": 3}), &mut agent)
            .await
            .unwrap_err();

        match err {
            CommandError::InvalidArgument {
                parameter, issue, ..
            } => {
                assert_eq!(parameter, "index");
                assert_eq!(issue, ArgumentIssue::IndexOutOfRange { index: 3, len: 2 });
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
        assert_eq!(remaining(&agent).len(), 2);
    }

    #[tokio::test]
    async fn test_close_index_zero_reports_valid_range() {
        let executor = executor();
        let mut agent = agent_with_items(&["one", "two"]);

        for index in [0, -1] {
            let err = executor
                .execute(CLOSE_CONTEXT_ITEM, &json!({"index": index}), &mut agent)
                .await
                .unwrap_err();

            match err {
                CommandError::InvalidArgument {
                    parameter, issue, ..
                } => {
                    assert_eq!(parameter, "index");
                    assert_eq!(issue, ArgumentIssue::IndexOutOfRange { index, len: 2 });
                }
                other => panic!("expected InvalidArgument, got {:?}", other),
            }
        }
        assert_eq!(remaining(&agent).len(), 2);
    }

    #[tokio::test]
    async fn test_close_on_empty_context() {
        let mut agent = agent_with_items(&[]);
        let err = executor()
            .execute(CLOSE_CONTEXT_ITEM, &json!({"index": 1}), &mut agent)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no context items are open"));
    }

    #[tokio::test]
    async fn test_goals_accomplished_exits() {
        let mut agent = Agent::new("Scout");
        let outcome = executor()
            .execute(GOALS_ACCOMPLISHED, &json!({"reason": "done"}), &mut agent)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Exit {
                reason: "done".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_goals_accomplished_requires_reason() {
        let mut agent = Agent::new("Scout");
        let executor = executor();

        let missing = executor
            .execute(GOALS_ACCOMPLISHED, &json!({}), &mut agent)
            .await
            .unwrap_err();
        assert!(missing.is_invalid_argument());

        let empty = executor
            .execute(GOALS_ACCOMPLISHED, &json!({"reason": ""}), &mut agent)
            .await
            .unwrap_err();
        assert!(empty.is_invalid_argument());
    }

    #[test]
    fn test_system_provider() {
        let names: Vec<String> = SystemCommands
            .provide_commands()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec![GOALS_ACCOMPLISHED, CLOSE_CONTEXT_ITEM]);
        assert_eq!(SystemCommands.provider_name(), "system");
    }
}
