use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::descriptor::{
    CommandCategory, CommandDescriptor, CommandHandler, CommandOutcome, HandlerContext,
};
use super::error::{CommandError, CommandResult};
use super::parameters::ParameterSpec;
use super::registry::CommandProvider;
use super::validator::ValidatedArguments;
use crate::input::InputCollector;

pub const ASK_USER: &str = "ask_user";

/// Suspends the run until the operator answers a question.
pub struct AskUserCommand {
    input: Arc<dyn InputCollector>,
}

impl AskUserCommand {
    pub fn new(input: Arc<dyn InputCollector>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl CommandHandler for AskUserCommand {
    async fn execute(
        &self,
        ctx: HandlerContext<'_>,
        args: &ValidatedArguments,
    ) -> CommandResult<CommandOutcome> {
        let question = args.get_str("question").unwrap_or_default();
        let prompt = format!("{} asks: '{}': ", ctx.agent.name, question);

        let answer = match ctx.agent.settings.input_timeout {
            Some(limit) => tokio::time::timeout(limit, self.input.collect(&prompt))
                .await
                .map_err(|_| timeout_error(limit))?,
            None => self.input.collect(&prompt).await,
        };

        let answer = answer
            .map_err(|e| CommandError::ExecutionFailed {
                command: ASK_USER.to_string(),
                message: e.to_string(),
            })?
            .ok_or(CommandError::InputClosed)?;

        Ok(CommandOutcome::Success(format!(
            "The user's answer: '{}'",
            answer
        )))
    }
}

fn timeout_error(limit: Duration) -> CommandError {
    CommandError::Timeout {
        command: ASK_USER.to_string(),
        seconds: limit.as_secs(),
    }
}

pub fn ask_user(input: Arc<dyn InputCollector>) -> CommandDescriptor {
    CommandDescriptor::new(
        ASK_USER,
        "If you need more details or information regarding the given goals, \
         you can ask the user for input",
        Arc::new(AskUserCommand::new(input)),
    )
    .with_category(CommandCategory::USER_INTERACTION)
    .with_parameter(
        "question",
        ParameterSpec::string("The question or prompt to the user").required(),
    )
}

pub struct UserInteractionCommands {
    input: Arc<dyn InputCollector>,
}

impl UserInteractionCommands {
    pub fn new(input: Arc<dyn InputCollector>) -> Self {
        Self { input }
    }
}

impl CommandProvider for UserInteractionCommands {
    fn provide_commands(&self) -> Vec<CommandDescriptor> {
        vec![ask_user(self.input.clone())]
    }

    fn provider_name(&self) -> &'static str {
        "user_interaction"
    }
}
