mod descriptor;
mod error;
mod executor;
mod parameters;
mod registry;
pub mod system;
pub mod user_interaction;
mod validator;

use std::sync::Arc;

pub use descriptor::{
    Availability, AvailabilityPredicate, CommandCategory, CommandDescriptor, CommandHandler,
    CommandOutcome, HandlerContext,
};
pub use error::{ArgumentIssue, CommandError, CommandResult};
pub use executor::{CommandCall, CommandCallResult, CommandExecutor};
pub use parameters::{CommandParameters, ParameterSpec, ParameterType};
pub use registry::{CommandProvider, CommandRegistry};
pub use system::SystemCommands;
pub use user_interaction::UserInteractionCommands;
pub use validator::{ValidatedArguments, validate};

use crate::input::InputCollector;

/// Registry with the built-in system and user-interaction commands.
pub fn default_registry(input: Arc<dyn InputCollector>) -> CommandResult<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    registry.register_provider(&SystemCommands)?;
    registry.register_provider(&UserInteractionCommands::new(input))?;
    Ok(registry)
}
