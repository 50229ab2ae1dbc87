pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod input;
pub mod session;

pub use agent::{Agent, AgentContext, AgentSettings, ContextItem};
pub use commands::{
    CommandCall, CommandDescriptor, CommandError, CommandExecutor, CommandOutcome,
    CommandRegistry, CommandResult, default_registry,
};
pub use config::AppConfig;
pub use input::{InputCollector, LineInput, ScriptedInput, TerminalInput};
pub use session::{Session, SessionOutcome, parse_script};
