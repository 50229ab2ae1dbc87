use anyhow::Result;
use clap::Parser;
use farman::{
    cli::{Cli, Commands, handle_commands, handle_config, handle_run},
    config::AppConfig,
    console::{console, init_console},
    session::SessionOutcome,
};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_default();

    // CLI flags take precedence over the configured verbosity
    let effective_verbosity = cli.get_effective_verbosity(config.get_verbosity());
    init_console(effective_verbosity);

    match cli.command {
        Commands::Run {
            script,
            open,
            name,
            answers,
        } => {
            let outcome = handle_run(&script, &open, name, answers.as_deref(), &config).await?;
            if let SessionOutcome::Completed { executed, .. } = outcome {
                console().success(&format!("Goals accomplished after {} call(s)", executed));
            }
            io::stdout().flush()?;
            io::stderr().flush()?;
        }
        Commands::Commands { open } => {
            handle_commands(&open, &config)?;
        }
        Commands::Config { action } => {
            handle_config(action)?;
        }
    }

    Ok(())
}
