use crate::cli::ConfigAction;
use crate::config::AppConfig;
use crate::console::console;

pub fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            console().plain(&format!("agent_name = \"{}\"", config.agent_name));
            if let Some(ref verbosity) = config.verbosity {
                console().plain(&format!("verbosity = \"{}\"", verbosity));
            }
            if let Some(secs) = config.input_timeout_secs {
                console().plain(&format!("input_timeout_secs = {}", secs));
            }
            if !config.disabled_categories.is_empty() {
                console().plain(&format!(
                    "disabled_categories = [{}]",
                    config
                        .disabled_categories
                        .iter()
                        .map(|c| format!("\"{}\"", c))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            match config.set_value(&key, &value) {
                Ok(()) => {
                    config.save()?;
                    console().success("Configuration updated successfully");
                }
                Err(e) => console().error(&e.to_string()),
            }
        }
    }
    Ok(())
}
