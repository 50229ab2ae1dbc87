mod error;

pub use error::{ConfigError, ConfigResult};

use crate::console::VerbosityLevel;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Name the agent uses when addressing the operator.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    #[serde(default)]
    pub verbosity: Option<String>,
    /// How long `ask_user` waits for an answer. Unset means no limit.
    #[serde(default)]
    pub input_timeout_secs: Option<u64>,
    /// Command categories left out of the registry.
    #[serde(default)]
    pub disabled_categories: Vec<String>,
}

fn default_agent_name() -> String {
    "farman".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            verbosity: None,
            input_timeout_secs: None,
            disabled_categories: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads the user config, writing the defaults on first run.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::InvalidToml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the configured verbosity level, falling back to Normal if not set
    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(VerbosityLevel::Normal)
    }

    pub fn input_timeout(&self) -> Option<Duration> {
        self.input_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Applies a `config set <key> <value>` update.
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let invalid = || ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "agent_name" => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(invalid());
                }
                self.agent_name = name.to_string();
            }
            "verbosity" => {
                let level: VerbosityLevel = value.parse().map_err(|_| invalid())?;
                self.verbosity = Some(level.to_string());
            }
            "input_timeout_secs" => {
                self.input_timeout_secs = match value {
                    "" | "none" => None,
                    secs => Some(secs.parse().map_err(|_| invalid())?),
                };
            }
            "disabled_categories" => {
                self.disabled_categories = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {
                return Err(ConfigError::UnknownConfigKey {
                    key: key.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn config_path() -> ConfigResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        path.push("farman");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
