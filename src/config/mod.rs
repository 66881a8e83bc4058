pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Settings of the `fsstate` CLI, stored as TOML
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where the persisted file state lives
    #[serde(default)]
    pub state: StateConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[state]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding the state file; `~` is expanded
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_state_file_name")]
    pub file_name: String,
    /// Treat an unreadable state file as empty instead of failing
    #[serde(default = "default_reset_on_corruption")]
    pub reset_on_corruption: bool,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `FSSTATE_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
            file_name: default_state_file_name(),
            reset_on_corruption: default_reset_on_corruption(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create the default configuration file
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Full path of the state file, with `~` expanded
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory starts with `~` and the home
    /// directory cannot be determined
    pub fn state_file_path(&self) -> Result<PathBuf> {
        let dir = crate::utils::expand_tilde(&self.state.dir.to_string_lossy())?;
        Ok(dir.join(&self.state.file_name))
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key.split_once('.')? {
            ("state", "dir") => Some(self.state.dir.display().to_string()),
            ("state", "file_name") => Some(self.state.file_name.clone()),
            ("state", "reset_on_corruption") => Some(self.state.reset_on_corruption.to_string()),
            ("logging", "level") => Some(self.logging.level.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let Some(parts) = key.split_once('.') else {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        };

        match parts {
            ("state", "dir") => self.state.dir = PathBuf::from(value),
            ("state", "file_name") => {
                validator::validate_file_name(&value)?;
                self.state.file_name = value;
            }
            ("state", "reset_on_corruption") => {
                self.state.reset_on_corruption = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("logging", "level") => {
                validator::validate_log_level(&value)?;
                self.logging.level = value;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}

// Default functions for serde
fn default_state_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(|| PathBuf::from(".fsstate"), |dir| dir.join("fsstate"))
}

fn default_state_file_name() -> String {
    crate::STATE_FILE.to_string()
}

const fn default_reset_on_corruption() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config/fsstate.toml");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config.state.file_name, crate::STATE_FILE);
        assert!(config.state.reset_on_corruption);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fsstate.toml");
        std::fs::write(&path, "[state]\nfile_name = \"custom.bin\"\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.state.file_name, "custom.bin");
        assert_eq!(config.logging.level, "warn");
        Ok(())
    }

    #[test]
    fn test_save_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fsstate.toml");

        let mut config = Config::default();
        config.state.dir = dir.path().join("state");
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.state.dir, dir.path().join("state"));
        assert_eq!(
            loaded.state_file_path()?,
            dir.path().join("state").join(crate::STATE_FILE)
        );
        Ok(())
    }

    #[test]
    fn test_get_set() -> Result<()> {
        let mut config = Config::default();
        config.set("logging.level", "debug".to_string())?;
        config.set("state.reset_on_corruption", "false".to_string())?;

        assert_eq!(config.get("logging.level").as_deref(), Some("debug"));
        assert_eq!(
            config.get("state.reset_on_corruption").as_deref(),
            Some("false")
        );
        assert!(config.get("state.unknown").is_none());

        assert!(config.set("logging.level", "loud".to_string()).is_err());
        assert!(config.set("state.file_name", "a/b".to_string()).is_err());
        assert!(config.set("nosection", "x".to_string()).is_err());
        Ok(())
    }
}
