use super::Config;
use anyhow::{Result, bail};
use std::path::Path;

/// Fields recognized in the configuration file
const KNOWN_FIELDS: &[&str] = &[
    "state.dir",
    "state.file_name",
    "state.reset_on_corruption",
    "logging.level",
];

/// Log levels accepted in `logging.level`
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

/// Check that the state file name is a plain file name
///
/// # Errors
///
/// Returns an error if the name is empty or contains a path separator
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("State file name cannot be empty");
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        bail!("State file name must not contain path components: {name}");
    }
    Ok(())
}

/// Check that `level` is a known log level
///
/// # Errors
///
/// Returns an error if the level is not one of `error`, `warn`, `info`, `debug`, `trace`, `off`
pub fn validate_log_level(level: &str) -> Result<()> {
    if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) {
        bail!("Invalid log level: {level} (expected one of {})", LOG_LEVELS.join(", "));
    }
    Ok(())
}

/// Validate the values of a loaded configuration
///
/// # Errors
///
/// Returns an error describing the first invalid value
pub fn validate_config(config: &Config) -> Result<()> {
    validate_file_name(&config.state.file_name)?;
    validate_log_level(&config.logging.level)
}

/// Collect fields of the configuration file that have no effect
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed
pub fn unknown_fields(config_path: &Path) -> Result<Vec<String>> {
    if !config_path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(config_path)?;
    let parsed: toml::Value = toml::from_str(&content)?;

    let mut unknown = Vec::new();
    check_table(&parsed, "", &mut unknown);
    Ok(unknown)
}

/// Recursively checks a TOML table for unknown fields
fn check_table(table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
    let toml::Value::Table(map) = table else {
        return;
    };

    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        if KNOWN_FIELDS.contains(&full_key.as_str()) {
            continue;
        }
        if let toml::Value::Table(_) = value {
            check_table(value, &full_key, unknown);
        } else {
            unknown.push(full_key);
        }
    }
}
