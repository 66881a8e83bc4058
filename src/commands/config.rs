use crate::FsStateContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut FsStateContext,
    key: Option<&str>,
    value: Option<String>,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &FsStateContext) {
    println!("{}", "[state]".bold());
    println!("  dir = {}", ctx.config.state.dir.display());
    println!("  file_name = {}", ctx.config.state.file_name);
    println!(
        "  reset_on_corruption = {}",
        ctx.config.state.reset_on_corruption
    );

    println!("\n{}", "[logging]".bold());
    println!("  level = {}", ctx.config.logging.level);
}
