//! Check command

use crate::error::CommandError;
use actionhooks_config::Config;
use actionhooks_core::platform::CURRENT_PLATFORM;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

/// Run the `check` command
pub fn run(config: &Config, config_path: Option<&Path>, strict: bool) -> Result<()> {
    match config_path {
        Some(path) if path.exists() => println!("Config: {}", path.display().cyan()),
        Some(path) => println!("Config: {} {}", path.display(), "(not found)".dimmed()),
        None => println!("Config: {}", "(none)".dimmed()),
    }

    println!(
        "Shell: {} {} ({})",
        CURRENT_PLATFORM.shell, CURRENT_PLATFORM.shell_arg, CURRENT_PLATFORM.os
    );
    println!("Action hooks: {}", config.action_hooks.len());
    if let Some(file) = &config.os.shell_functions_file {
        let status = if file.exists() { "" } else { " (missing)" };
        println!("Shell functions: {}{}", file.display(), status.red());
    }

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("{}", "Configuration OK".green());
        return Ok(());
    }

    for warning in &warnings {
        println!("{} {warning}", "warning:".yellow());
    }

    if strict {
        return Err(CommandError::StrictValidation {
            count: warnings.len(),
        }
        .into());
    }

    Ok(())
}
