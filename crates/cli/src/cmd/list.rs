//! List command

use actionhooks_config::Config;
use actionhooks_core::{ActionHook, Phase};
use actionhooks_engine::hooks::match_hooks;
use anyhow::Result;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use owo_colors::OwoColorize;

/// Run the `list` command
///
/// With a `(context, key)` filter, only hooks that would run for that action are shown.
pub fn run(config: &Config, filter: Option<(&str, &str)>, json: bool) -> Result<()> {
    let hooks = match filter {
        Some((context, key)) => match_hooks(&config.action_hooks, context, key),
        None => config.action_hooks.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&hooks)?);
        return Ok(());
    }

    if hooks.is_empty() {
        println!("{}", "No action hooks configured.".yellow());
        return Ok(());
    }

    println!("{}", build_table(&hooks));
    Ok(())
}

fn build_table(hooks: &[ActionHook]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Context", "Key", "Before", "After", "Flags"]);

    for (index, hook) in hooks.iter().enumerate() {
        let context = if hook.context.trim().is_empty() {
            "*"
        } else {
            hook.context.trim()
        };
        table.add_row(vec![
            index.to_string(),
            context.to_string(),
            hook.key.trim().to_string(),
            hook.command(Phase::Before).unwrap_or("-").to_string(),
            hook.command(Phase::After).unwrap_or("-").to_string(),
            flags(hook),
        ]);
    }

    table
}

fn flags(hook: &ActionHook) -> String {
    let mut flags = Vec::new();
    if hook.log_output {
        flags.push("log".to_string());
    }
    if hook.abort_on_success {
        let message = hook.abort_message.trim();
        if message.is_empty() {
            flags.push("abort".to_string());
        } else {
            flags.push(format!("abort: {message}"));
        }
    }
    flags.join(", ")
}
