//! Run command
//!
//! Dispatches an action through its hooks. Every `--action` runs on its own
//! worker thread with its own completion, so the after-hooks fire once the
//! last one finishes. Without actions, the after-hooks run right after the
//! before-hooks.

use crate::error::{CommandError, abort_message, is_after_hook_failure};
use actionhooks_config::{Config, ConfigStore};
use actionhooks_engine::{
    ActionDispatcher, CommandRunner, CompletionCoordinator, DuctRunner, HookManager, ShellCommand,
};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::thread::JoinHandle;

type ActionHandle = (String, JoinHandle<Result<()>>);

/// Run the `run` command
pub fn run(config: &Config, context: &str, key: &str, actions: &[String]) -> Result<()> {
    let manager = HookManager::with_shell(Arc::new(ConfigStore::new(config)));
    let dispatcher = ActionDispatcher::new(manager, CompletionCoordinator::new());

    let handles = match dispatcher.dispatch(context, key, |coordinator| {
        Ok::<_, anyhow::Error>(spawn_actions(coordinator, actions))
    }) {
        Ok(handles) => handles,
        Err(e) => return report_abort(e),
    };

    let mut first_error = None;
    for (command, handle) in handles {
        let result = handle.join().unwrap_or_else(|_| {
            Err(CommandError::ActionPanicked {
                command: command.clone(),
            }
            .into())
        });

        let Err(e) = result else {
            continue;
        };
        if let Some(message) = abort_message(&e) {
            println!("{} {}", "!".yellow(), message.yellow());
            continue;
        }
        if is_after_hook_failure(&e) {
            eprintln!("{} after hooks: {e:#}", "✗".red());
        } else {
            eprintln!("{} {}: {e:#}", "✗".red(), command);
        }
        if first_error.is_none() {
            first_error = Some(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Start every action on its own worker, tracked by `coordinator`
///
/// Each worker prints its action's output as soon as the action succeeds, so
/// an error joined from a successful action can only come from the after-hooks.
fn spawn_actions(coordinator: &CompletionCoordinator, actions: &[String]) -> Vec<ActionHandle> {
    let operations = actions.iter().cloned().map(|command| {
        move || -> Result<()> {
            let output = run_action(&command)?;
            let output = output.trim_end();
            if !output.is_empty() {
                println!("{output}");
            }
            println!("{} {}", "✓".green(), command);
            Ok(())
        }
    });

    actions
        .iter()
        .cloned()
        .zip(coordinator.track_spawn_all(operations))
        .collect()
}

/// Run a single action command, returning its combined output
fn run_action(command: &str) -> Result<String> {
    tracing::debug!(action = command, "Running action");

    DuctRunner
        .run_with_output(&ShellCommand::new_shell(command, None).dont_log())
        .map_err(|failure| {
            let output = failure.output.trim();
            let detail = if output.is_empty() {
                failure.source.to_string()
            } else {
                output.to_string()
            };
            anyhow::Error::from(CommandError::ActionFailed {
                command: command.to_string(),
                detail,
            })
        })
}

/// Print a hook-requested abort and succeed; pass anything else through
fn report_abort(err: anyhow::Error) -> Result<()> {
    match abort_message(&err) {
        Some(message) => {
            println!("{} {}", "!".yellow(), message.yellow());
            Ok(())
        }
        None => Err(err),
    }
}
