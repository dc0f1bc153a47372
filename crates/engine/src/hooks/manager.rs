//! Hook execution
//!
//! [`HookManager::execute_before`] runs the before-commands of every hook that
//! matches an action and hands back an [`Execution`]. The execution carries the
//! matched hooks until the action's effects are done, when
//! [`Execution::execute_after`] runs their after-commands.

use super::command::{CommandRunner, DuctRunner, ShellCommand};
use super::matcher::match_hooks;
use actionhooks_core::{ActionHook, Error, HookConfigProvider, Phase, Result};
use std::fmt;
use std::sync::Arc;

/// Environment variable carrying the context the action was triggered from
pub const ENV_CONTEXT: &str = "ACTION_HOOK_CONTEXT";
/// Environment variable carrying the action's key label
pub const ENV_KEY: &str = "ACTION_HOOK_KEY";
/// Environment variable carrying `"before"` or `"after"`
pub const ENV_PHASE: &str = "ACTION_HOOK_PHASE";

/// Matches and runs action hooks
///
/// Cheap to clone; clones share the configuration provider and runner.
#[derive(Clone)]
pub struct HookManager {
    config: Arc<dyn HookConfigProvider>,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for HookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookManager")
            .field("hooks", &self.config.action_hooks().len())
            .finish_non_exhaustive()
    }
}

impl HookManager {
    /// Create a manager reading hooks from `config` and running them with `runner`
    pub fn new(config: Arc<dyn HookConfigProvider>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Create a manager that runs hooks through the platform shell
    pub fn with_shell(config: Arc<dyn HookConfigProvider>) -> Self {
        Self::new(config, Arc::new(DuctRunner))
    }

    /// Hooks that apply to the action `key` in `context`, in configuration order
    #[must_use]
    pub fn match_hooks(&self, context: &str, key: &str) -> Vec<ActionHook> {
        match_hooks(&self.config.action_hooks(), context, key)
    }

    /// Run the before-commands of every matching hook
    ///
    /// Returns `Ok(None)` when nothing matches; the caller has nothing further
    /// to coordinate. On a failed or aborting before-command no execution is
    /// produced and the action must not proceed.
    #[tracing::instrument(skip(self))]
    pub fn execute_before(&self, context: &str, key: &str) -> Result<Option<Execution>> {
        let hooks = self.match_hooks(context, key);
        if hooks.is_empty() {
            tracing::trace!("No action hooks matched");
            return Ok(None);
        }

        tracing::debug!(hook_count = hooks.len(), "Running before hooks");
        self.run_commands(&hooks, Phase::Before, context, key)?;

        Ok(Some(Execution {
            manager: self.clone(),
            hooks,
            context: context.to_string(),
            key: key.to_string(),
        }))
    }

    /// Run the `phase` command of each hook in order, stopping at the first
    /// failure or abort
    fn run_commands(
        &self,
        hooks: &[ActionHook],
        phase: Phase,
        context: &str,
        key: &str,
    ) -> Result<()> {
        let functions_file = self.config.shell_functions_file();

        for (index, hook) in hooks.iter().enumerate() {
            let Some(command) = hook.command(phase) else {
                continue;
            };

            let mut shell = ShellCommand::new_shell(command, functions_file.as_deref());
            if !hook.log_output {
                shell = shell.dont_log();
            }
            let shell = shell.add_env_vars([
                (ENV_CONTEXT, context),
                (ENV_KEY, key),
                (ENV_PHASE, phase.name()),
            ]);

            let start = std::time::Instant::now();
            match self.runner.run_with_output(&shell) {
                Ok(_) => {
                    tracing::debug!(
                        %phase,
                        index,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Action hook completed"
                    );
                }
                Err(failure) => {
                    tracing::error!(
                        %phase,
                        index,
                        elapsed_ms = start.elapsed().as_millis(),
                        error = %failure,
                        "Action hook failed"
                    );
                    let output = failure.output.trim();
                    return Err(if output.is_empty() {
                        Error::hook_source(phase, failure.source)
                    } else {
                        Error::hook_output(phase, output)
                    });
                }
            }

            if hook.abort_on_success {
                let error = Error::abort(&hook.abort_message);
                tracing::info!(%phase, index, "Action aborted by hook: {error}");
                return Err(error);
            }
        }

        Ok(())
    }
}

/// Hooks whose before-commands have run and whose after-commands are still owed
///
/// Never empty: an action with no matching hooks gets no execution at all.
#[derive(Debug)]
pub struct Execution {
    manager: HookManager,
    hooks: Vec<ActionHook>,
    context: String,
    key: String,
}

impl Execution {
    /// Run the after-commands of every matched hook, in match order
    #[tracing::instrument(skip(self), fields(context = %self.context, key = %self.key))]
    pub fn execute_after(&self) -> Result<()> {
        tracing::debug!(hook_count = self.hooks.len(), "Running after hooks");
        self.manager
            .run_commands(&self.hooks, Phase::After, &self.context, &self.key)
    }

    /// The matched hooks
    #[must_use]
    pub fn hooks(&self) -> &[ActionHook] {
        &self.hooks
    }

    /// Context the action was triggered from
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Key label of the action
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}
