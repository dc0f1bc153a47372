//! Recording command runner for unit tests

use super::command::{CommandRunner, RunFailure, ShellCommand};
use std::fmt;
use std::sync::{Arc, Mutex};

type CallHook = Box<dyn Fn() + Send + Sync>;

/// Records every command instead of running it
///
/// Commands whose script contains a registered needle fail with the configured output.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<ShellCommand>>,
    failures: Mutex<Vec<(String, String)>>,
    on_call: Mutex<Option<CallHook>>,
}

impl fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl RecordingRunner {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make commands containing `needle` fail, printing `output`
    pub(crate) fn fail_on(&self, needle: &str, output: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((needle.to_string(), output.to_string()));
    }

    /// Invoke `hook` at the start of every later command
    pub(crate) fn on_call(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_call.lock().unwrap() = Some(Box::new(hook));
    }

    pub(crate) fn calls(&self) -> Vec<ShellCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn scripts(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.script().to_string())
            .collect()
    }

    pub(crate) fn count_containing(&self, needle: &str) -> usize {
        self.scripts().iter().filter(|s| s.contains(needle)).count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run_with_output(&self, command: &ShellCommand) -> Result<String, RunFailure> {
        if let Some(hook) = self.on_call.lock().unwrap().as_ref() {
            hook();
        }
        self.calls.lock().unwrap().push(command.clone());

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| command.script().contains(needle.as_str()))
            .map(|(_, output)| output.clone());

        match failure {
            Some(output) => Err(RunFailure {
                output,
                source: std::io::Error::other("exit status: 1"),
            }),
            None => Ok(String::new()),
        }
    }
}

/// Build a manager over `hooks` backed by a fresh [`RecordingRunner`]
pub(crate) fn manager_with(
    hooks: Vec<actionhooks_core::ActionHook>,
) -> (super::manager::HookManager, Arc<RecordingRunner>) {
    let config = actionhooks_config::Config {
        action_hooks: hooks,
        ..Default::default()
    };
    let runner = RecordingRunner::new();
    let store = actionhooks_config::ConfigStore::new(&config);
    let manager = super::manager::HookManager::new(Arc::new(store), runner.clone());
    (manager, runner)
}

pub(crate) fn hook(context: &str, key: &str, before: &str, after: &str) -> actionhooks_core::ActionHook {
    actionhooks_core::ActionHook {
        context: context.to_string(),
        key: key.to_string(),
        before: before.to_string(),
        after: after.to_string(),
        ..Default::default()
    }
}
