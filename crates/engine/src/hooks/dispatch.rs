//! Running an action between its hooks
//!
//! [`ActionDispatcher`] wires a [`HookManager`] to a [`CompletionCoordinator`]
//! for the common case: run the before-hooks, perform the action, and let the
//! coordinator decide when the after-hooks run.

use super::coordinator::CompletionCoordinator;
use super::manager::HookManager;
use actionhooks_core::Error;

/// Dispatches user actions with their before/after hooks
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    manager: HookManager,
    coordinator: CompletionCoordinator,
}

impl ActionDispatcher {
    /// Create a dispatcher over `manager`, sharing `coordinator` with the rest of the session
    pub fn new(manager: HookManager, coordinator: CompletionCoordinator) -> Self {
        Self {
            manager,
            coordinator,
        }
    }

    /// The hook manager
    #[must_use]
    pub fn manager(&self) -> &HookManager {
        &self.manager
    }

    /// The session's completion coordinator
    #[must_use]
    pub fn coordinator(&self) -> &CompletionCoordinator {
        &self.coordinator
    }

    /// Run `action` for the key `key` pressed in `context`
    ///
    /// 1. Before-hooks run; a failure or abort is returned and `action` never runs.
    /// 2. The resulting execution is tracked by the coordinator.
    /// 3. `action` runs. It may register completions for work it defers.
    /// 4. On error the execution is aborted; on success it is finalized, which
    ///    runs the after-hooks now unless deferred work is still outstanding.
    #[tracing::instrument(skip(self, action))]
    pub fn dispatch<T, E, F>(&self, context: &str, key: &str, action: F) -> Result<T, E>
    where
        F: FnOnce(&CompletionCoordinator) -> Result<T, E>,
        E: From<Error>,
    {
        let execution = self.manager.execute_before(context, key)?;
        self.coordinator.start(execution);

        match action(&self.coordinator) {
            Ok(value) => {
                self.coordinator.finalize()?;
                Ok(value)
            }
            Err(err) => {
                self.coordinator.abort();
                Err(err)
            }
        }
    }
}
