//! Before/after hooks around user actions
//!
//! ## Execution Model
//!
//! - Before-hooks run eagerly and synchronously; the action must not start
//!   until they have finished
//! - After-hooks are deferred until the action's effects have completed, which
//!   may happen on the calling thread, on workers, or never (aborted actions)
//! - Within a phase, hooks run in configuration order and the first failure or
//!   abort stops the rest
//!
//! ## Module Organization
//!
//! - `command`: Shell invocation and the runner that executes it
//! - `matcher`: Selecting the hooks that apply to an action
//! - `manager`: Running before-hooks and producing executions
//! - `coordinator`: Deciding when an execution's after-hooks run
//! - `dispatch`: Running an action between its hooks

pub mod command;
pub mod coordinator;
pub mod dispatch;
pub mod manager;
pub mod matcher;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use command::{CommandRunner, DuctRunner, RunFailure, ShellCommand};
pub use coordinator::{CompletionCoordinator, CompletionToken};
pub use dispatch::ActionDispatcher;
pub use manager::{ENV_CONTEXT, ENV_KEY, ENV_PHASE, Execution, HookManager};
pub use matcher::match_hooks;
