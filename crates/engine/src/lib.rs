//! # actionhooks engine
//!
//! Runs user-configured shell commands before and after application actions.
//!
//! - **Matching**: selecting hooks by context and key
//! - **Execution**: running before-hooks and carrying the after-obligation
//! - **Coordination**: firing after-hooks exactly once, when all of an action's
//!   deferred work has reported back
//!
//! ```ignore
//! let manager = HookManager::with_shell(Arc::new(ConfigStore::new(&config)));
//! let dispatcher = ActionDispatcher::new(manager, CompletionCoordinator::new());
//! dispatcher.dispatch("files", "c", |coordinator| commit(coordinator))?;
//! ```

pub mod hooks;

// Re-export error types from core
pub use actionhooks_core::{ActionHook, Error, Phase, Result};

// Re-export commonly used types
pub use hooks::{
    ActionDispatcher, CommandRunner, CompletionCoordinator, CompletionToken, DuctRunner,
    Execution, HookManager, ShellCommand,
};
