//! Error types for CLI commands

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The action command itself failed
    #[error("Action '{command}' failed: {detail}")]
    ActionFailed {
        /// The action's shell command
        command: String,
        /// Trimmed output, or the exit status when there was none
        detail: String,
    },

    /// A worker running an action panicked
    #[error("Action '{command}' panicked")]
    ActionPanicked {
        /// The action's shell command
        command: String,
    },

    /// Validation found problems and `--strict` was given
    #[error("Configuration has {count} warning(s)")]
    StrictValidation {
        /// Number of warnings
        count: usize,
    },
}

/// The hook-requested abort message carried by `err`, if any
pub fn abort_message(err: &anyhow::Error) -> Option<&str> {
    match err.downcast_ref::<actionhooks_core::Error>() {
        Some(actionhooks_core::Error::Abort { message }) => Some(message),
        _ => None,
    }
}

/// Whether `err` came from resolving the after-hooks rather than from an action
pub fn is_after_hook_failure(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<actionhooks_core::Error>(),
        Some(actionhooks_core::Error::HookFailed {
            phase: actionhooks_core::Phase::After,
            ..
        })
    )
}
