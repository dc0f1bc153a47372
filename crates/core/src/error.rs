//! Base error types for actionhooks
//!
//! This module provides the error types shared by every crate in the workspace.
//! A hook-requested abort is [`Error::Abort`], never [`Error::HookFailed`].

use crate::phase::Phase;
use thiserror::Error;

/// Message used when a hook aborts without configuring `abortMessage`
pub const DEFAULT_ABORT_MESSAGE: &str = "Action aborted by hook";

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// A before/after command exited unsuccessfully or could not be started
    #[error("action hook ({phase}) failed: {detail}")]
    HookFailed {
        /// Phase whose command failed
        phase: Phase,
        /// Trimmed command output, or the underlying error message when there was no output
        detail: String,
        /// Underlying execution error, present when no output was captured
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A hook succeeded with `abortOnSuccess` set and vetoed the rest of the action
    #[error("{message}")]
    Abort {
        /// Configured abort message or [`DEFAULT_ABORT_MESSAGE`]
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Build a [`Error::HookFailed`] from the captured output of a failed command
    pub fn hook_output(phase: Phase, output: impl Into<String>) -> Self {
        Error::HookFailed {
            phase,
            detail: output.into(),
            source: None,
        }
    }

    /// Build a [`Error::HookFailed`] wrapping the underlying execution error
    pub fn hook_source<E>(phase: Phase, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::HookFailed {
            phase,
            detail: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an [`Error::Abort`], falling back to the default message when `message` is blank
    pub fn abort(message: &str) -> Self {
        let message = message.trim();
        Error::Abort {
            message: if message.is_empty() {
                DEFAULT_ABORT_MESSAGE.to_string()
            } else {
                message.to_string()
            },
        }
    }

    /// Whether this error is a hook-requested abort rather than a failure
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
