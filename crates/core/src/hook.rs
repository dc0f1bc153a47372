//! Action hook definitions
//!
//! An [`ActionHook`] ties a pair of shell commands to a user action, identified
//! by the context (UI location) it was triggered from and its key label.

use crate::phase::Phase;
use serde::{Deserialize, Serialize};

/// A single user-configured action hook
///
/// ```toml
/// [[actionHooks]]
/// context = "files"
/// key = "c"
/// before = "make lint"
/// after = "notify-send committed"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHook {
    /// Context the action must be triggered from (empty = any context)
    #[serde(default)]
    pub context: String,

    /// Key label identifying the action
    #[serde(default)]
    pub key: String,

    /// Command to run before the action (empty = none)
    #[serde(default)]
    pub before: String,

    /// Command to run once the action's effects have completed (empty = none)
    #[serde(default)]
    pub after: String,

    /// Log the command and its output instead of running silently
    #[serde(default)]
    pub log_output: bool,

    /// Stop the remaining hooks (and the action) once this hook's command succeeds
    #[serde(default)]
    pub abort_on_success: bool,

    /// Message reported when `abort_on_success` fires
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub abort_message: String,
}

impl ActionHook {
    /// The trimmed command for `phase`, or `None` when the hook has nothing to run there
    #[must_use]
    pub fn command(&self, phase: Phase) -> Option<&str> {
        let command = match phase {
            Phase::Before => self.before.trim(),
            Phase::After => self.after.trim(),
        };
        (!command.is_empty()).then_some(command)
    }

    /// Whether this hook has neither a before nor an after command
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.command(Phase::Before).is_none() && self.command(Phase::After).is_none()
    }
}
