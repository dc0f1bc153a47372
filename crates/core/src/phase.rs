//! Hook phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a hook runs: the command before the action or the one after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the action starts
    Before,
    /// After the action's effects have completed
    After,
}

impl Phase {
    /// Get the string name of this phase
    ///
    /// This is also the value exported to hook commands in `ACTION_HOOK_PHASE`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
