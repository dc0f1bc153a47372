//! Core behavioral traits for actionhooks components
//!
//! The engine only needs to read hook definitions; it does not care whether they
//! come from a TOML file, a reloadable store, or a test fixture.

use crate::hook::ActionHook;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration provider interface
///
/// Queried on every match, so implementations that support reloading hand out
/// the current hooks each time.
///
/// # Examples
///
/// ```ignore
/// fn count_hooks(config: &dyn HookConfigProvider) -> usize {
///     config.action_hooks().len()
/// }
/// ```
pub trait HookConfigProvider: Send + Sync {
    /// Configured hooks, in configuration order
    fn action_hooks(&self) -> Arc<[ActionHook]>;

    /// File sourced before every hook command, if configured
    fn shell_functions_file(&self) -> Option<PathBuf>;
}
