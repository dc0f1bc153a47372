//! Logging configuration for the actionhooks CLI
//!
//! Compact terminal output plus optional file logging using tracing.

use crate::Result;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default
const LOG_TARGETS: &[&str] = &[
    "actionhooks",
    "actionhooks_config",
    "actionhooks_core",
    "actionhooks_engine",
];

/// Set once this module has installed the global subscriber
static INITIALIZED: Mutex<bool> = Mutex::new(false);

/// Build the default directive string for `level`
fn default_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging
/// * `log_file` - Optional path to append debug logs to
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Write logs to file
/// init(true, Some(Path::new("hooks.log")))?;
/// ```
///
/// Calling it again after a subscriber has been installed (by this function or
/// by an embedding application) is a no-op.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let mut initialized = INITIALIZED.lock().unwrap_or_else(PoisonError::into_inner);
    if *initialized || tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let level = if verbose { "debug" } else { "info" };

    // Allows overriding with RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // No timestamps in normal mode
    let stdout_layer = if verbose {
        stdout_layer.with_filter(env_filter).boxed()
    } else {
        stdout_layer.without_time().with_filter(env_filter).boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(EnvFilter::new(default_directives("debug"))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| actionhooks_core::Error::Message(format!("Failed to initialize logging: {e}")))?;

    *initialized = true;
    Ok(())
}
