//! Shell command primitive
//!
//! Hook commands are free-form shell snippets. [`ShellCommand`] describes one
//! invocation (script, extra environment, whether to log) and a
//! [`CommandRunner`] executes it. The production runner is [`DuctRunner`];
//! tests substitute a recording fake.

use actionhooks_core::platform::CURRENT_PLATFORM;
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;

/// A shell invocation of a raw command string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    script: String,
    env: IndexMap<String, String>,
    log: bool,
}

impl ShellCommand {
    /// Build a shell invocation of `command`
    ///
    /// When `functions_file` is set, it is sourced first so hook commands can
    /// call the functions and aliases it defines.
    #[must_use]
    pub fn new_shell(command: &str, functions_file: Option<&Path>) -> Self {
        let script = match functions_file {
            Some(file) => format!(
                "{}source {}\n{}",
                CURRENT_PLATFORM.functions_file_prefix,
                shell_words::quote(&file.to_string_lossy()),
                command
            ),
            None => command.to_string(),
        };

        Self {
            script,
            env: IndexMap::new(),
            log: true,
        }
    }

    /// Run without logging the command or its output
    #[must_use]
    pub fn dont_log(mut self) -> Self {
        self.log = false;
        self
    }

    /// Attach environment variable assignments (on top of the inherited environment)
    #[must_use]
    pub fn add_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether the command and its output should be logged
    #[must_use]
    pub fn should_log(&self) -> bool {
        self.log
    }

    /// The script handed to the shell
    #[must_use]
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Extra environment variables, in insertion order
    #[must_use]
    pub fn env_vars(&self) -> &IndexMap<String, String> {
        &self.env
    }

    /// Build the duct expression for this invocation
    ///
    /// Combined stdout+stderr is captured and non-zero exit codes are reported
    /// through the returned status rather than as an error.
    #[must_use]
    pub fn to_expression(&self) -> duct::Expression {
        let mut expression = duct::cmd(
            CURRENT_PLATFORM.shell,
            [CURRENT_PLATFORM.shell_arg, self.script.as_str()],
        );
        for (key, value) in &self.env {
            expression = expression.env(key, value);
        }
        expression.stderr_to_stdout().stdout_capture().unchecked()
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            CURRENT_PLATFORM.shell,
            CURRENT_PLATFORM.shell_arg,
            shell_words::quote(&self.script)
        )
    }
}

/// A command that could not be started or exited unsuccessfully
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct RunFailure {
    /// Combined output captured before the failure (empty if it never started)
    pub output: String,
    /// Underlying error
    #[source]
    pub source: std::io::Error,
}

/// Executes shell commands synchronously
///
/// Implementations must tolerate concurrent, independent invocations.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion and return its combined output
    ///
    /// # Errors
    ///
    /// Returns [`RunFailure`] if the command could not be started or exited
    /// with a non-zero status.
    fn run_with_output(&self, command: &ShellCommand) -> Result<String, RunFailure>;
}

/// Runs commands through the platform shell using duct
#[derive(Debug, Clone, Copy, Default)]
pub struct DuctRunner;

impl CommandRunner for DuctRunner {
    fn run_with_output(&self, command: &ShellCommand) -> Result<String, RunFailure> {
        if command.should_log() {
            tracing::info!("{command}");
        } else {
            tracing::trace!("{command}");
        }

        let output = command.to_expression().run().map_err(|source| RunFailure {
            output: String::new(),
            source,
        })?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        if command.should_log() && !text.trim().is_empty() {
            tracing::info!("{}", text.trim_end());
        }

        if output.status.success() {
            Ok(text)
        } else {
            Err(RunFailure {
                output: text,
                source: std::io::Error::other(format!("command exited with {}", output.status)),
            })
        }
    }
}
