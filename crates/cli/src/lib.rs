//! actionhooks CLI library
//!
//! This library contains the CLI logic, kept separate from `main` so it can be
//! exercised by tests.

pub mod cmd;
pub mod error;

use actionhooks_config::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Version string with build metadata
static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let Some(rustc) = option_env!("VERGEN_RUSTC_SEMVER") {
        version.push_str(&format!("\nrustc: {rustc}"));
    }
    if let Some(timestamp) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        version.push_str(&format!("\nbuilt: {timestamp}"));
    }
    version
});

/// actionhooks - run shell commands before and after application actions
#[derive(Parser)]
#[command(name = "actionhooks")]
#[command(about = "Run user-configured hooks before and after an action")]
#[command(version, long_version = LONG_VERSION.as_str())]
pub struct Cli {
    /// Path to the config file
    #[arg(long, env = "ACTIONHOOKS_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "ACTIONHOOKS_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run an action between its before and after hooks
    Run {
        /// Context the action is triggered from (e.g. "files")
        #[arg(short, long)]
        context: String,

        /// Key label of the action (e.g. "c")
        #[arg(short, long)]
        key: String,

        /// Shell command performing the action; repeat to run several in parallel
        #[arg(short, long = "action", value_name = "CMD")]
        actions: Vec<String>,
    },

    /// List configured hooks
    List {
        /// Only show hooks that would run in this context
        #[arg(short, long, requires = "key")]
        context: Option<String>,

        /// Only show hooks that would run for this key
        #[arg(short, long, requires = "context")]
        key: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

/// Main entry point for the CLI
pub fn run(cli: Cli) -> Result<()> {
    actionhooks_config::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let config_path = cli
        .config
        .clone()
        .or_else(actionhooks_config::default_config_file);
    let config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            context,
            key,
            actions,
        } => cmd::run::run(&config, &context, &key, &actions),
        Commands::List { context, key, json } => {
            cmd::list::run(&config, context.as_deref().zip(key.as_deref()), json)
        }
        Commands::Check { strict } => cmd::check::run(&config, config_path.as_deref(), strict),
    }
}
