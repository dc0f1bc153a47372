//! Configuration management
//!
//! This module handles loading actionhooks configuration from TOML.
//!
//! ```toml
//! [os]
//! shellFunctionsFile = "~/.config/actionhooks/functions.sh"
//!
//! [[actionHooks]]
//! context = "files"
//! key = "c"
//! before = "make lint"
//! after = "echo committed"
//! ```

use crate::Result;
use actionhooks_core::{ActionHook, HookConfigProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Operating system integration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OsConfig {
    /// File of shell functions/aliases sourced before every hook command
    #[serde(
        default,
        rename = "shellFunctionsFile",
        skip_serializing_if = "Option::is_none"
    )]
    pub shell_functions_file: Option<PathBuf>,
}

/// actionhooks configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OS integration section
    #[serde(default)]
    pub os: OsConfig,

    /// Hooks in configuration order
    #[serde(default, rename = "actionHooks")]
    pub action_hooks: Vec<ActionHook>,
}

/// A non-fatal problem found while validating configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Zero-based position of the hook in `actionHooks`
    pub index: usize,
    /// What is wrong with it
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actionHooks[{}]: {}", self.index, self.message)
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// Relative paths in the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            actionhooks_core::Error::InvalidConfig {
                message: format!("Failed to read config file {}: {e}", path.display()),
            }
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&content, base_dir).map_err(|e| {
            actionhooks_core::Error::InvalidConfig {
                message: format!("Failed to parse config file {}: {e}", path.display()),
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            hooks = config.action_hooks.len(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Load configuration from TOML string
    ///
    /// Paths are resolved relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        Self::parse(toml_content, base_dir).map_err(|e| actionhooks_core::Error::InvalidConfig {
            message: format!("Failed to parse config TOML: {e}"),
        })
    }

    fn parse(toml_content: &str, base_dir: &Path) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_content)?;

        config.resolve_relative_paths(base_dir);

        for warning in config.validate() {
            tracing::warn!("{warning}");
        }

        Ok(config)
    }

    /// Load the configuration the CLI should use
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and an empty configuration otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the chosen file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match crate::dirs::default_config_file() {
            Some(path) if path.exists() => Self::load(path),
            other => {
                tracing::debug!(
                    path = ?other,
                    "No configuration file found, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Check hooks for mistakes that make them silently useless
    ///
    /// These are warnings, not errors: an inert hook is legal, it just never runs.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (index, hook) in self.action_hooks.iter().enumerate() {
            if hook.key.trim().is_empty() {
                warnings.push(ConfigWarning {
                    index,
                    message: "hook has no key and will never match".to_string(),
                });
            }

            if hook.is_inert() {
                warnings.push(ConfigWarning {
                    index,
                    message: "hook has neither 'before' nor 'after' command".to_string(),
                });
            }

            if !hook.abort_on_success && !hook.abort_message.trim().is_empty() {
                warnings.push(ConfigWarning {
                    index,
                    message: "'abortMessage' has no effect without 'abortOnSuccess'".to_string(),
                });
            }
        }

        warnings
    }

    /// Resolve relative paths in configuration
    ///
    /// Expands `~/` to the home directory and joins relative paths onto `base_dir`.
    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        if let Some(ref file) = self.os.shell_functions_file {
            self.os.shell_functions_file = Some(Self::resolve_path(file, base_dir));
        }
    }

    /// Resolve a single path: expand ~/ and resolve relative paths
    fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();

        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = ::dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~"
            && let Some(home) = ::dirs::home_dir()
        {
            return home;
        }

        if path.is_relative() {
            base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Snapshot handed out by [`ConfigStore`]
#[derive(Debug, Clone)]
struct Snapshot {
    hooks: Arc<[ActionHook]>,
    shell_functions_file: Option<PathBuf>,
}

impl From<&Config> for Snapshot {
    fn from(config: &Config) -> Self {
        Self {
            hooks: config.action_hooks.as_slice().into(),
            shell_functions_file: config.os.shell_functions_file.clone(),
        }
    }
}

/// Reloadable configuration shared between the application and the hook engine
///
/// The hook list is converted once per [`ConfigStore::replace`]; every match
/// then shares it by reference count. Every match reads the current snapshot, so [`ConfigStore::replace`] takes
/// effect on the next triggered action. Executions already created keep the
/// hooks they matched.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Snapshot>,
}

impl ConfigStore {
    /// Create a store holding `config`
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            current: RwLock::new(Snapshot::from(config)),
        }
    }

    /// Swap in a new configuration
    pub fn replace(&self, config: &Config) {
        let snapshot = Snapshot::from(config);
        tracing::debug!(hooks = snapshot.hooks.len(), "Configuration replaced");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Re-read configuration from `path` and swap it in
    ///
    /// On error the previous configuration stays active.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn reload(&self, path: &Path) -> Result<()> {
        let config = Config::load(path)?;
        self.replace(&config);
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HookConfigProvider for ConfigStore {
    fn action_hooks(&self) -> Arc<[ActionHook]> {
        self.snapshot().hooks
    }

    fn shell_functions_file(&self) -> Option<PathBuf> {
        self.snapshot().shell_functions_file
    }
}
