//! XDG directory utilities
//!
//! `XDG_CONFIG_HOME` defaults to ~/.config

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Get the actionhooks config directory
///
/// Returns `$XDG_CONFIG_HOME/actionhooks` or `~/.config/actionhooks`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("actionhooks").get_config_home()
}

/// Get the default config file path
///
/// Returns `$XDG_CONFIG_HOME/actionhooks/config.toml`
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_config_dir_contains_prefix() {
        let dir = config_dir();
        assert!(
            dir.is_some(),
            "config_dir should return Some in normal environment"
        );

        let path = dir.unwrap();
        assert!(
            path.to_string_lossy().contains("actionhooks"),
            "config_dir path should contain 'actionhooks': {path:?}"
        );
    }

    #[test]
    fn test_default_config_file_ends_with_config_toml() {
        let path = default_config_file().unwrap();
        assert!(path.ends_with("actionhooks/config.toml"), "{path:?}");
        assert_eq!(path.parent().map(PathBuf::from), config_dir());
    }
}
