//! Platform detection for shell invocation
//!
//! Hook commands are handed to the platform shell as a single string:
//! - Unix → `bash -c <command>`
//! - Windows → `cmd /C <command>`
//!
//! Platform info is cached on first access.

use std::sync::LazyLock;

/// Current platform information (cached)
///
/// # Example
/// ```
/// use actionhooks_core::platform::CURRENT_PLATFORM;
///
/// let argv = [CURRENT_PLATFORM.shell, CURRENT_PLATFORM.shell_arg, "echo hi"];
/// assert_eq!(argv.len(), 3);
/// ```
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::detect);

/// Platform information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// OS: "darwin" (macOS), "linux", "windows", "unknown"
    pub os: &'static str,
    /// Shell program used to run hook commands
    pub shell: &'static str,
    /// Argument telling `shell` to run the following string
    pub shell_arg: &'static str,
    /// Prepended before sourcing a shell functions file so aliases defined there expand
    pub functions_file_prefix: &'static str,
}

impl Platform {
    /// Detect the platform this binary was built for
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self {
                os: Self::detect_os(),
                shell: "cmd",
                shell_arg: "/C",
                functions_file_prefix: "",
            }
        } else {
            Self {
                os: Self::detect_os(),
                shell: "bash",
                shell_arg: "-c",
                functions_file_prefix: "shopt -s expand_aliases\n",
            }
        }
    }

    const fn detect_os() -> &'static str {
        #[cfg(target_os = "macos")]
        {
            "darwin"
        }

        #[cfg(target_os = "linux")]
        {
            "linux"
        }

        #[cfg(target_os = "windows")]
        {
            "windows"
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            "unknown"
        }
    }
}
