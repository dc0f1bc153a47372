//! Core types and utilities for actionhooks
//!
//! This is the foundation crate that all other actionhooks crates depend on.
//! It provides:
//! - Base error types
//! - Action hook definitions and phases
//! - Platform shell detection
//! - The configuration provider trait
//!
//! This crate has no dependencies on other actionhooks crates.

pub mod error;
pub mod hook;
pub mod phase;
pub mod platform;
pub mod traits;

pub use error::{DEFAULT_ABORT_MESSAGE, Error, Result};
pub use hook::ActionHook;
pub use phase::Phase;
pub use traits::HookConfigProvider;
