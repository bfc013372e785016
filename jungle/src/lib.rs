//! Versioned deployments side by side, switched with an atomic symlink.
//!
//! A jungle is a directory laid out as:
//!
//! ```text
//! <root>/
//!   release/<version>/...      one directory per deployed version
//!   current -> release/<ver>   relative symlink to the active version
//!   current.new                transient, only during a pointer swap
//!   jungle.toml                optional settings
//! ```
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (version grammar, retention plans).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (directory listing, the `current`
//!   pointer, config loading).
//!
//! [`Jungle`] ties the two together and is what the `jungle` binary calls.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod jungle;
pub mod logging;
pub mod prune;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::version::{ParseVersionError, Version};
pub use crate::error::{JungleError, Result};
pub use crate::io::config::JungleConfig;
pub use crate::jungle::{Jungle, Status};
pub use crate::prune::Retention;
