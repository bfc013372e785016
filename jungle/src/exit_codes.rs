//! Stable exit codes for jungle CLI commands.

/// Command succeeded, or help was requested.
pub const OK: i32 = 0;
/// A jungle operation failed (missing release, corrupt `current`, refused deletion, ...).
pub const FAILURE: i32 = 1;
/// Malformed invocation: unknown command or flag, wrong arguments, conflicting options.
pub const USAGE: i32 = 1;
