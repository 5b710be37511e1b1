//! Stable exit codes for `dry` commands.

/// Every task in the chain succeeded, or there was nothing to do.
pub const OK: i32 = 0;
/// A task failed; the first failure is printed to stderr.
pub const FAILED: i32 = 1;
