//! CLI command implementations
//!
//! Every command returns a process exit code: 0 on success, 2 for a
//! configuration problem and 5 for anything fatal.

pub mod init;
pub mod migrate;
pub mod serve;
pub mod validate;

/// Exit code for a missing, unreadable or invalid configuration
pub const EXIT_CONFIG: i32 = 2;

/// Exit code for runtime failures
pub const EXIT_FATAL: i32 = 5;
