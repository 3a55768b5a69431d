//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error (also: no project given and no default set)
pub const USAGE: i32 = 64;

/// Data format error
pub const DATAERR: i32 = 65;

/// Project or remote resource not found
pub const NOINPUT: i32 = 66;

/// Remote service failed or unreachable
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Not logged in or session rejected
pub const NOPERM: i32 = 77;

/// Configuration error
pub const CONFIG: i32 = 78;
