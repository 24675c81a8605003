//! Constants for the download module (timeouts, file naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes; icons are small).
pub const READ_TIMEOUT_SECS: u64 = 120;

/// Extension written for exported assets.
pub const DEFAULT_EXTENSION: &str = "svg";
