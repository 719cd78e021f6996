//! Shared constants.

/// Default FTP control port.
pub const DEFAULT_FTP_PORT: u16 = 21;
