//! Shared networking constants and helpers used by every tier.
use std::time::Duration;

/// TCP port of the client-facing request server.
pub const REQUEST_PORT: u16 = 7070;
/// TCP port of the persistence tier.
pub const STORE_PORT: u16 = 7071;
/// Default connect/read/write timeout for calls between tiers.
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 5;

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Turns a seconds setting into an optional timeout, where `0` means "no timeout".
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
