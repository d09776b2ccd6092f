//! Runtime settings of the request server.
use std::time::Duration;

use price_common::net::{DEFAULT_IO_TIMEOUT_SECS, REQUEST_PORT, STORE_PORT, addr};

/// Everything needed to wire a [`RequestServer`](crate::server::RequestServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Client-facing listen address.
    pub bind: String,
    /// Address of the persistence tier.
    pub store_addr: String,
    /// Quote API prefix; the ticker is appended to it.
    pub api_base_url: String,
    /// Quote API token, sent as the `token` query parameter when non-empty.
    pub api_token: String,
    /// Bound on connect/read/write to the persistence tier and on quote API calls.
    pub io_timeout: Option<Duration>,
    /// Drop client connections idle for longer than this.
    pub idle_timeout: Option<Duration>,
    /// Ask the persistence tier before the quote API on a cache miss.
    pub consult_store: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: addr("0.0.0.0", REQUEST_PORT),
            store_addr: addr("127.0.0.1", STORE_PORT),
            api_base_url: "https://brapi.dev/api/quote/".to_string(),
            api_token: String::new(),
            io_timeout: Some(Duration::from_secs(DEFAULT_IO_TIMEOUT_SECS)),
            idle_timeout: None,
            consult_store: false,
        }
    }
}
