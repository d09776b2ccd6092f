//! Command-line arguments for the request server.
//!
//! Every flag can also come from the environment, which keeps the API token out
//! of the process list.
use clap::Parser;
use price_common::net::{DEFAULT_IO_TIMEOUT_SECS, timeout_from_secs};
use price_server::ServerConfig;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Client-facing price request server", long_about = None)]
pub struct Args {
    /// Address to listen on for clients.
    #[clap(long, env = "PRICE_SERVER_BIND", default_value = "0.0.0.0:7070")]
    pub bind: String,

    /// Address of the persistence tier.
    #[clap(long, env = "PRICE_STORE_ADDR", default_value = "127.0.0.1:7071")]
    pub store_addr: String,

    /// Quote API prefix; the ticker is appended to it.
    #[clap(long, env = "PRICE_API_BASE_URL", default_value = "https://brapi.dev/api/quote/")]
    pub api_base_url: String,

    /// Quote API token.
    #[clap(long, env = "PRICE_API_TOKEN", default_value = "", hide_env_values = true)]
    pub api_token: String,

    /// Timeout in seconds for persistence tier and quote API calls (0 disables).
    #[clap(long, env = "PRICE_IO_TIMEOUT_SECS", default_value_t = DEFAULT_IO_TIMEOUT_SECS)]
    pub io_timeout_secs: u64,

    /// Close client connections idle for this many seconds (0 keeps them open).
    #[clap(long, env = "PRICE_IDLE_TIMEOUT_SECS", default_value_t = 0)]
    pub idle_timeout_secs: u64,

    /// Ask the persistence tier for a stored price before calling the quote API.
    #[clap(long, env = "PRICE_CONSULT_STORE")]
    pub consult_store: bool,
}

impl Args {
    /// Convert parsed arguments into the library configuration.
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            store_addr: self.store_addr,
            api_base_url: self.api_base_url,
            api_token: self.api_token,
            io_timeout: timeout_from_secs(self.io_timeout_secs),
            idle_timeout: timeout_from_secs(self.idle_timeout_secs),
            consult_store: self.consult_store,
        }
    }
}
