//! Command-line arguments for the persistence tier.
use clap::Parser;
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Persistence tier of the price service", long_about = None)]
pub struct Args {
    /// Address to listen on.
    #[clap(long, env = "PRICE_STORE_BIND", default_value = "0.0.0.0:7071")]
    pub bind: String,

    /// JSON-lines journal to persist prices in. Prices are kept in memory only when absent.
    #[clap(long, env = "PRICE_STORE_DATA_FILE")]
    pub data_file: Option<PathBuf>,
}
