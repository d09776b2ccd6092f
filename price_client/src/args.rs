//! Command-line arguments for the price client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Parser, Subcommand};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address of the request server.
    #[clap(long, env = "PRICE_SERVER_ADDR", default_value = "127.0.0.1:7070")]
    pub server: String,

    /// Request to send.
    #[command(subcommand)]
    pub request: Request,
}

/// Requests supported by the client.
#[derive(Debug, Subcommand)]
pub enum Request {
    /// Print the current price of one or more tickers.
    Price {
        /// Ticker symbols, case-sensitive.
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Print the most recent stored prices of a ticker, newest first.
    History {
        /// Ticker symbol, case-sensitive.
        ticker: String,
    },
}
