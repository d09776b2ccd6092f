//! Price Client — sends `PRICE`/`HISTORY` requests over one connection to the
//! request server and prints the replies to stdout.
//!
//! Usage example (CLI):
//! ```bash
//! price_client --server 127.0.0.1:7070 price PETR4 VALE3
//! price_client history PETR4
//! ```
#![warn(missing_docs)]
mod args;

use std::time::Duration;

use clap::Parser;
use price_client::PriceClient;
use price_common::{Result, Ticker, logging};

use crate::args::{Args, Request};

/// Read timeout for replies; a price lookup may wait on the quote API.
const REPLY_TIMEOUT_SECS: u64 = 30;

fn main() -> Result<()> {
    logging::init_logger();
    let args = Args::parse();
    let mut client = PriceClient::connect(&args.server, Some(Duration::from_secs(REPLY_TIMEOUT_SECS)))?;

    match args.request {
        Request::Price { tickers } => {
            for raw in tickers {
                let ticker: Ticker = raw.parse()?;
                let reply = client.price(&ticker)?;
                println!("{}: {}", ticker, reply);
            }
        }
        Request::History { ticker } => {
            let ticker: Ticker = ticker.parse()?;
            let lines = client.history(&ticker)?;
            if lines.is_empty() {
                println!("No history for {}", ticker);
            }
            for line in lines {
                println!("{}", line);
            }
        }
    }
    client.quit()
}
