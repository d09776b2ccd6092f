//! Price request server binary.
//!
//! Usage example (CLI):
//! ```bash
//! PRICE_API_TOKEN=... price_server --bind 0.0.0.0:7070 --store-addr 127.0.0.1:7071
//! ```
#![warn(missing_docs)]
mod args;

use clap::Parser;
use log::error;
use price_common::{Result, logging};
use price_server::RequestServer;

use crate::args::Args;

fn main() -> Result<()> {
    logging::init_logger();
    let config = Args::parse().into_config();
    let server = RequestServer::from_config(&config)?;
    server.run().inspect_err(|e| error!("Request server stopped: {}", e))
}
