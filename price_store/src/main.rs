//! Persistence tier binary.
//!
//! Wires the chosen storage backend to a [`StoreServer`] and runs its accept loop
//! until a fatal accept error.
//!
//! Usage example (CLI):
//! ```bash
//! price_store --bind 0.0.0.0:7071 --data-file ./prices.jsonl
//! ```
#![warn(missing_docs)]
mod args;

use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use price_common::{Result, logging};
use price_store::{FileStorage, MemoryStorage, PriceStorage, StoreServer};

use crate::args::Args;

fn main() -> Result<()> {
    logging::init_logger();
    let args = Args::parse();

    let storage: Arc<dyn PriceStorage> = match &args.data_file {
        Some(path) => Arc::new(FileStorage::open(path)?),
        None => {
            info!("No data file given, prices are kept in memory");
            Arc::new(MemoryStorage::new())
        }
    };

    let server = StoreServer::bind(&args.bind, storage)?;
    server.run().inspect_err(|e| error!("Persistence tier stopped: {}", e))
}
