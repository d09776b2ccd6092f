//! Detached write-back of freshly fetched prices to the persistence tier.
//!
//! Workers hand `(ticker, price)` pairs to a background thread through a bounded
//! `crossbeam_channel` and reply to their client immediately; the thread forwards
//! each pair as a `SAVE` command. Failures are logged and dropped, never retried,
//! and so are saves submitted while the queue is full.
//! The thread exits once every [`WriteBack`] handle has been dropped and the
//! queue is drained.
use std::thread;

use crossbeam_channel::{Sender, TrySendError, bounded};
use log::{debug, error, warn};
use price_common::{Price, Ticker};

use crate::store_client::StoreClient;

/// Saves that may wait for the persistence tier before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// One pending save.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// Ticker to save.
    pub ticker: Ticker,
    /// Price to save.
    pub price: Price,
}

/// Handle used by connection workers to enqueue saves.
#[derive(Clone)]
pub struct WriteBack {
    tx: Sender<SaveRequest>,
}

impl WriteBack {
    /// Spawn the background writer bound to `store` with the default queue size.
    pub fn start(store: StoreClient) -> Self {
        Self::with_capacity(store, DEFAULT_QUEUE_CAPACITY)
    }

    /// Spawn the background writer with room for `capacity` pending saves.
    pub fn with_capacity(store: StoreClient, capacity: usize) -> Self {
        let (tx, rx) = bounded::<SaveRequest>(capacity);
        thread::spawn(move || {
            debug!("Write-back thread started for {}", store.addr());
            for request in rx.iter() {
                if let Err(e) = store.save(&request.ticker, &request.price) {
                    error!(
                        "Write-back of {} = {} failed: {}",
                        request.ticker, request.price, e
                    );
                }
            }
            debug!("Write-back thread stopping");
        });
        Self { tx }
    }

    /// Queue a save without waiting for the persistence tier.
    pub fn submit(&self, ticker: &Ticker, price: &Price) {
        let request = SaveRequest {
            ticker: ticker.clone(),
            price: price.clone(),
        };
        match self.tx.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => warn!(
                "Write-back queue full, dropping {} = {}",
                request.ticker, request.price
            ),
            Err(TrySendError::Disconnected(request)) => warn!(
                "Write-back queue closed, dropping {} = {}",
                request.ticker, request.price
            ),
        }
    }

    /// Saves queued but not yet taken by the writer thread.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}
