//! Cache-aside price resolution.
//!
//! `PRICE <ticker>` is answered from the first tier that has a price:
//!
//! 1. the shared [`PriceCache`];
//! 2. the persistence tier (`FETCH`), only when `consult_store` is enabled; a hit
//!    is copied into the cache;
//! 3. the external [`QuoteSource`]; a hit is copied into the cache and queued for
//!    write-back to the persistence tier.
//!
//! Every failure below the cache is logged and ends as [`Resolution::Unavailable`];
//! nothing is retried. Concurrent misses on the same ticker are not deduplicated,
//! each worker resolves on its own and the last `put` wins.
use std::sync::Arc;

use log::{debug, info, warn};
use price_common::reply::PRICE_UNAVAILABLE;
use price_common::{Price, Ticker};

use crate::cache::PriceCache;
use crate::quote_source::QuoteSource;
use crate::store_client::StoreClient;
use crate::write_back::WriteBack;

/// Where a resolved price came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the cache without further I/O.
    Cached(Price),
    /// Read back from the persistence tier.
    Stored(Price),
    /// Fetched from the external source.
    Fetched(Price),
    /// No tier produced a price.
    Unavailable,
}

impl Resolution {
    /// Reply line sent to the client.
    pub fn reply_line(&self) -> &str {
        match self {
            Resolution::Cached(price) | Resolution::Stored(price) | Resolution::Fetched(price) => {
                price.as_str()
            }
            Resolution::Unavailable => PRICE_UNAVAILABLE,
        }
    }
}

/// Resolves prices through cache, persistence tier and external source.
pub struct PriceResolver {
    cache: Arc<dyn PriceCache>,
    source: Arc<dyn QuoteSource>,
    store: StoreClient,
    write_back: WriteBack,
    consult_store: bool,
}

impl PriceResolver {
    /// Assemble a resolver. `write_back` should target the same tier as `store`.
    pub fn new(
        cache: Arc<dyn PriceCache>,
        source: Arc<dyn QuoteSource>,
        store: StoreClient,
        write_back: WriteBack,
        consult_store: bool,
    ) -> Self {
        Self {
            cache,
            source,
            store,
            write_back,
            consult_store,
        }
    }

    /// Persistence tier client, shared with the history relay.
    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Resolve the current price of `ticker`.
    pub fn resolve(&self, ticker: &Ticker) -> Resolution {
        if let Some(price) = self.cache.get(ticker) {
            debug!("Cache hit for {}", ticker);
            return Resolution::Cached(price);
        }

        if self.consult_store {
            match self.store.fetch(ticker) {
                Ok(Some(price)) => {
                    debug!("Persistence tier hit for {}", ticker);
                    self.cache.put(ticker, &price);
                    return Resolution::Stored(price);
                }
                Ok(None) => debug!("Persistence tier has no price for {}", ticker),
                Err(e) => warn!("Persistence tier lookup for {} failed: {}", ticker, e),
            }
        }

        match self.source.current_price(ticker) {
            Ok(Some(price)) => {
                info!("Fetched {} = {} from quote source", ticker, price);
                self.cache.put(ticker, &price);
                self.write_back.submit(ticker, &price);
                Resolution::Fetched(price)
            }
            Ok(None) => {
                warn!("Quote source has no usable price for {}", ticker);
                Resolution::Unavailable
            }
            Err(e) => {
                warn!("Quote source failed for {}: {}", ticker, e);
                Resolution::Unavailable
            }
        }
    }
}
