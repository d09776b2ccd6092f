//! Shared ticker → price cache of the request server.
//!
//! The cache is the fast path of price resolution and is touched by every
//! connection worker, so implementations must be safe to share. There is no
//! eviction and no expiry: an entry is only ever overwritten by a later `put`.
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use price_common::{Price, Ticker};

/// Concurrent price cache. Lookups never fail; an unknown ticker is `None`.
pub trait PriceCache: Send + Sync {
    /// Cached price of `ticker`, if any.
    fn get(&self, ticker: &Ticker) -> Option<Price>;

    /// Store `price` for `ticker`, replacing any previous entry.
    fn put(&self, ticker: &Ticker, price: &Price);
}

/// `RwLock`-guarded map.
///
/// A writer that panics while holding the lock cannot leave a torn entry (the
/// map only ever sees whole `insert` calls), so a poisoned lock is recovered
/// instead of surfaced.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<Ticker, Price>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached tickers.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceCache for MemoryCache {
    fn get(&self, ticker: &Ticker) -> Option<Price> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ticker)
            .cloned()
    }

    fn put(&self, ticker: &Ticker, price: &Price) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ticker.clone(), price.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ticker(s: &str) -> Ticker {
        s.parse().unwrap()
    }

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn get_returns_last_put() {
        let cache = MemoryCache::new();
        cache.put(&ticker("AAPL"), &price("189.10"));
        assert_eq!(cache.get(&ticker("AAPL")), Some(price("189.10")));

        cache.put(&ticker("AAPL"), &price("190.00"));
        assert_eq!(cache.get(&ticker("AAPL")), Some(price("190.00")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_ticker_is_absent() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&ticker("MSFT")), None);
        cache.put(&ticker("MSFT"), &price("1"));
        assert_eq!(cache.get(&ticker("msft")), None);
    }

    #[test]
    fn concurrent_writers_leave_a_whole_entry() {
        let cache = Arc::new(MemoryCache::new());
        let written: Vec<Price> = (0..8).map(|i| price(&format!("{i}.{i}{i}"))).collect();

        let handles: Vec<_> = written
            .iter()
            .cloned()
            .map(|p| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        cache.put(&ticker("NVDA"), &p);
                        let seen = cache.get(&ticker("NVDA")).unwrap();
                        assert!(seen.as_str().len() == 4);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = cache.get(&ticker("NVDA")).unwrap();
        assert!(written.contains(&last));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(&ticker("IBM"), &price("150"));

        let poisoner = Arc::clone(&cache);
        let _ = thread::spawn(move || {
            let guard = poisoner.entries.write().unwrap();
            if !guard.is_empty() {
                panic!("poison the cache lock");
            }
        })
        .join();

        assert_eq!(cache.get(&ticker("IBM")), Some(price("150")));
        cache.put(&ticker("IBM"), &price("151"));
        assert_eq!(cache.get(&ticker("IBM")), Some(price("151")));
    }
}
