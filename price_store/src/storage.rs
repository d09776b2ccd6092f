//! Storage collaborators behind the persistence tier.
//!
//! The tier only needs three operations (append a timestamped price, read the
//! newest price, list the newest N prices) so they are expressed as the
//! [`PriceStorage`] trait. Two implementations are provided:
//!
//! - [`MemoryStorage`] — a mutex-guarded map of per-ticker append-only vectors.
//! - [`FileStorage`] — a JSON-lines journal replayed into a `MemoryStorage` on
//!   open, so stored prices survive restarts of the tier.
//!
//! Implementations do their own locking; the tier calls them concurrently from
//! every connection worker without further serialization.
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{info, warn};
use price_common::reply::HISTORY_SEPARATOR;
use price_common::{Price, PriceError, Result, Ticker};
use serde::{Deserialize, Serialize};

/// Wire format of history timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored price observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Instrument the price belongs to.
    pub ticker: Ticker,
    /// Price text as saved.
    pub price: Price,
    /// Moment the tier stored the price.
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Render as a history line: `<timestamp>: <price>`.
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            HISTORY_SEPARATOR,
            self.price
        )
    }
}

/// Storage operations required by the persistence tier.
pub trait PriceStorage: Send + Sync {
    /// Append `price` for `ticker`, stamped with the current time.
    fn insert(&self, ticker: &Ticker, price: &Price) -> Result<()>;

    /// Most recently stored price of `ticker`.
    fn latest(&self, ticker: &Ticker) -> Result<Option<(Ticker, Price)>>;

    /// Up to `limit` records of `ticker`, newest first.
    fn recent(&self, ticker: &Ticker, limit: usize) -> Result<Vec<HistoryRecord>>;
}

/// In-memory storage. Records of a ticker are kept in insertion order.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<Ticker, Vec<HistoryRecord>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: HistoryRecord) -> Result<()> {
        let mut records = self.records.lock()?;
        records.entry(record.ticker.clone()).or_default().push(record);
        Ok(())
    }

    /// Stamp and append under one lock, so insertion order is timestamp order.
    fn stamp(&self, ticker: &Ticker, price: &Price) -> Result<HistoryRecord> {
        let mut records = self.records.lock()?;
        let record = HistoryRecord {
            ticker: ticker.clone(),
            price: price.clone(),
            timestamp: Utc::now(),
        };
        records.entry(ticker.clone()).or_default().push(record.clone());
        Ok(record)
    }
}

impl PriceStorage for MemoryStorage {
    fn insert(&self, ticker: &Ticker, price: &Price) -> Result<()> {
        self.stamp(ticker, price).map(|_| ())
    }

    fn latest(&self, ticker: &Ticker) -> Result<Option<(Ticker, Price)>> {
        let records = self.records.lock()?;
        Ok(records
            .get(ticker)
            .and_then(|history| history.last())
            .map(|record| (record.ticker.clone(), record.price.clone())))
    }

    fn recent(&self, ticker: &Ticker, limit: usize) -> Result<Vec<HistoryRecord>> {
        let records = self.records.lock()?;
        Ok(records
            .get(ticker)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Append-only JSON-lines journal with an in-memory index.
pub struct FileStorage {
    path: PathBuf,
    journal: Mutex<File>,
    index: MemoryStorage,
}

impl FileStorage {
    /// Open (or create) the journal at `path` and replay it.
    ///
    /// Lines that fail to decode are skipped with a warning so a torn final
    /// write does not prevent the tier from starting.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let index = MemoryStorage::new();
        let mut replayed = 0usize;

        let mut needs_newline = false;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            needs_newline = !contents.is_empty() && !contents.ends_with('\n');
            for (number, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<HistoryRecord>(line) {
                    Ok(record) => {
                        index.push(record)?;
                        replayed += 1;
                    }
                    Err(e) => warn!(
                        "Skipping unreadable journal line {} in {}: {}",
                        number + 1,
                        path.display(),
                        e
                    ),
                }
            }
        }

        let mut journal = OpenOptions::new().create(true).append(true).open(&path)?;
        if needs_newline {
            // Terminate a torn final record so the next append starts a fresh line.
            journal.write_all(b"\n")?;
        }
        info!("Opened journal {} ({} records)", path.display(), replayed);
        Ok(Self {
            path,
            journal: Mutex::new(journal),
            index,
        })
    }

    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceStorage for FileStorage {
    fn insert(&self, ticker: &Ticker, price: &Price) -> Result<()> {
        // The journal lock spans stamping, the write and the index push, so the
        // journal and the index agree on order.
        let mut journal = self.journal.lock()?;
        let record = HistoryRecord {
            ticker: ticker.clone(),
            price: price.clone(),
            timestamp: Utc::now(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        let written = journal.write_all(&line).and_then(|()| journal.flush());
        written.map_err(|e| PriceError::Storage(format!("journal write failed: {e}")))?;
        self.index.push(record)
    }

    fn latest(&self, ticker: &Ticker) -> Result<Option<(Ticker, Price)>> {
        self.index.latest(ticker)
    }

    fn recent(&self, ticker: &Ticker, limit: usize) -> Result<Vec<HistoryRecord>> {
        self.index.recent(ticker, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::thread;

    fn ticker(s: &str) -> Ticker {
        s.parse().unwrap()
    }

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn latest_is_last_inserted() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.latest(&ticker("ITUB4")).unwrap(), None);

        storage.insert(&ticker("ITUB4"), &price("30.10")).unwrap();
        storage.insert(&ticker("ITUB4"), &price("30.25")).unwrap();
        storage.insert(&ticker("BBAS3"), &price("55.00")).unwrap();

        assert_eq!(
            storage.latest(&ticker("ITUB4")).unwrap(),
            Some((ticker("ITUB4"), price("30.25")))
        );
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let storage = MemoryStorage::new();
        for i in 0..12 {
            storage.insert(&ticker("WEGE3"), &price(&format!("{i}.0"))).unwrap();
        }
        let recent = storage.recent(&ticker("WEGE3"), 10).unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].price, price("11.0"));
        assert_eq!(recent[9].price, price("2.0"));
        assert!(storage.recent(&ticker("NONE"), 10).unwrap().is_empty());
    }

    fn assert_newest_first(records: &[HistoryRecord]) {
        let inversions = records
            .windows(2)
            .filter(|pair| pair[0].timestamp < pair[1].timestamp)
            .count();
        assert_eq!(inversions, 0);
    }

    fn hammer(storage: Arc<dyn PriceStorage>, threads: usize, per_thread: usize) {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        storage
                            .insert(&ticker("RENT3"), &price(&format!("{t}.{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn concurrent_inserts_stay_newest_first() {
        let storage = Arc::new(MemoryStorage::new());
        hammer(storage.clone(), 8, 2000);

        let recent = storage.recent(&ticker("RENT3"), usize::MAX).unwrap();
        assert_eq!(recent.len(), 16000);
        assert_newest_first(&recent);
    }

    #[test]
    fn concurrent_file_inserts_replay_in_the_same_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.jsonl");
        let storage = Arc::new(FileStorage::open(&path).unwrap());
        hammer(storage.clone(), 4, 300);
        let before = storage.recent(&ticker("RENT3"), usize::MAX).unwrap();
        drop(storage);

        let after = FileStorage::open(&path)
            .unwrap()
            .recent(&ticker("RENT3"), usize::MAX)
            .unwrap();
        assert_newest_first(&before);
        assert_eq!(before, after);
    }

    #[test]
    fn history_line_format() {
        let record = HistoryRecord {
            ticker: ticker("ABEV3"),
            price: price("12.34"),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 17, 14, 3, 9).unwrap(),
        };
        assert_eq!(record.to_line(), "2024-05-17 14:03:09: 12.34");
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.jsonl");
        {
            let storage = FileStorage::open(&path).unwrap();
            storage.insert(&ticker("MGLU3"), &price("2.10")).unwrap();
            storage.insert(&ticker("MGLU3"), &price("2.15")).unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.latest(&ticker("MGLU3")).unwrap(),
            Some((ticker("MGLU3"), price("2.15")))
        );
        assert_eq!(reopened.recent(&ticker("MGLU3"), 10).unwrap().len(), 2);
    }

    #[test]
    fn file_storage_skips_torn_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.jsonl");
        {
            let storage = FileStorage::open(&path).unwrap();
            storage.insert(&ticker("B3SA3"), &price("11.11")).unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"ticker\":\"B3SA3\",\"pri").unwrap();
        drop(file);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.recent(&ticker("B3SA3"), 10).unwrap().len(), 1);
        reopened.insert(&ticker("B3SA3"), &price("11.20")).unwrap();
        drop(reopened);

        let again = FileStorage::open(&path).unwrap();
        let recent = again.recent(&ticker("B3SA3"), 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].price, price("11.20"));
        assert_eq!(again.path(), path.as_path());
    }
}
