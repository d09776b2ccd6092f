//! Persistence tier of the price service.
//!
//! Exposes stored prices over the line protocol:
//!
//! - `SAVE <ticker> <price>` → `PRICE_SAVED`
//! - `FETCH <ticker>` → `<ticker>, <price>` or `DATA_NOT_FOUND`
//! - `HISTORY <ticker>` → up to ten `<timestamp>: <price>` lines, newest first,
//!   then `END_HISTORY`
//!
//! - [`storage`](crate::storage) — the storage trait and its memory/journal backends.
//! - [`server`](crate::server) — accept loop and per-connection command dispatch.
#![warn(missing_docs)]

pub mod server;
pub mod storage;

pub use server::StoreServer;
pub use storage::{FileStorage, HistoryRecord, MemoryStorage, PriceStorage};
