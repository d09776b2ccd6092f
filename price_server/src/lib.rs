//! # Price request server
//!
//! Client-facing tier of the price service. Clients speak a line protocol over
//! TCP (`PRICE <ticker>`, `HISTORY <ticker>`, `SAIR`); prices are resolved
//! cache-aside, first from an in-process cache, then (optionally) from the
//! persistence tier, and finally from an external quote API, with the fresh
//! price written back to the cache and, asynchronously, to the persistence tier.
//!
//! ## Modules
//!
//! - [`cache`](crate::cache) — concurrent ticker → price cache.
//! - [`quote_source`](crate::quote_source) — external quote API behind a trait.
//! - [`store_client`](crate::store_client) — client of the persistence tier protocol.
//! - [`write_back`](crate::write_back) — detached writer forwarding `SAVE`s.
//! - [`resolver`](crate::resolver) — cache-aside resolution of `PRICE`.
//! - [`server`](crate::server) — accept loop and per-connection dispatch.
//! - [`config`](crate::config) — runtime settings.
//!
//! ## Example
//!
//! ```no_run
//! use price_server::config::ServerConfig;
//! use price_server::server::RequestServer;
//!
//! fn main() -> price_common::Result<()> {
//!     let config = ServerConfig {
//!         store_addr: "127.0.0.1:7071".to_string(),
//!         ..ServerConfig::default()
//!     };
//!     RequestServer::from_config(&config)?.run()
//! }
//! ```
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod quote_source;
pub mod resolver;
pub mod server;
pub mod store_client;
pub mod write_back;

pub use cache::{MemoryCache, PriceCache};
pub use config::ServerConfig;
pub use quote_source::{HttpQuoteSource, QuoteSource};
pub use resolver::{PriceResolver, Resolution};
pub use server::RequestServer;
