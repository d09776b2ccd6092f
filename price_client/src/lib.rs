//! Thin client of the price request server.
//!
//! Opens one connection and exchanges protocol lines over it; see
//! [`sender::PriceClient`].
#![warn(missing_docs)]
pub mod sender;

pub use sender::PriceClient;
