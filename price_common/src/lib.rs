//!
//! Common types and utilities shared by the request server, the persistence tier
//! and the client.
//!
//! This crate aggregates:
//! - `error` — unified error type `PriceError` used across the workspace.
//! - `result` — handy `Result<T, PriceError>` alias.
//! - `ticker` — `Ticker` and `Price` tokens carried on the wire.
//! - `command` — the tagged command type decoded once per protocol line.
//! - `reply` — fixed reply lines and sentinels of the line protocol.
//! - `codec` — newline-framed text stream over TCP.
//! - `net` — networking constants and small helpers.
//! - `logging` — `env_logger` setup shared by the binaries.
#![warn(missing_docs)]
pub mod codec;
pub mod command;
pub mod error;
pub mod logging;
pub mod net;
pub mod reply;
pub mod result;
pub mod ticker;

pub use codec::LineStream;
pub use command::{Command, Verb};
pub use error::PriceError;
pub use result::Result;
pub use ticker::{Price, Ticker};
