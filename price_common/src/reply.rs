//! Fixed reply lines of the line protocol.
//!
//! The request server answers `PRICE` with either a price or
//! [`PRICE_UNAVAILABLE`], and every history listing (from either tier) is closed
//! by [`END_HISTORY`]. The persistence tier acknowledges saves with
//! [`PRICE_SAVED`] and answers an empty `FETCH` with [`DATA_NOT_FOUND`].

/// Reply to `PRICE` when no tier could produce a quote.
pub const PRICE_UNAVAILABLE: &str = "price unavailable";
/// Reply to any line that does not decode to a supported command.
pub const INVALID_COMMAND: &str = "invalid command";
/// Acknowledgement of `SAVE`.
pub const PRICE_SAVED: &str = "PRICE_SAVED";
/// Reply to `FETCH` when the ticker has no stored price.
pub const DATA_NOT_FOUND: &str = "DATA_NOT_FOUND";
/// Terminal line of every history listing.
pub const END_HISTORY: &str = "END_HISTORY";
/// Data line sent by the request server when the persistence tier cannot be read.
pub const HISTORY_UNAVAILABLE: &str = "history unavailable";

/// Maximum number of records returned by a `HISTORY` listing.
pub const HISTORY_LIMIT: usize = 10;
/// Separator between ticker and price in a `FETCH` reply.
pub const FETCH_SEPARATOR: &str = ", ";
/// Separator between timestamp and price in a history line.
pub const HISTORY_SEPARATOR: &str = ": ";
