//! Ticker symbols and prices as they travel on the wire.
//!
//! Both are single whitespace-free tokens. Tickers are case-sensitive keys for
//! the cache and the storage; prices are kept verbatim and never parsed as
//! numbers, so `"123.450"` and `"123.45"` are different prices.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PriceError;

fn validate_token(kind: &str, raw: &str) -> Result<String, PriceError> {
    if raw.is_empty() {
        return Err(PriceError::Protocol(format!("empty {kind}")));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(PriceError::Protocol(format!(
            "{kind} must not contain whitespace: {raw:?}"
        )));
    }
    Ok(raw.to_string())
}

/// Identifier of a tradable instrument, e.g. `PETR4` or `AAPL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Borrow the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_token("ticker", s).map(Ticker)
    }
}

impl TryFrom<String> for Ticker {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price text exactly as produced by the external source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(String);

impl Price {
    /// Borrow the price text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_token("price", s).map(Price)
    }
}

impl TryFrom<String> for Price {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
