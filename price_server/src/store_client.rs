//! Client side of the persistence tier protocol.
//!
//! Each call opens a short-lived connection, sends one command and reads its
//! reply, so a wedged tier connection never outlives a single request.
use std::time::Duration;

use log::debug;
use price_common::reply::{DATA_NOT_FOUND, END_HISTORY, FETCH_SEPARATOR, PRICE_SAVED};
use price_common::{Command, LineStream, Price, PriceError, Result, Ticker};

/// Address and timeout of the persistence tier.
#[derive(Debug, Clone)]
pub struct StoreClient {
    addr: String,
    timeout: Option<Duration>,
}

impl StoreClient {
    /// Create a client for the tier listening on `addr`.
    pub fn new(addr: &str, timeout: Option<Duration>) -> Self {
        Self {
            addr: addr.to_string(),
            timeout,
        }
    }

    /// Tier address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn connect(&self) -> Result<LineStream> {
        LineStream::connect(&self.addr, self.timeout).map_err(|e| {
            PriceError::UpstreamUnavailable(format!("persistence tier {}: {}", self.addr, e))
        })
    }

    /// Send `SAVE <ticker> <price>` and expect `PRICE_SAVED`.
    pub fn save(&self, ticker: &Ticker, price: &Price) -> Result<()> {
        let mut conn = self.connect()?;
        let command = Command::Save(ticker.clone(), price.clone());
        let reply = conn.request(&command.to_string())?;
        if reply == PRICE_SAVED {
            debug!("Persistence tier stored {} = {}", ticker, price);
            Ok(())
        } else {
            Err(PriceError::UpstreamUnavailable(format!(
                "unexpected SAVE reply: {reply:?}"
            )))
        }
    }

    /// Send `FETCH <ticker>`; `None` when the tier has nothing stored.
    pub fn fetch(&self, ticker: &Ticker) -> Result<Option<Price>> {
        let mut conn = self.connect()?;
        let reply = conn.request(&Command::Fetch(ticker.clone()).to_string())?;
        if reply == DATA_NOT_FOUND {
            return Ok(None);
        }
        let (_, price) = reply.split_once(FETCH_SEPARATOR).ok_or_else(|| {
            PriceError::UpstreamUnavailable(format!("unexpected FETCH reply: {reply:?}"))
        })?;
        Ok(Some(price.parse()?))
    }

    /// Send `HISTORY <ticker>` and collect the data lines before `END_HISTORY`.
    ///
    /// A tier that closes the connection before the sentinel is an error, so a
    /// truncated listing is never mistaken for a complete one.
    pub fn history(&self, ticker: &Ticker) -> Result<Vec<String>> {
        let mut conn = self.connect()?;
        conn.write_line(&Command::History(ticker.clone()).to_string())?;

        let mut lines = Vec::new();
        loop {
            match conn.read_line()? {
                Some(line) if line == END_HISTORY => return Ok(lines),
                Some(line) => lines.push(line),
                None => {
                    return Err(PriceError::UpstreamUnavailable(
                        "history listing ended without END_HISTORY".to_string(),
                    ));
                }
            }
        }
    }
}
