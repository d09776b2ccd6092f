//! Sending commands to the request server over TCP.
//!
//! A `PriceClient` keeps a single connection open for any number of requests
//! and ends the session with `SAIR`.
use std::time::Duration;

use log::{debug, info};
use price_common::reply::END_HISTORY;
use price_common::{Command, LineStream, PriceError, Result, Ticker};

/// Connected session with the request server.
pub struct PriceClient {
    conn: LineStream,
}

impl PriceClient {
    /// Connect to the request server at `addr`.
    pub fn connect(addr: &str, timeout: Option<Duration>) -> Result<Self> {
        let conn = LineStream::connect(addr, timeout)?;
        info!("Connected to request server {}", addr);
        Ok(Self { conn })
    }

    /// Ask for the current price; returns the reply line (a price or `price unavailable`).
    pub fn price(&mut self, ticker: &Ticker) -> Result<String> {
        let command = Command::Price(ticker.clone());
        debug!("Sending command: {}", command);
        self.conn.request(&command.to_string())
    }

    /// Ask for the price history; returns the data lines without `END_HISTORY`.
    pub fn history(&mut self, ticker: &Ticker) -> Result<Vec<String>> {
        let command = Command::History(ticker.clone());
        debug!("Sending command: {}", command);
        self.conn.write_line(&command.to_string())?;

        let mut lines = Vec::new();
        loop {
            match self.conn.read_line()? {
                Some(line) if line == END_HISTORY => return Ok(lines),
                Some(line) => lines.push(line),
                None => {
                    return Err(PriceError::Protocol(
                        "server closed the connection inside a history listing".to_string(),
                    ));
                }
            }
        }
    }

    /// End the session. The server closes the connection without replying.
    pub fn quit(mut self) -> Result<()> {
        self.conn.write_line(&Command::Quit.to_string())
    }
}
