//! TCP front of the persistence tier.
//!
//! Every accepted connection gets its own thread running a line loop:
//! read a line, decode it into a [`Command`], call the storage, write the reply.
//! The loop ends only on EOF or a socket error; the tier has no quit command.
//!
//! Storage failures never reach the wire. A failed `SAVE` is still acknowledged
//! with `PRICE_SAVED`, a failed `FETCH` reads as `DATA_NOT_FOUND` and a failed
//! `HISTORY` is an empty listing. They are only visible in the log.
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};
use price_common::reply::{
    DATA_NOT_FOUND, END_HISTORY, FETCH_SEPARATOR, HISTORY_LIMIT, INVALID_COMMAND, PRICE_SAVED,
};
use price_common::{Command, LineStream, Price, PriceError, Result, Ticker};

use crate::storage::PriceStorage;

/// Persistence tier server bound to a listening socket.
pub struct StoreServer {
    listener: TcpListener,
    storage: Arc<dyn PriceStorage>,
}

impl StoreServer {
    /// Bind the tier to `bind_addr` (e.g., `0.0.0.0:7071`).
    pub fn bind(bind_addr: &str, storage: Arc<dyn PriceStorage>) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        info!("Persistence tier bound to {}", listener.local_addr()?);
        Ok(Self { listener, storage })
    }

    /// Address actually bound, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Blocking accept loop. A failed accept is fatal to the tier and returned.
    pub fn run(self) -> Result<()> {
        info!("Persistence tier accepting on {}", self.listener.local_addr()?);
        loop {
            let (stream, addr) = self.listener.accept().map_err(|e| {
                error!("Failed to accept connection: {}", e);
                e
            })?;
            let storage = Arc::clone(&self.storage);
            thread::spawn(move || {
                debug!("Worker started for {}", addr);
                if let Err(e) = handle_connection(stream, storage.as_ref()) {
                    warn!("Connection {} ended with error: {}", addr, e);
                }
                debug!("Worker finished for {}", addr);
            });
        }
    }
}

fn handle_connection(stream: TcpStream, storage: &dyn PriceStorage) -> Result<()> {
    let mut conn = LineStream::new(stream)?;
    let peer = conn.peer_addr()?;
    info!("Store connection from {}", peer);

    loop {
        let line = match conn.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(PriceError::LineTooLong(limit)) => {
                warn!("Discarded a line over {} bytes from {}", limit, peer);
                conn.write_line(INVALID_COMMAND)?;
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!("{} -> {:?}", peer, line);
        let command = Command::parse(&line);
        for reply in dispatch(command, storage) {
            conn.write_line(&reply)?;
        }
    }
    info!("Store connection {} closed", peer);
    Ok(())
}

/// Execute one decoded command against the storage and return the reply lines.
pub fn dispatch(command: Command, storage: &dyn PriceStorage) -> Vec<String> {
    match command {
        Command::Save(ticker, price) => vec![save(storage, &ticker, &price)],
        Command::Fetch(ticker) => vec![fetch(storage, &ticker)],
        Command::History(ticker) => history(storage, &ticker),
        Command::Price(_) | Command::Quit | Command::Invalid(_) => {
            debug!("Unsupported line on persistence tier: {}", command);
            vec![INVALID_COMMAND.to_string()]
        }
    }
}

fn save(storage: &dyn PriceStorage, ticker: &Ticker, price: &Price) -> String {
    match storage.insert(ticker, price) {
        Ok(()) => info!("Saved {} = {}", ticker, price),
        Err(e) => error!("Failed to save {} = {}: {}", ticker, price, e),
    }
    PRICE_SAVED.to_string()
}

fn fetch(storage: &dyn PriceStorage, ticker: &Ticker) -> String {
    match storage.latest(ticker) {
        Ok(Some((ticker, price))) => format!("{}{}{}", ticker, FETCH_SEPARATOR, price),
        Ok(None) => DATA_NOT_FOUND.to_string(),
        Err(e) => {
            error!("Failed to fetch {}: {}", ticker, e);
            DATA_NOT_FOUND.to_string()
        }
    }
}

fn history(storage: &dyn PriceStorage, ticker: &Ticker) -> Vec<String> {
    let mut lines: Vec<String> = match storage.recent(ticker, HISTORY_LIMIT) {
        Ok(records) => {
            if records.is_empty() {
                info!("No history stored for {}", ticker);
            }
            records.iter().map(|record| record.to_line()).collect()
        }
        Err(e) => {
            error!("Failed to read history of {}: {}", ticker, e);
            Vec::new()
        }
    };
    lines.push(END_HISTORY.to_string());
    lines
}
