//! Client-facing TCP server.
//!
//! For every accepted connection a dedicated thread reads lines, decodes each
//! into a [`Command`] and dispatches it:
//!
//! - `PRICE <ticker>` → one line: the resolved price or `price unavailable`.
//! - `HISTORY <ticker>` → the persistence tier's listing relayed verbatim, closed
//!   by `END_HISTORY`.
//! - `SAIR` / `EXIT` → the session ends without a reply.
//! - anything else → `invalid command`, and the session continues.
//!
//! A socket error on one connection ends that connection only. The accept loop
//! stops (and returns the error) only if `accept` itself fails.
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use price_common::reply::{END_HISTORY, HISTORY_UNAVAILABLE, INVALID_COMMAND};
use price_common::{Command, LineStream, PriceError, Result, Ticker};

use crate::cache::{MemoryCache, PriceCache};
use crate::config::ServerConfig;
use crate::quote_source::{HttpQuoteSource, QuoteSource};
use crate::resolver::PriceResolver;
use crate::store_client::StoreClient;
use crate::write_back::WriteBack;

/// Request server bound to a listening socket.
pub struct RequestServer {
    listener: TcpListener,
    resolver: Arc<PriceResolver>,
    idle_timeout: Option<Duration>,
}

impl RequestServer {
    /// Bind with an explicit cache and quote source.
    pub fn bind(
        config: &ServerConfig,
        cache: Arc<dyn PriceCache>,
        source: Arc<dyn QuoteSource>,
    ) -> Result<Self> {
        let store = StoreClient::new(&config.store_addr, config.io_timeout);
        let write_back = WriteBack::start(store.clone());
        let resolver = PriceResolver::new(cache, source, store, write_back, config.consult_store);

        let listener = TcpListener::bind(&config.bind)?;
        info!(
            "Request server bound to {} (persistence tier at {})",
            listener.local_addr()?,
            config.store_addr
        );
        Ok(Self {
            listener,
            resolver: Arc::new(resolver),
            idle_timeout: config.idle_timeout,
        })
    }

    /// Bind with an in-memory cache and the HTTP quote source described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let source = HttpQuoteSource::new(&config.api_base_url, &config.api_token, config.io_timeout)?;
        Self::bind(config, Arc::new(MemoryCache::new()), Arc::new(source))
    }

    /// Address actually bound, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Blocking accept loop, one thread per connection.
    pub fn run(self) -> Result<()> {
        info!("Request server accepting on {}", self.listener.local_addr()?);
        loop {
            let (stream, addr) = self.listener.accept().map_err(|e| {
                error!("Failed to accept connection: {}", e);
                e
            })?;
            let resolver = Arc::clone(&self.resolver);
            let idle_timeout = self.idle_timeout;
            thread::spawn(move || {
                debug!("Worker started for {}", addr);
                if let Err(e) = handle_connection(stream, &resolver, idle_timeout) {
                    warn!("Connection {} ended with error: {}", addr, e);
                }
                debug!("Worker finished for {}", addr);
            });
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    resolver: &PriceResolver,
    idle_timeout: Option<Duration>,
) -> Result<()> {
    let mut conn = LineStream::new(stream)?;
    conn.set_timeout(idle_timeout)?;
    let peer = conn.peer_addr()?;
    info!("Client connected: {}", peer);

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
        match Command::parse(&line) {
            Command::Price(ticker) => {
                let resolution = resolver.resolve(&ticker);
                conn.write_line(resolution.reply_line())?;
            }
            Command::History(ticker) => relay_history(&mut conn, resolver, &ticker)?,
            Command::Quit => {
                info!("Client {} quit", peer);
                return Ok(());
            }
            command @ (Command::Save(..) | Command::Fetch(_) | Command::Invalid(_)) => {
                debug!("Rejected line from {}: {}", peer, command);
                conn.write_line(INVALID_COMMAND)?;
            }
        }
    }
    info!("Client {} disconnected", peer);
    Ok(())
}

fn relay_history(conn: &mut LineStream, resolver: &PriceResolver, ticker: &Ticker) -> Result<()> {
    match resolver.store().history(ticker) {
        Ok(lines) => {
            for line in &lines {
                conn.write_line(line)?;
            }
        }
        Err(e) => {
            warn!("History of {} unavailable: {}", ticker, e);
            conn.write_line(HISTORY_UNAVAILABLE)?;
        }
    }
    conn.write_line(END_HISTORY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_common::reply::PRICE_UNAVAILABLE;
    use price_common::Price;
    use price_common::codec::MAX_LINE_LEN;

    struct NoQuotes;

    impl QuoteSource for NoQuotes {
        fn current_price(&self, _ticker: &Ticker) -> Result<Option<Price>> {
            Err(PriceError::UpstreamUnavailable("offline".into()))
        }
    }

    fn unreachable_addr() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    }

    fn start(cache: Arc<MemoryCache>) -> String {
        let config = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            store_addr: unreachable_addr(),
            io_timeout: Some(Duration::from_millis(500)),
            ..ServerConfig::default()
        };
        let server = RequestServer::bind(&config, cache, Arc::new(NoQuotes)).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        thread::spawn(move || server.run());
        addr
    }

    fn connect(addr: &str) -> LineStream {
        LineStream::connect(addr, Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn malformed_line_keeps_session_usable() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(&"AAPL".parse().unwrap(), &"201.5".parse().unwrap());
        let addr = start(cache);
        let mut conn = connect(&addr);

        assert_eq!(conn.request("PRICE").unwrap(), INVALID_COMMAND);
        assert_eq!(conn.request("").unwrap(), INVALID_COMMAND);
        assert_eq!(conn.request("SAVE AAPL 1").unwrap(), INVALID_COMMAND);
        assert_eq!(conn.request("price AAPL").unwrap(), "201.5");
    }

    #[test]
    fn oversized_line_is_invalid_and_session_survives() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(&"AAPL".parse().unwrap(), &"201.5".parse().unwrap());
        let addr = start(cache);
        let mut conn = connect(&addr);

        let flood = format!("PRICE {}", "A".repeat(MAX_LINE_LEN * 4));
        assert_eq!(conn.request(&flood).unwrap(), INVALID_COMMAND);
        assert_eq!(conn.request("PRICE AAPL").unwrap(), "201.5");
    }

    #[test]
    fn upstream_failures_become_unavailable() {
        let addr = start(Arc::new(MemoryCache::new()));
        let mut conn = connect(&addr);

        assert_eq!(conn.request("PRICE MSFT").unwrap(), PRICE_UNAVAILABLE);
        conn.write_line("HISTORY MSFT").unwrap();
        assert_eq!(conn.read_line().unwrap().as_deref(), Some(HISTORY_UNAVAILABLE));
        assert_eq!(conn.read_line().unwrap().as_deref(), Some(END_HISTORY));
    }

    #[test]
    fn quit_closes_without_reply() {
        let addr = start(Arc::new(MemoryCache::new()));
        let mut conn = connect(&addr);

        conn.write_line("SAIR").unwrap();
        assert_eq!(conn.read_line().unwrap(), None);
    }

    #[test]
    fn one_dropped_client_does_not_affect_others() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(&"IBM".parse().unwrap(), &"150".parse().unwrap());
        let addr = start(cache);

        let dropped = connect(&addr);
        drop(dropped);

        let mut conn = connect(&addr);
        assert_eq!(conn.request("PRICE IBM").unwrap(), "150");
    }
}
