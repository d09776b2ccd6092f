//! External price source consulted on cache misses.
//!
//! The request server only needs "current price of a ticker, or nothing", so the
//! source hides behind [`QuoteSource`]. [`HttpQuoteSource`] calls a quote API
//! that answers `GET <base_url><ticker>?token=<token>` with a document shaped like
//! `{"results": [{"regularMarketPrice": 37.12, ...}]}`; [`extract_price`] turns
//! that document into an `Option<Price>` and is the only place that knows its
//! shape.
use std::time::Duration;

use log::{debug, warn};
use price_common::{Price, PriceError, Result, Ticker};
use serde::Deserialize;
use serde_json::Value;

/// Source of fresh quotes.
pub trait QuoteSource: Send + Sync {
    /// Current price of `ticker`.
    ///
    /// `Ok(None)` means the source answered but had no usable quote; transport
    /// failures are `Err(PriceError::UpstreamUnavailable)`.
    fn current_price(&self, ticker: &Ticker) -> Result<Option<Price>>;
}

#[derive(Debug, Deserialize)]
struct QuoteDocument {
    #[serde(default)]
    results: Vec<QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<Value>,
}

/// Pull the current price out of a quote document.
///
/// Only the first entry of `results` is considered. Its `regularMarketPrice` may
/// be a JSON number or a string; any other shape yields `None`.
pub fn extract_price(body: &str) -> Option<Price> {
    let document: QuoteDocument = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(e) => {
            debug!("Quote document did not decode: {}", e);
            return None;
        }
    };
    let raw = match document.results.into_iter().next()?.regular_market_price? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    raw.parse().ok()
}

/// Blocking HTTP client for the quote API.
pub struct HttpQuoteSource {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl HttpQuoteSource {
    /// Build a client for `base_url`; `timeout` bounds every request.
    pub fn new(base_url: &str, token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(limit) = timeout {
            builder = builder.timeout(limit).connect_timeout(limit);
        }
        let client = builder
            .build()
            .map_err(|e| PriceError::UpstreamUnavailable(format!("HTTP client setup: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    fn quote_url(&self, ticker: &Ticker) -> String {
        format!("{}{}", self.base_url, ticker)
    }
}

impl QuoteSource for HttpQuoteSource {
    fn current_price(&self, ticker: &Ticker) -> Result<Option<Price>> {
        let mut request = self.client.get(self.quote_url(ticker));
        if !self.token.is_empty() {
            request = request.query(&[("token", self.token.as_str())]);
        }
        let response = request
            .send()
            .map_err(|e| PriceError::UpstreamUnavailable(format!("quote request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Quote API answered {} for {}", status, ticker);
            return Err(PriceError::UpstreamUnavailable(format!(
                "quote API status {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| PriceError::UpstreamUnavailable(format!("quote body unreadable: {e}")))?;
        Ok(extract_price(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn numeric_price_is_kept_as_text() {
        let body = r#"{"results":[{"symbol":"PETR4","regularMarketPrice":37.12}]}"#;
        assert_eq!(extract_price(body), Some("37.12".parse().unwrap()));
    }

    #[test]
    fn string_price_is_accepted() {
        let body = r#"{"results":[{"regularMarketPrice":"123.45"}]}"#;
        assert_eq!(extract_price(body), Some("123.45".parse().unwrap()));
    }

    #[test]
    fn only_first_entry_counts() {
        let body = r#"{"results":[{"symbol":"A"},{"regularMarketPrice":1.5}]}"#;
        assert_eq!(extract_price(body), None);
    }

    #[test]
    fn unusable_shapes_are_none() {
        for body in [
            "",
            "not json",
            "{}",
            r#"{"results":[]}"#,
            r#"{"results":[{"regularMarketPrice":null}]}"#,
            r#"{"results":[{"regularMarketPrice":{"raw":1}}]}"#,
            r#"{"results":[{"regularMarketPrice":""}]}"#,
            r#"{"results":"oops"}"#,
        ] {
            assert_eq!(extract_price(body), None, "{body}");
        }
    }

    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/quote/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header.trim().is_empty() {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request_line
        });
        (base_url, handle)
    }

    #[test]
    fn http_source_requests_ticker_with_token() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"results":[{"regularMarketPrice":12.5}]}"#,
        );
        let source = HttpQuoteSource::new(&base_url, "secret", Some(Duration::from_secs(5))).unwrap();

        let price = source.current_price(&"ITSA4".parse().unwrap()).unwrap();
        assert_eq!(price, Some("12.5".parse().unwrap()));
        assert!(server.join().unwrap().starts_with("GET /quote/ITSA4?token=secret "));
    }

    #[test]
    fn http_error_status_is_upstream_unavailable() {
        let (base_url, server) = serve_once("HTTP/1.1 404 Not Found", "{}");
        let source = HttpQuoteSource::new(&base_url, "", Some(Duration::from_secs(5))).unwrap();

        let err = source.current_price(&"NOPE".parse().unwrap()).unwrap_err();
        assert!(matches!(err, PriceError::UpstreamUnavailable(_)));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_api_is_upstream_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let source = HttpQuoteSource::new(&base_url, "", Some(Duration::from_secs(2))).unwrap();

        let err = source.current_price(&"X".parse().unwrap()).unwrap_err();
        assert!(matches!(err, PriceError::UpstreamUnavailable(_)));
    }
}
