//! Shared protocol command type used by every tier.
//!
//! A protocol line is `<VERB> <args...>` with space-separated fields. The verb is
//! matched case-insensitively and each verb takes a fixed number of arguments;
//! a line is decoded exactly once into a [`Command`] and dispatched with an
//! exhaustive `match`. Whatever does not fit becomes [`Command::Invalid`].
use std::fmt;

use strum_macros::{Display, EnumString};

use crate::ticker::{Price, Ticker};

/// Leading keyword of a protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    /// `PRICE <ticker>`, served by the request server.
    Price,
    /// `HISTORY <ticker>`, served by both tiers.
    History,
    /// `SAVE <ticker> <price>`, served by the persistence tier.
    Save,
    /// `FETCH <ticker>`, served by the persistence tier.
    Fetch,
    /// Terminal command of a client session.
    #[strum(to_string = "SAIR", serialize = "EXIT")]
    Quit,
}

/// One decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve the current price of a ticker.
    Price(Ticker),
    /// List the most recent stored prices of a ticker.
    History(Ticker),
    /// Store a freshly resolved price.
    Save(Ticker, Price),
    /// Read the most recent stored price.
    Fetch(Ticker),
    /// End the session without a reply.
    Quit,
    /// Anything else; keeps the raw line for logging.
    Invalid(String),
}

impl Command {
    /// Decode a single line (without its terminator).
    pub fn parse(line: &str) -> Command {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = tokens.split_first() else {
            return Command::Invalid(line.to_string());
        };
        let Ok(verb) = head.parse::<Verb>() else {
            return Command::Invalid(line.to_string());
        };

        let decoded = match (verb, args) {
            (Verb::Quit, []) => Some(Command::Quit),
            (Verb::Price, [ticker]) => ticker.parse().ok().map(Command::Price),
            (Verb::History, [ticker]) => ticker.parse().ok().map(Command::History),
            (Verb::Fetch, [ticker]) => ticker.parse().ok().map(Command::Fetch),
            (Verb::Save, [ticker, price]) => match (ticker.parse(), price.parse()) {
                (Ok(ticker), Ok(price)) => Some(Command::Save(ticker, price)),
                _ => None,
            },
            _ => None,
        };
        decoded.unwrap_or_else(|| Command::Invalid(line.to_string()))
    }
}

/// Wire encoding of a command, without the line terminator.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Price(ticker) => write!(f, "{} {}", Verb::Price, ticker),
            Command::History(ticker) => write!(f, "{} {}", Verb::History, ticker),
            Command::Save(ticker, price) => write!(f, "{} {} {}", Verb::Save, ticker, price),
            Command::Fetch(ticker) => write!(f, "{} {}", Verb::Fetch, ticker),
            Command::Quit => write!(f, "{}", Verb::Quit),
            Command::Invalid(raw) => f.write_str(raw),
        }
    }
}
