//! Logger setup shared by every binary.
//!
//! All three tiers log through the `log` facade into `env_logger` with an `Info`
//! default; `RUST_LOG` overrides it with the usual directive syntax.
use env_logger::Builder;
use log::LevelFilter;

/// Level used when `RUST_LOG` is absent.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Builder with the default level, refined by `directives` (`RUST_LOG` syntax) if given.
pub fn configured(directives: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(DEFAULT_LEVEL);
    if let Some(directives) = directives {
        builder.parse_filters(directives);
    }
    builder
}

/// Install the global logger from `RUST_LOG`.
pub fn init_logger() {
    let directives = std::env::var("RUST_LOG").ok();
    configured(directives.as_deref()).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info() {
        assert_eq!(configured(None).build().filter(), LevelFilter::Info);
    }

    #[test]
    fn directives_override_default() {
        assert_eq!(configured(Some("debug")).build().filter(), LevelFilter::Debug);
        assert_eq!(configured(Some("warn")).build().filter(), LevelFilter::Warn);
    }
}
