//! Console configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Command-line flags in the binary
//! override individual values after loading.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use reqwest::Url;

use crate::error::ConsoleError;

/// Backend used when `EVENTMASTER_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:50052";

/// Result cap appended as `limit` to every list search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// Period of the refresh loop, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

/// Top-level console configuration.
///
/// Loaded once at startup via [`ConsoleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the eventmaster API (e.g. `http://localhost:50052`).
    pub base_url: Url,

    /// Value of the `limit` parameter appended to list searches.
    pub search_limit: u32,

    /// Seconds between refresh loop ticks.
    pub refresh_interval_secs: u64,

    /// Initial state of the auto-refresh toggle.
    pub auto_refresh: bool,

    /// Per-request timeout in seconds (0 = HTTP client default).
    pub request_timeout_secs: u64,

    /// Offset from UTC, in minutes, used to read picker times and format
    /// event times.
    pub utc_offset_minutes: i32,

    /// Capacity of the [`crate::domain::EventBus`] broadcast channel.
    pub event_bus_capacity: usize,
}

impl ConsoleConfig {
    /// Configuration for `base_url` with every other setting at its default.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            search_limit: DEFAULT_SEARCH_LIMIT,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            auto_refresh: false,
            request_timeout_secs: 0,
            utc_offset_minutes: 0,
            event_bus_capacity: 1024,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is missing or invalid.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidUrl`] if `EVENTMASTER_URL` is set but
    /// is not an absolute URL.
    pub fn from_env() -> Result<Self, ConsoleError> {
        dotenvy::dotenv().ok();

        let raw = std::env::var("EVENTMASTER_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw)?;

        Ok(Self {
            base_url,
            search_limit: parse_env("CONSOLE_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT),
            refresh_interval_secs: parse_env(
                "CONSOLE_REFRESH_INTERVAL_SECS",
                DEFAULT_REFRESH_INTERVAL_SECS,
            ),
            auto_refresh: parse_env_bool("CONSOLE_AUTO_REFRESH", false),
            request_timeout_secs: parse_env("CONSOLE_REQUEST_TIMEOUT_SECS", 0),
            utc_offset_minutes: parse_env("CONSOLE_UTC_OFFSET_MINUTES", 0),
            event_bus_capacity: parse_env("CONSOLE_EVENT_BUS_CAPACITY", 1024),
        })
    }

    /// Refresh loop period. Never zero.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Request timeout, or `None` to keep the client default.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Display/input offset. Out-of-range values fall back to UTC.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }
}

/// Parses an absolute base URL.
///
/// # Errors
///
/// Returns [`ConsoleError::InvalidUrl`] if `raw` is not an absolute
/// `http`/`https` URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConsoleError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConsoleError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConsoleError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn defaults() -> ConsoleConfig {
        let Ok(url) = parse_base_url(DEFAULT_BASE_URL) else {
            panic!("default base url parses");
        };
        ConsoleConfig::new(url)
    }

    #[test]
    fn defaults_are_applied() {
        let config = defaults();
        assert_eq!(config.base_url.as_str(), "http://localhost:50052/");
        assert_eq!(config.search_limit, 100);
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert!(!config.auto_refresh);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(parse_base_url("http://events.internal:8080").is_ok());
        assert!(parse_base_url("ftp://events.internal").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = ConsoleConfig {
            refresh_interval_secs: 0,
            ..defaults()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn offset_is_converted_from_minutes() {
        let config = ConsoleConfig {
            utc_offset_minutes: -420,
            ..defaults()
        };
        assert_eq!(config.utc_offset().local_minus_utc(), -420 * 60);

        let bogus = ConsoleConfig {
            utc_offset_minutes: 100_000,
            ..defaults()
        };
        assert_eq!(bogus.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn missing_env_uses_default() {
        let value: u32 = parse_env("CONSOLE_TEST_SURELY_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
        assert!(parse_env_bool("CONSOLE_TEST_SURELY_UNSET_VARIABLE", true));
    }
}
