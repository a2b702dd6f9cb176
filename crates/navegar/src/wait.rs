//! Bounded blocking waits.
//!
//! All synchronization in the engine is a blocking poll loop with a ceiling:
//! element presence/absence, URL change, title change. There is no async
//! runtime in the core; "waiting" means polling the live session at an
//! interval until the condition holds or the timeout expires.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::driver::{lock, DriverHandle};
use crate::result::{NavegarError, NavegarResult};

/// Default timeout for bounded waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default timeout for post-click URL change waits (15 seconds)
pub const URL_CHANGE_TIMEOUT_MS: u64 = 15_000;

/// Options for bounded wait operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Short timeout, tight polling (unit tests)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            timeout_ms: 100,
            poll_interval_ms: 10,
        }
    }

    /// Defaults for post-click URL change waits (slow redirects)
    #[must_use]
    pub const fn for_url_change() -> Self {
        Self {
            timeout_ms: URL_CHANGE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll a fallible predicate until it returns true or the wait expires.
///
/// The predicate is checked at least once, so a zero timeout still observes
/// the current state. Driver errors propagate out of the loop immediately;
/// expiry maps to [`NavegarError::Timeout`].
pub fn poll_until<F>(options: &WaitOptions, mut predicate: F) -> NavegarResult<Duration>
where
    F: FnMut() -> NavegarResult<bool>,
{
    let start = Instant::now();
    loop {
        if predicate()? {
            return Ok(start.elapsed());
        }
        if start.elapsed() >= options.timeout() {
            return Err(NavegarError::Timeout {
                ms: options.timeout_ms,
            });
        }
        std::thread::sleep(options.poll_interval());
    }
}

/// Matcher for expected URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Any => true,
        }
    }
}

/// Wait for the session URL to leave `previous`, or to match `expected`
/// when an explicit redirect target is known.
///
/// Returns the URL observed when the wait completed.
pub fn wait_for_url_change(
    driver: &DriverHandle,
    previous: &str,
    expected: Option<&UrlPattern>,
    options: &WaitOptions,
) -> NavegarResult<String> {
    let mut current = String::new();
    poll_until(options, || {
        current = lock(driver).current_url()?;
        Ok(match expected {
            Some(pattern) => pattern.matches(&current),
            None => current != previous,
        })
    })?;
    tracing::debug!(from = previous, to = %current, "url changed");
    Ok(current)
}
