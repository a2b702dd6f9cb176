//! Browser session contract.
//!
//! The [`Driver`] trait is the session handle the whole navigation chain
//! shares: every page object holds the same handle, and exactly one page
//! object (the current one) mutates it at a time. Operations are
//! synchronous and blocking; the engine never accesses a session
//! concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::locator::Locator;
use crate::result::NavegarResult;

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie is scoped to
    #[serde(default)]
    pub domain: Option<String>,
    /// Path the cookie is scoped to
    #[serde(default)]
    pub path: Option<String>,
    /// Whether the cookie is HTTPS-only
    #[serde(default)]
    pub secure: bool,
}

impl Cookie {
    /// Create a cookie with just a name and value
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            secure: false,
        }
    }
}

/// Console message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    /// Debug output
    Debug,
    /// Informational output
    Info,
    /// Warnings
    Warning,
    /// Errors
    Error,
}

/// One captured browser console message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleEntry {
    /// Severity
    pub level: ConsoleLevel,
    /// Message text
    pub text: String,
}

impl ConsoleEntry {
    /// Create a console entry
    #[must_use]
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Synchronous browser session operations consumed by the engine.
///
/// Presence queries answer `Ok(false)` for a cleanly absent element;
/// interactions against an element that cannot be found return
/// [`crate::NavegarError::ElementMissing`]. The post-click unhover move may
/// return [`crate::NavegarError::OutOfViewport`], the one condition callers
/// are allowed to retry.
pub trait Driver: Send {
    /// Navigate the session to a URL
    fn goto(&mut self, url: &str) -> NavegarResult<()>;

    /// Current browser URL
    fn current_url(&self) -> NavegarResult<String>;

    /// Current browser title
    fn title(&self) -> NavegarResult<String>;

    /// Whether the element is present and visible right now (no wait)
    fn is_present(&self, locator: &Locator) -> NavegarResult<bool>;

    /// Click an element
    fn click(&mut self, locator: &Locator) -> NavegarResult<()>;

    /// Hover over an element
    fn hover(&mut self, locator: &Locator) -> NavegarResult<()>;

    /// Type text into an element
    fn type_text(&mut self, locator: &Locator, text: &str) -> NavegarResult<()>;

    /// Clear an input element
    fn clear(&mut self, locator: &Locator) -> NavegarResult<()>;

    /// Read an input element's current value
    fn element_value(&self, locator: &Locator) -> NavegarResult<String>;

    /// Submit the form owning an element
    fn submit(&mut self, locator: &Locator) -> NavegarResult<()>;

    /// Scroll the viewport to an absolute position
    fn scroll_to(&mut self, x: i64, y: i64) -> NavegarResult<()>;

    /// Move the cursor by a relative offset (post-click unhover)
    fn move_cursor_by(&mut self, dx: i64, dy: i64) -> NavegarResult<()>;

    /// Evaluate a JavaScript expression in the page
    fn execute_script(&mut self, script: &str) -> NavegarResult<serde_json::Value>;

    /// All cookies visible to the session
    fn cookies(&self) -> NavegarResult<Vec<Cookie>>;

    /// Drain buffered console messages
    fn console_entries(&mut self) -> NavegarResult<Vec<ConsoleEntry>>;

    /// Snapshot of local storage for the current origin
    fn local_storage(&self) -> NavegarResult<HashMap<String, String>>;

    /// Snapshot of session storage for the current origin
    fn session_storage(&self) -> NavegarResult<HashMap<String, String>>;

    /// Capture a PNG screenshot of the viewport
    fn screenshot(&mut self) -> NavegarResult<Vec<u8>>;

    /// Terminate the browser session
    fn quit(&mut self) -> NavegarResult<()>;
}

/// Shared handle to the one browser session of a test
pub type DriverHandle = Arc<Mutex<dyn Driver>>;

/// Lock a driver handle, recovering from a poisoned lock.
///
/// The engine is single-threaded, so a poisoned lock can only mean a prior
/// panic mid-interaction; the session state is still the best diagnostic
/// we have, so hand it back rather than compounding the panic.
pub fn lock(handle: &DriverHandle) -> MutexGuard<'_, dyn Driver + 'static> {
    handle.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Scoped owner of a browser session.
///
/// One test owns one session for its entire duration. Dropping the session
/// quits the browser, so teardown happens whether the test passed, failed,
/// or unwound.
pub struct Session {
    driver: DriverHandle,
}

impl Session {
    /// Take ownership of a driver for the duration of a test
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self {
            driver: Arc::new(Mutex::new(driver)),
        }
    }

    /// Wrap an existing shared handle
    #[must_use]
    pub fn from_handle(driver: DriverHandle) -> Self {
        Self { driver }
    }

    /// The shared handle page objects are constructed with
    #[must_use]
    pub fn handle(&self) -> DriverHandle {
        Arc::clone(&self.driver)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = lock(&self.driver).quit() {
            tracing::warn!(error = %e, "browser session quit failed during teardown");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    mod cookie_tests {
        use super::*;

        #[test]
        fn test_cookie_new() {
            let cookie = Cookie::new("sid", "abc123");
            assert_eq!(cookie.name, "sid");
            assert_eq!(cookie.value, "abc123");
            assert!(!cookie.secure);
        }

        #[test]
        fn test_cookie_serde() {
            let json = serde_json::to_string(&Cookie::new("sid", "abc")).unwrap();
            let back: Cookie = serde_json::from_str(&json).unwrap();
            assert_eq!(back.name, "sid");
        }
    }

    mod console_tests {
        use super::*;

        #[test]
        fn test_console_entry() {
            let entry = ConsoleEntry::new(ConsoleLevel::Error, "boom");
            assert_eq!(entry.level, ConsoleLevel::Error);
            assert_eq!(entry.text, "boom");
        }

        #[test]
        fn test_level_serde_lowercase() {
            let json = serde_json::to_string(&ConsoleLevel::Warning).unwrap();
            assert_eq!(json, "\"warning\"");
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_drop_quits_driver() {
            let handle: DriverHandle = Arc::new(Mutex::new(MockDriver::new()));
            {
                let _session = Session::from_handle(Arc::clone(&handle));
            }
            assert!(lock(&handle).current_url().is_err());
        }

        #[test]
        fn test_handle_is_shared() {
            let session = Session::new(MockDriver::new().with_page("https://a.test/", "A"));
            let h1 = session.handle();
            let h2 = session.handle();
            lock(&h1).goto("https://b.test/").unwrap();
            assert_eq!(lock(&h2).current_url().unwrap(), "https://b.test/");
        }
    }
}
