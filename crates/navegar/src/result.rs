//! Result and error types for Navegar.

use thiserror::Error;

use crate::checks::IdentityFailure;
use crate::locator::CheckFailure;
use crate::routing::AuthMode;

/// Result type for Navegar operations
pub type NavegarResult<T> = Result<T, NavegarError>;

/// Errors that can occur in Navegar
#[derive(Debug, Error)]
pub enum NavegarError {
    /// A page that should have left the DOM is still detected (or vice versa)
    #[error("page unload verification failed for '{page}': {} check(s) failed", failures.len())]
    PageUnload {
        /// Page that failed to unload
        page: String,
        /// Failed check descriptors
        failures: Vec<CheckFailure>,
    },

    /// The newly instantiated page object's load checks did not pass
    #[error("page load verification failed for '{page}': {} check(s) failed", failures.len())]
    PageLoad {
        /// Page that failed to load
        page: String,
        /// Failed check descriptors
        failures: Vec<CheckFailure>,
    },

    /// URL/title identity verification of the new page failed
    #[error("identity verification failed for '{page}': {} check(s) failed", failures.len())]
    Identity {
        /// Page whose identity could not be confirmed
        page: String,
        /// Failed identity check descriptors
        failures: Vec<IdentityFailure>,
    },

    /// An expected scoping element cannot be found at all
    #[error("element not found: {locator}")]
    ElementMissing {
        /// Locator that matched nothing
        locator: String,
    },

    /// A DOM interaction did not produce the expected resulting state
    #[error("interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Routing map lookup failed (fatal configuration error)
    #[error("no page object named '{name}' in the {mode} routing map")]
    UnknownPage {
        /// Requested page-object name
        name: String,
        /// Routing namespace that was consulted
        mode: AuthMode,
    },

    /// A page name was registered in more than one routing namespace
    #[error("page object '{name}' is already registered")]
    DuplicatePage {
        /// Conflicting page-object name
        name: String,
    },

    /// A navigation method referenced a destination missing from the menu table
    #[error("page '{page}' has no menu entry for destination '{destination}'")]
    UnknownMenuTarget {
        /// Page whose navigation table was consulted
        page: String,
        /// Requested destination name
        destination: String,
    },

    /// The post-click unhover offset moved outside the viewport bounds
    ///
    /// The one transient condition callers may retry (exactly once).
    #[error("cursor offset ({dx}, {dy}) moved out of viewport bounds")]
    OutOfViewport {
        /// Horizontal offset that was attempted
        dx: i64,
        /// Vertical offset that was attempted
        dy: i64,
    },

    /// Bounded wait expired
    #[error("operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Browser session error
    #[error("driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NavegarError {
    /// Build a driver error from any displayable cause
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this error is the one retryable transient condition
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::OutOfViewport { .. })
    }

    /// Whether this error signals a configuration mistake rather than a
    /// runtime condition (never retried, surfaces immediately)
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownPage { .. } | Self::DuplicatePage { .. } | Self::UnknownMenuTarget { .. }
        )
    }
}
