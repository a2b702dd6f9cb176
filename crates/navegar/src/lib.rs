//! Navegar: page-object lifecycle engine for browser UI test automation.
//!
//! Navegar keeps an in-memory model of "which page the test is on"
//! synchronized with a real browser's navigation state. Tests hold one
//! generic [`PageObject`] at a time; every transition runs the same
//! verified lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     NAVEGAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────┐   ┌─────────┐  │
//! │  │ Test      │──►│ PageObject   │──►│ Lifecycle │──►│ Driver  │  │
//! │  │ (Rust)    │   │ + Definition │   │ Engine    │   │ (CDP /  │  │
//! │  │           │   │ + Routing    │   │           │   │  mock)  │  │
//! │  └───────────┘   └──────────────┘   └───────────┘   └─────────┘  │
//! │        events ◄── diagnostics ◄── checks/waits ◄────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A transition (`load_pageobject`) verifies the old page unloaded,
//! resolves the target in an auth-partitioned routing table, constructs
//! the next page object on the same session handle, verifies its load
//! checks and identity, records a transition event, and captures
//! diagnostics (cookies, console, storage, accessibility, screenshot)
//! keyed by that event. The return value is a stable page object or a
//! typed error carrying exactly which checks failed.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Accessibility audit: WCAG contrast math plus a DOM scan captured with
/// the other transition diagnostics.
pub mod accessibility;

/// Browser configuration and the feature-gated CDP driver.
pub mod browser;

/// Check primitives: element presence/absence, URL and title checks.
pub mod checks;

/// Per-run context: artifact paths, capture toggles, routing, event log.
pub mod context;

/// Diagnostic capture side effects.
pub mod diagnostics;

/// The browser session contract and scoped session ownership.
pub mod driver;

/// Transition event records.
pub mod event;

/// Interaction primitives: click, hover, fill, clear, submit.
pub mod interaction;

/// The page-object lifecycle state machine.
pub mod lifecycle;

/// Locator strategies and check tuples.
pub mod locator;

/// In-memory mock driver for engine tests.
pub mod mock;

/// Multi-stage menu traversal over declarative navigation tables.
pub mod navigation;

/// Page definitions and the generic page object.
pub mod page_object;

/// Result and error types.
pub mod result;

/// Auth-partitioned routing and page-object resolution.
pub mod routing;

/// Bounded blocking waits and URL patterns.
pub mod wait;

pub use accessibility::{
    AccessibilityIssue, AccessibilityReport, Color, Severity, MIN_CONTRAST_LARGE,
    MIN_CONTRAST_NORMAL,
};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::cdp::CdpDriver;
pub use checks::{
    check_exact_url, check_title, check_url, check_url_chunks, expect_element_to_be_gone,
    expect_element_to_be_present, run_checks, run_identity_checks, IdentityCheck, IdentityFailure,
};
pub use context::{CaptureConfig, RunContext, RunContextBuilder};
pub use diagnostics::StorageSnapshot;
pub use driver::{ConsoleEntry, ConsoleLevel, Cookie, Driver, DriverHandle, Session};
pub use event::{EventLog, TransitionEvent};
pub use lifecycle::{load_pageobject, LifecycleState};
pub use locator::{Check, CheckFailure, Locator, Strategy};
pub use mock::{MockDriver, PageState};
pub use navigation::{select_page_from_top_menu, MenuOpen, MenuTarget, NavigationTable};
pub use page_object::{PageDefinition, PageObject, PageOptions};
pub use result::{NavegarError, NavegarResult};
pub use routing::{select_map, AuthMode, PageFactory, RoutingTable};
pub use wait::{
    poll_until, wait_for_url_change, UrlPattern, WaitOptions, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS, URL_CHANGE_TIMEOUT_MS,
};

/// Initialize console logging for test binaries and examples.
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
