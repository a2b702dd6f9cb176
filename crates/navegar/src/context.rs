//! Per-run context.
//!
//! One test run owns one [`RunContext`]: artifact paths, diagnostic capture
//! toggles, the site's routing table, and the event log. The context is an
//! explicit handle passed through construction; there is no process-wide
//! run state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::event::{EventLog, TransitionEvent};
use crate::routing::RoutingTable;

/// Diagnostic capture toggles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture screenshots around interactions and transitions
    pub screenshots: bool,
    /// Capture browser console output
    pub console: bool,
    /// Capture cookies
    pub cookies: bool,
    /// Capture local/session storage snapshots
    pub storage: bool,
    /// Run the accessibility audit
    pub accessibility: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            screenshots: true,
            console: true,
            cookies: true,
            storage: true,
            accessibility: true,
        }
    }
}

impl CaptureConfig {
    /// All captures enabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable every capture (fast unit runs)
    #[must_use]
    pub const fn none() -> Self {
        Self {
            screenshots: false,
            console: false,
            cookies: false,
            storage: false,
            accessibility: false,
        }
    }

    /// Toggle screenshots
    #[must_use]
    pub const fn with_screenshots(mut self, on: bool) -> Self {
        self.screenshots = on;
        self
    }

    /// Toggle console capture
    #[must_use]
    pub const fn with_console(mut self, on: bool) -> Self {
        self.console = on;
        self
    }

    /// Toggle cookie capture
    #[must_use]
    pub const fn with_cookies(mut self, on: bool) -> Self {
        self.cookies = on;
        self
    }

    /// Toggle storage capture
    #[must_use]
    pub const fn with_storage(mut self, on: bool) -> Self {
        self.storage = on;
        self
    }

    /// Toggle the accessibility audit
    #[must_use]
    pub const fn with_accessibility(mut self, on: bool) -> Self {
        self.accessibility = on;
        self
    }
}

struct ContextInner {
    test_name: String,
    artifact_dir: PathBuf,
    capture: CaptureConfig,
    routing: RoutingTable,
    events: Mutex<EventLog>,
}

/// Cheap-to-clone handle to one test run's shared state
#[derive(Clone)]
pub struct RunContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("test_name", &self.inner.test_name)
            .field("artifact_dir", &self.inner.artifact_dir)
            .finish_non_exhaustive()
    }
}

impl RunContext {
    /// Start building a context for a named test
    #[must_use]
    pub fn builder(test_name: impl Into<String>) -> RunContextBuilder {
        RunContextBuilder::new(test_name)
    }

    /// Name of the owning test
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.inner.test_name
    }

    /// Directory diagnostic artifacts are written under
    #[must_use]
    pub fn artifact_dir(&self) -> &Path {
        &self.inner.artifact_dir
    }

    /// Capture toggles
    #[must_use]
    pub fn capture(&self) -> &CaptureConfig {
        &self.inner.capture
    }

    /// The site's routing table
    #[must_use]
    pub fn routing(&self) -> &RoutingTable {
        &self.inner.routing
    }

    /// Append an event to the run's log
    pub fn record_event(
        &self,
        description: impl Into<String>,
        page: impl Into<String>,
    ) -> TransitionEvent {
        self.inner
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .record(description, page)
    }

    /// Snapshot of the events recorded so far, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.inner
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .events()
            .to_vec()
    }
}

/// Builder for [`RunContext`]
#[derive(Debug)]
pub struct RunContextBuilder {
    test_name: String,
    artifact_dir: Option<PathBuf>,
    capture: CaptureConfig,
    routing: RoutingTable,
}

impl RunContextBuilder {
    /// Create a builder for a named test
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            artifact_dir: None,
            capture: CaptureConfig::default(),
            routing: RoutingTable::new(),
        }
    }

    /// Override the artifact directory (default: `artifacts/<test name>`)
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Set the capture toggles
    #[must_use]
    pub const fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    /// Install the site's routing table
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    /// Build the context handle
    #[must_use]
    pub fn build(self) -> RunContext {
        let artifact_dir = self
            .artifact_dir
            .unwrap_or_else(|| PathBuf::from("artifacts").join(&self.test_name));
        RunContext {
            inner: Arc::new(ContextInner {
                test_name: self.test_name,
                artifact_dir,
                capture: self.capture,
                routing: self.routing,
                events: Mutex::new(EventLog::new()),
            }),
        }
    }
}
