//! Page-object lifecycle engine.
//!
//! The state machine that keeps the in-memory model of "which page the
//! test is on" synchronized with the browser's actual navigation state.
//! Every transition walks the same stations:
//!
//! ```text
//! UNLOADING ─► RESOLVING ─► INSTANTIATED ─► LOAD_VERIFYING
//!                                                 │
//!                       STABLE ◄── IDENTITY_VERIFYING
//! ```
//!
//! Any station can divert to `FAILED` with a typed error carrying the
//! failed-check payload; diagnostics are captured before the error
//! propagates. [`load_pageobject`] never hands back a partially
//! initialized page object: the return is a stable instance or an error.

use serde::{Deserialize, Serialize};

use crate::checks;
use crate::diagnostics;
use crate::page_object::{PageObject, PageOptions};
use crate::result::{NavegarError, NavegarResult};
use crate::routing::select_map;

/// Stations of a page transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Verifying the previous page left the DOM
    Unloading,
    /// Resolving the target name in a routing namespace
    Resolving,
    /// The next page object has been constructed on the shared session
    Instantiated,
    /// Verifying the new page's load checks
    LoadVerifying,
    /// Verifying the new page's identity (URL/title)
    IdentityVerifying,
    /// Terminal success: the new page object is authoritative
    Stable,
    /// Terminal failure at any earlier station
    Failed,
}

impl LifecycleState {
    /// Token string for the station
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unloading => "unloading",
            Self::Resolving => "resolving",
            Self::Instantiated => "instantiated",
            Self::LoadVerifying => "load_verifying",
            Self::IdentityVerifying => "identity_verifying",
            Self::Stable => "stable",
            Self::Failed => "failed",
        }
    }

    /// Whether the machine stops here
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Stable | Self::Failed)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transition from the current page object to the named target.
///
/// Consumes `current`: once the next page object is constructed on the
/// same session handle, the previous instance is stale. The target name is
/// resolved in the current page's auth namespace, or in the opposite one
/// when `cross_auth_boundary` is set (login/logout transitions move
/// between differently-privileged page sets).
///
/// Unload, load and identity verification failures each carry the set of
/// checks that failed; a routing miss is a fatal configuration error and
/// surfaces before anything is instantiated. None of these are retried
/// here; retry policy belongs to callers, and is deliberately narrow.
pub fn load_pageobject(
    current: PageObject,
    target: &str,
    cross_auth_boundary: bool,
    options: PageOptions,
) -> NavegarResult<PageObject> {
    tracing::info!(
        from = current.name(),
        target,
        cross_auth_boundary,
        state = %LifecycleState::Unloading,
        "page transition started"
    );

    if let Err(e) = current.verify_unload(&options.wait) {
        fail(&current, &format!("unload verification failed leaving {}", current.name()));
        return Err(e);
    }

    let mode = select_map(current.definition().auth_mode(), cross_auth_boundary);
    tracing::debug!(target, namespace = %mode, state = %LifecycleState::Resolving, "resolving target");
    let factory = current.ctx().routing().resolve(mode, target)?;

    let mut next = PageObject::from_parts(factory(), current.driver(), current.ctx().clone());
    if options.firstload {
        next.clear_unload_checks();
    }
    tracing::debug!(page = next.name(), state = %LifecycleState::Instantiated, "page object constructed");
    drop(current);

    finalize(next, &options)
}

/// Run the post-instantiation stations: load verification, the transition
/// event, identity verification, diagnostic capture.
///
/// Shared between [`load_pageobject`] and [`PageObject::open`]. The
/// transition event is recorded whether or not load verification passed;
/// diagnostic capture is a side effect and never rolls the machine back.
pub(crate) fn finalize(page: PageObject, options: &PageOptions) -> NavegarResult<PageObject> {
    tracing::debug!(page = page.name(), state = %LifecycleState::LoadVerifying, "verifying load");
    let load_failures = page.run_load_checks(&options.wait)?;

    let event = page
        .ctx()
        .record_event(format!("loaded page-object {}", page.name()), page.name());

    if !load_failures.is_empty() {
        diagnostics::capture_failure(&page.driver(), page.ctx(), &event.key());
        return Err(NavegarError::PageLoad {
            page: page.name().to_string(),
            failures: load_failures,
        });
    }

    tracing::debug!(page = page.name(), state = %LifecycleState::IdentityVerifying, "verifying identity");
    let identity = checks::run_identity_checks(
        &page.driver(),
        page.definition().identity_checks(),
        page.definition().url(),
        page.definition().title(),
        &options.wait,
    );
    match identity {
        Ok(failures) if failures.is_empty() => {}
        Ok(failures) => {
            diagnostics::capture_failure(&page.driver(), page.ctx(), &event.key());
            return Err(NavegarError::Identity {
                page: page.name().to_string(),
                failures,
            });
        }
        Err(e) => {
            // an unreadable page (missing scoping element) is fatal outright
            diagnostics::capture_failure(&page.driver(), page.ctx(), &event.key());
            return Err(e);
        }
    }

    diagnostics::capture_transition(&page.driver(), page.ctx(), &event.key());
    tracing::info!(page = page.name(), state = %LifecycleState::Stable, "page transition complete");
    Ok(page)
}

fn fail(page: &PageObject, what: &str) {
    let event = page.ctx().record_event(what.to_string(), page.name());
    diagnostics::capture_failure(&page.driver(), page.ctx(), &event.key());
}
