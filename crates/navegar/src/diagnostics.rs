//! Diagnostic capture.
//!
//! Around every transition (and on every failure path) the engine persists
//! what a human needs to diagnose without re-running: cookies, console
//! output, web storage snapshots, an accessibility audit, and a
//! screenshot, all under one directory keyed by the transition's event.
//! Capture is a side effect of the state machine, never part of its
//! success/failure determination: an artifact that cannot be written is
//! logged and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accessibility;
use crate::context::{CaptureConfig, RunContext};
use crate::driver::{lock, DriverHandle};
use crate::result::NavegarResult;

/// Local and session storage at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// `localStorage` for the current origin
    pub local: HashMap<String, String>,
    /// `sessionStorage` for the current origin
    pub session: HashMap<String, String>,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

/// Capture the standard artifact set for a completed transition.
pub fn capture_transition(driver: &DriverHandle, ctx: &RunContext, key: &str) {
    capture(driver, ctx, key, *ctx.capture());
}

/// Capture the artifact set on a failure path.
///
/// Screenshots are forced on: a failing test must report enough context to
/// diagnose regardless of what the run had toggled off.
pub fn capture_failure(driver: &DriverHandle, ctx: &RunContext, key: &str) {
    let toggles = ctx.capture().with_screenshots(true);
    capture(driver, ctx, key, toggles);
}

fn capture(driver: &DriverHandle, ctx: &RunContext, key: &str, toggles: CaptureConfig) {
    if !(toggles.cookies
        || toggles.console
        || toggles.storage
        || toggles.accessibility
        || toggles.screenshots)
    {
        return;
    }
    let dir = ctx.artifact_dir().join(key);
    if let Err(e) = fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "could not create artifact directory");
        return;
    }

    if toggles.cookies {
        attempt("cookies", || {
            write_json(&dir.join("cookies.json"), &lock(driver).cookies()?)
        });
    }
    if toggles.console {
        attempt("console", || {
            write_json(&dir.join("console.json"), &lock(driver).console_entries()?)
        });
    }
    if toggles.storage {
        attempt("storage", || {
            let snapshot = {
                let session = lock(driver);
                StorageSnapshot {
                    local: session.local_storage()?,
                    session: session.session_storage()?,
                    captured_at: Utc::now(),
                }
            };
            write_json(&dir.join("storage.json"), &snapshot)
        });
    }
    if toggles.accessibility {
        attempt("accessibility", || {
            let report = accessibility::audit(driver)?;
            write_json(&dir.join("a11y.json"), &report)
        });
    }
    if toggles.screenshots {
        attempt("screenshot", || {
            let png = lock(driver).screenshot()?;
            fs::write(dir.join("screenshot.png"), png)?;
            Ok(())
        });
    }
}

/// Capture a single screenshot named after an interaction event.
pub fn capture_screenshot(
    driver: &DriverHandle,
    ctx: &RunContext,
    key: &str,
) -> NavegarResult<PathBuf> {
    fs::create_dir_all(ctx.artifact_dir())?;
    let path = ctx.artifact_dir().join(format!("{key}.png"));
    let png = lock(driver).screenshot()?;
    fs::write(&path, png)?;
    Ok(path)
}

fn attempt(artifact: &str, capture: impl FnOnce() -> NavegarResult<()>) {
    if let Err(e) = capture() {
        tracing::warn!(artifact, error = %e, "diagnostic capture failed");
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> NavegarResult<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
