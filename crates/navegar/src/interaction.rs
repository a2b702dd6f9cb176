//! Interaction primitives.
//!
//! Thin wrappers around the browser-mutating operations: click, hover,
//! type, clear, submit. Each records a structured event against the run's
//! log and, when the context's screenshot toggle is on, captures a
//! screenshot keyed by that event. Typed text is never written to the
//! event log, since fields may hold credentials.

use crate::diagnostics;
use crate::driver::lock;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{NavegarError, NavegarResult};

/// Relative offset of the post-click unhover move.
///
/// Clicking a menu link leaves the cursor parked over the menu, which keeps
/// hover menus open across the transition; moving the cursor away settles
/// the page. The move can land outside the viewport on short windows;
/// that is the one transient condition callers retry.
pub const UNHOVER_OFFSET: (i64, i64) = (-60, -60);

fn record(page: &PageObject, description: String) {
    let event = page.ctx().record_event(description, page.name());
    if page.ctx().capture().screenshots {
        let driver = page.driver();
        if let Err(e) = diagnostics::capture_screenshot(&driver, page.ctx(), &event.key()) {
            tracing::warn!(error = %e, "interaction screenshot capture failed");
        }
    }
}

/// Click an element
pub fn click(page: &PageObject, locator: &Locator) -> NavegarResult<()> {
    lock(&page.driver()).click(locator)?;
    record(page, format!("clicked {locator}"));
    Ok(())
}

/// Click an element and optionally move the cursor away afterwards.
///
/// The unhover move may fail with [`NavegarError::OutOfViewport`]; menu
/// traversal retries that exact condition once, without the unhover.
pub fn click_and_unhover(page: &PageObject, locator: &Locator, unhover: bool) -> NavegarResult<()> {
    {
        let driver = page.driver();
        let mut session = lock(&driver);
        session.click(locator)?;
        if unhover {
            session.move_cursor_by(UNHOVER_OFFSET.0, UNHOVER_OFFSET.1)?;
        }
    }
    record(page, format!("clicked {locator}"));
    Ok(())
}

/// Hover over an element
pub fn hover(page: &PageObject, locator: &Locator) -> NavegarResult<()> {
    lock(&page.driver()).hover(locator)?;
    record(page, format!("hovered {locator}"));
    Ok(())
}

/// Type text into an element
pub fn fill(page: &PageObject, locator: &Locator, text: &str) -> NavegarResult<()> {
    lock(&page.driver()).type_text(locator, text)?;
    record(page, format!("typed into {locator}"));
    Ok(())
}

/// Clear an input element and verify the field actually emptied.
///
/// Some inputs re-populate themselves from script; a clear that leaves
/// content behind is an interaction failure, not a silent no-op.
pub fn clear(page: &PageObject, locator: &Locator) -> NavegarResult<()> {
    let remaining = {
        let driver = page.driver();
        let mut session = lock(&driver);
        session.clear(locator)?;
        session.element_value(locator)?
    };
    if !remaining.is_empty() {
        return Err(NavegarError::Interaction {
            message: format!(
                "field {locator} still contains {} character(s) after clear",
                remaining.len()
            ),
        });
    }
    record(page, format!("cleared {locator}"));
    Ok(())
}

/// Submit the form owning an element
pub fn submit(page: &PageObject, locator: &Locator) -> NavegarResult<()> {
    lock(&page.driver()).submit(locator)?;
    record(page, format!("submitted {locator}"));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::context::{CaptureConfig, RunContext};
    use crate::driver::DriverHandle;
    use crate::mock::MockDriver;
    use crate::page_object::PageDefinition;

    fn page_on(driver: DriverHandle) -> PageObject {
        let ctx = RunContext::builder("interaction_tests")
            .with_capture(CaptureConfig::none())
            .build();
        PageObject::from_parts(
            PageDefinition::new("home", "https://example.com/"),
            driver,
            ctx,
        )
    }

    #[test]
    fn test_click_records_event() {
        let button = Locator::css("button.go");
        let driver = MockDriver::new().with_element(button.clone()).into_handle();
        let page = page_on(std::sync::Arc::clone(&driver));

        page.click(&button).unwrap();

        let events = page.ctx().events();
        assert_eq!(events.len(), 1);
        assert!(events[0].description.contains("clicked css=button.go"));
        assert_eq!(events[0].page, "home");
    }

    #[test]
    fn test_fill_does_not_log_text() {
        let field = Locator::id("password");
        let driver = MockDriver::new().with_element(field.clone()).into_handle();
        let page = page_on(std::sync::Arc::clone(&driver));

        page.fill(&field, "hunter2").unwrap();

        let events = page.ctx().events();
        assert!(events[0].description.contains("typed into id=password"));
        assert!(!events[0].description.contains("hunter2"));
    }

    #[test]
    fn test_clear_verifies_resulting_state() {
        let field = Locator::id("email");
        let driver = MockDriver::new()
            .with_element(field.clone())
            .with_sticky_values()
            .into_handle();
        let page = page_on(std::sync::Arc::clone(&driver));
        page.fill(&field, "a@b.test").unwrap();

        let err = page.clear_field(&field).unwrap_err();
        match err {
            NavegarError::Interaction { message } => {
                assert!(message.contains("after clear"));
            }
            other => panic!("expected Interaction, got {other:?}"),
        }
    }

    #[test]
    fn test_clear_passes_when_field_empties() {
        let field = Locator::id("email");
        let driver = MockDriver::new().with_element(field.clone()).into_handle();
        let page = page_on(std::sync::Arc::clone(&driver));
        page.fill(&field, "a@b.test").unwrap();
        assert!(page.clear_field(&field).is_ok());
    }

    #[test]
    fn test_click_and_unhover_moves_cursor() {
        use std::sync::{Arc, Mutex};

        let link = Locator::css("nav a");
        let mock = Arc::new(Mutex::new(MockDriver::new().with_element(link.clone())));
        let handle: DriverHandle = mock.clone();
        let page = page_on(handle);

        click_and_unhover(&page, &link, true).unwrap();

        let mock = mock.lock().unwrap();
        assert!(mock.was_called("click:css=nav a"));
        assert!(mock.was_called("move:-60,-60"));
    }

    #[test]
    fn test_click_without_unhover_skips_cursor_move() {
        use std::sync::{Arc, Mutex};

        let link = Locator::css("nav a");
        let mock = Arc::new(Mutex::new(MockDriver::new().with_element(link.clone())));
        let handle: DriverHandle = mock.clone();
        let page = page_on(handle);

        click_and_unhover(&page, &link, false).unwrap();

        let mock = mock.lock().unwrap();
        assert_eq!(mock.call_count("move:"), 0);
    }

    #[test]
    fn test_unhover_transient_propagates() {
        let link = Locator::css("nav a");
        let driver = MockDriver::new()
            .with_element(link.clone())
            .fail_unhover_times(1)
            .into_handle();
        let page = page_on(std::sync::Arc::clone(&driver));

        let err = click_and_unhover(&page, &link, true).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_screenshot_written_when_enabled() {
        let button = Locator::css("button.go");
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::builder("screenshot_test")
            .with_capture(CaptureConfig::none().with_screenshots(true))
            .with_artifact_dir(dir.path())
            .build();
        let driver = MockDriver::new().with_element(button.clone()).into_handle();
        let page = PageObject::from_parts(
            PageDefinition::new("home", "https://example.com/"),
            driver,
            ctx,
        );

        page.click(&button).unwrap();

        let captured: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(captured.len(), 1);
        assert!(captured[0].ends_with(".png"));
        assert!(captured[0].contains("clicked"));
    }
}
