//! Mock driver for engine tests.
//!
//! [`MockDriver`] models a browser session in memory: a current URL/title,
//! a set of visible elements, and scripted transitions that fire when
//! elements are clicked or forms are submitted. Failure injection covers
//! the conditions the engine must handle: the out-of-viewport unhover
//! transient, missing elements, and a clear that leaves a value behind.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::driver::{ConsoleEntry, Cookie, Driver, DriverHandle};
use crate::locator::Locator;
use crate::result::{NavegarError, NavegarResult};

/// The page the mock transitions to when a scripted element is activated
#[derive(Debug, Clone)]
pub struct PageState {
    /// URL after the transition
    pub url: String,
    /// Title after the transition
    pub title: String,
    /// Elements that appear with the new page
    pub appear: Vec<Locator>,
    /// Elements that leave the DOM with the old page
    pub vanish: Vec<Locator>,
}

impl PageState {
    /// Describe a destination page
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            appear: Vec::new(),
            vanish: Vec::new(),
        }
    }

    /// Element that appears once the destination has rendered
    #[must_use]
    pub fn with_element(mut self, locator: Locator) -> Self {
        self.appear.push(locator);
        self
    }

    /// Element that disappears with the previous page
    #[must_use]
    pub fn without_element(mut self, locator: Locator) -> Self {
        self.vanish.push(locator);
        self
    }
}

/// In-memory browser session for unit tests
#[derive(Debug, Default)]
pub struct MockDriver {
    url: String,
    title: String,
    present: HashSet<String>,
    values: HashMap<String, String>,
    on_activate: HashMap<String, PageState>,
    on_hover: HashMap<String, Vec<Locator>>,
    cookies: Vec<Cookie>,
    console: Vec<ConsoleEntry>,
    local_storage: HashMap<String, String>,
    session_storage: HashMap<String, String>,
    script_result: serde_json::Value,
    screenshot_png: Vec<u8>,
    fail_unhover: u32,
    title_unreadable: bool,
    sticky_values: bool,
    quit: bool,
    calls: Vec<String>,
}

impl MockDriver {
    /// Create a mock session on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            screenshot_png: vec![0x89, b'P', b'N', b'G'],
            script_result: serde_json::Value::Null,
            ..Default::default()
        }
    }

    /// Set the current URL and title
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.url = url.into();
        self.title = title.into();
        self
    }

    /// Add a visible element
    #[must_use]
    pub fn with_element(mut self, locator: Locator) -> Self {
        self.present.insert(locator.to_string());
        self
    }

    /// Script a transition fired when `locator` is clicked or submitted
    #[must_use]
    pub fn on_activate(mut self, locator: Locator, state: PageState) -> Self {
        self.on_activate.insert(locator.to_string(), state);
        self
    }

    /// Script elements revealed when `locator` is hovered (submenus)
    #[must_use]
    pub fn on_hover(mut self, locator: Locator, reveals: Vec<Locator>) -> Self {
        self.on_hover.insert(locator.to_string(), reveals);
        self
    }

    /// Seed cookies
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Seed a local storage entry
    #[must_use]
    pub fn with_local_storage(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.local_storage.insert(key.into(), value.into());
        self
    }

    /// Seed a session storage entry
    #[must_use]
    pub fn with_session_storage(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.session_storage.insert(key.into(), value.into());
        self
    }

    /// Buffer a console message
    #[must_use]
    pub fn with_console_entry(mut self, entry: ConsoleEntry) -> Self {
        self.console.push(entry);
        self
    }

    /// Fix the value `execute_script` answers with
    #[must_use]
    pub fn with_script_result(mut self, value: serde_json::Value) -> Self {
        self.script_result = value;
        self
    }

    /// Fail the next `n` cursor moves with the out-of-viewport transient
    #[must_use]
    pub fn fail_unhover_times(mut self, n: u32) -> Self {
        self.fail_unhover = n;
        self
    }

    /// Make `title()` fail as if no readable page were displayed
    #[must_use]
    pub fn with_unreadable_title(mut self) -> Self {
        self.title_unreadable = true;
        self
    }

    /// Make `clear()` leave field values untouched
    #[must_use]
    pub fn with_sticky_values(mut self) -> Self {
        self.sticky_values = true;
        self
    }

    /// Wrap into the shared handle the engine consumes
    #[must_use]
    pub fn into_handle(self) -> DriverHandle {
        Arc::new(Mutex::new(self))
    }

    /// Add an element to the live DOM model
    pub fn add_element(&mut self, locator: &Locator) {
        self.present.insert(locator.to_string());
    }

    /// Remove an element from the live DOM model
    pub fn remove_element(&mut self, locator: &Locator) {
        self.present.remove(&locator.to_string());
    }

    /// Recorded call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.calls
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }

    /// How many recorded calls start with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn ensure_alive(&self) -> NavegarResult<()> {
        if self.quit {
            return Err(NavegarError::driver("session has been quit"));
        }
        Ok(())
    }

    fn ensure_present(&self, locator: &Locator) -> NavegarResult<()> {
        if self.present.contains(&locator.to_string()) {
            Ok(())
        } else {
            Err(NavegarError::ElementMissing {
                locator: locator.to_string(),
            })
        }
    }

    fn apply(&mut self, state: &PageState) {
        self.url = state.url.clone();
        self.title = state.title.clone();
        for gone in &state.vanish {
            self.present.remove(&gone.to_string());
        }
        for shown in &state.appear {
            self.present.insert(shown.to_string());
        }
    }

    fn activate(&mut self, locator: &Locator) -> NavegarResult<()> {
        self.ensure_present(locator)?;
        if let Some(state) = self.on_activate.get(&locator.to_string()).cloned() {
            self.apply(&state);
        }
        Ok(())
    }
}

impl Driver for MockDriver {
    fn goto(&mut self, url: &str) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("goto:{url}"));
        self.url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> NavegarResult<String> {
        self.ensure_alive()?;
        Ok(self.url.clone())
    }

    fn title(&self) -> NavegarResult<String> {
        self.ensure_alive()?;
        if self.title_unreadable {
            return Err(NavegarError::ElementMissing {
                locator: "tag_name=title".to_string(),
            });
        }
        Ok(self.title.clone())
    }

    fn is_present(&self, locator: &Locator) -> NavegarResult<bool> {
        self.ensure_alive()?;
        Ok(self.present.contains(&locator.to_string()))
    }

    fn click(&mut self, locator: &Locator) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("click:{locator}"));
        self.activate(locator)
    }

    fn hover(&mut self, locator: &Locator) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("hover:{locator}"));
        self.ensure_present(locator)?;
        if let Some(revealed) = self.on_hover.get(&locator.to_string()).cloned() {
            for item in revealed {
                self.present.insert(item.to_string());
            }
        }
        Ok(())
    }

    fn type_text(&mut self, locator: &Locator, text: &str) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("type:{locator}:{text}"));
        self.ensure_present(locator)?;
        self.values
            .entry(locator.to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn clear(&mut self, locator: &Locator) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("clear:{locator}"));
        self.ensure_present(locator)?;
        if !self.sticky_values {
            self.values.insert(locator.to_string(), String::new());
        }
        Ok(())
    }

    fn element_value(&self, locator: &Locator) -> NavegarResult<String> {
        self.ensure_alive()?;
        self.ensure_present(locator)?;
        Ok(self
            .values
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    fn submit(&mut self, locator: &Locator) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("submit:{locator}"));
        self.activate(locator)
    }

    fn scroll_to(&mut self, x: i64, y: i64) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("scroll:{x},{y}"));
        Ok(())
    }

    fn move_cursor_by(&mut self, dx: i64, dy: i64) -> NavegarResult<()> {
        self.ensure_alive()?;
        self.calls.push(format!("move:{dx},{dy}"));
        if self.fail_unhover > 0 {
            self.fail_unhover -= 1;
            return Err(NavegarError::OutOfViewport { dx, dy });
        }
        Ok(())
    }

    fn execute_script(&mut self, script: &str) -> NavegarResult<serde_json::Value> {
        self.ensure_alive()?;
        let preview: String = script.chars().take(40).collect();
        self.calls.push(format!("script:{preview}"));
        Ok(self.script_result.clone())
    }

    fn cookies(&self) -> NavegarResult<Vec<Cookie>> {
        self.ensure_alive()?;
        Ok(self.cookies.clone())
    }

    fn console_entries(&mut self) -> NavegarResult<Vec<ConsoleEntry>> {
        self.ensure_alive()?;
        Ok(std::mem::take(&mut self.console))
    }

    fn local_storage(&self) -> NavegarResult<HashMap<String, String>> {
        self.ensure_alive()?;
        Ok(self.local_storage.clone())
    }

    fn session_storage(&self) -> NavegarResult<HashMap<String, String>> {
        self.ensure_alive()?;
        Ok(self.session_storage.clone())
    }

    fn screenshot(&mut self) -> NavegarResult<Vec<u8>> {
        self.ensure_alive()?;
        self.calls.push("screenshot".to_string());
        Ok(self.screenshot_png.clone())
    }

    fn quit(&mut self) -> NavegarResult<()> {
        self.calls.push("quit".to_string());
        self.quit = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn nav_link() -> Locator {
        Locator::css("nav a.pricing")
    }

    #[test]
    fn test_scripted_click_transition() {
        let mut driver = MockDriver::new()
            .with_page("https://example.com/", "Home")
            .with_element(nav_link())
            .with_element(Locator::css("h1.home"))
            .on_activate(
                nav_link(),
                PageState::new("https://example.com/pricing", "Pricing")
                    .with_element(Locator::css("h1.pricing"))
                    .without_element(Locator::css("h1.home")),
            );

        driver.click(&nav_link()).unwrap();
        assert_eq!(driver.current_url().unwrap(), "https://example.com/pricing");
        assert_eq!(driver.title().unwrap(), "Pricing");
        assert!(driver.is_present(&Locator::css("h1.pricing")).unwrap());
        assert!(!driver.is_present(&Locator::css("h1.home")).unwrap());
    }

    #[test]
    fn test_click_missing_element() {
        let mut driver = MockDriver::new();
        let result = driver.click(&nav_link());
        assert!(matches!(result, Err(NavegarError::ElementMissing { .. })));
    }

    #[test]
    fn test_hover_reveals_submenu() {
        let menu = Locator::css("nav .products");
        let item = Locator::css("nav .products .analytics");
        let mut driver = MockDriver::new()
            .with_element(menu.clone())
            .on_hover(menu.clone(), vec![item.clone()]);

        assert!(!driver.is_present(&item).unwrap());
        driver.hover(&menu).unwrap();
        assert!(driver.is_present(&item).unwrap());
    }

    #[test]
    fn test_unhover_failure_injection() {
        let mut driver = MockDriver::new().fail_unhover_times(1);
        assert!(matches!(
            driver.move_cursor_by(-60, -60),
            Err(NavegarError::OutOfViewport { dx: -60, dy: -60 })
        ));
        assert!(driver.move_cursor_by(-60, -60).is_ok());
    }

    #[test]
    fn test_clear_and_sticky_values() {
        let field = Locator::id("email");
        let mut driver = MockDriver::new().with_element(field.clone());
        driver.type_text(&field, "a@b.test").unwrap();
        assert_eq!(driver.element_value(&field).unwrap(), "a@b.test");
        driver.clear(&field).unwrap();
        assert_eq!(driver.element_value(&field).unwrap(), "");

        let mut sticky = MockDriver::new()
            .with_element(field.clone())
            .with_sticky_values();
        sticky.type_text(&field, "a@b.test").unwrap();
        sticky.clear(&field).unwrap();
        assert_eq!(sticky.element_value(&field).unwrap(), "a@b.test");
    }

    #[test]
    fn test_console_drains() {
        let mut driver = MockDriver::new().with_console_entry(ConsoleEntry::new(
            crate::driver::ConsoleLevel::Error,
            "boom",
        ));
        assert_eq!(driver.console_entries().unwrap().len(), 1);
        assert!(driver.console_entries().unwrap().is_empty());
    }

    #[test]
    fn test_call_history() {
        let mut driver = MockDriver::new().with_element(nav_link());
        driver.click(&nav_link()).unwrap();
        driver.scroll_to(0, 400).unwrap();
        assert!(driver.was_called("click:css=nav a.pricing"));
        assert_eq!(driver.call_count("click:"), 1);
        assert!(driver.was_called("scroll:0,400"));
    }

    #[test]
    fn test_quit_invalidates_session() {
        let mut driver = MockDriver::new();
        driver.quit().unwrap();
        assert!(driver.current_url().is_err());
        assert!(driver.quit().is_ok());
    }
}
