//! Page definitions and the generic page object.
//!
//! A [`PageDefinition`] is the declarative description of one page: its
//! URL, expected title, auth namespace, identity/load/unload checks, and
//! menu navigation table. A [`PageObject`] is a definition bound to the
//! live browser session and the run context, the thing a test holds and
//! navigates from. There is one page-object type; sites differ only in the
//! definitions they register.

use serde::{Deserialize, Serialize};

use crate::checks::{self, IdentityCheck};
use crate::context::RunContext;
use crate::driver::{lock, DriverHandle};
use crate::interaction;
use crate::lifecycle;
use crate::locator::{Check, CheckFailure, Locator};
use crate::navigation::{self, MenuTarget, NavigationTable};
use crate::result::{NavegarError, NavegarResult};
use crate::routing::AuthMode;
use crate::wait::WaitOptions;

/// Construction options for a page object
#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    /// This is the first page of the test; navigate to the declared URL
    /// and evaluate no unload checks on the next transition away
    pub firstload: bool,
    /// Bounded-wait settings for this transition's checks
    pub wait: WaitOptions,
    /// Bounded-wait settings for post-click URL change waits
    pub url_wait: WaitOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            firstload: false,
            wait: WaitOptions::default(),
            url_wait: WaitOptions::for_url_change(),
        }
    }
}

impl PageOptions {
    /// Default options: not a first load, default waits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a test's starting page
    #[must_use]
    pub fn firstload() -> Self {
        Self {
            firstload: true,
            ..Self::default()
        }
    }

    /// Set the firstload flag
    #[must_use]
    pub const fn with_firstload(mut self, firstload: bool) -> Self {
        self.firstload = firstload;
        self
    }

    /// Override the bounded-wait settings for checks
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Override the bounded-wait settings for URL change waits
    #[must_use]
    pub const fn with_url_wait(mut self, wait: WaitOptions) -> Self {
        self.url_wait = wait;
        self
    }
}

/// Declarative description of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDefinition {
    name: String,
    url: String,
    #[serde(default)]
    title: Option<String>,
    auth_mode: AuthMode,
    #[serde(default)]
    identity_checks: Vec<IdentityCheck>,
    #[serde(default)]
    load_checks: Vec<Check>,
    #[serde(default)]
    unload_checks: Vec<Check>,
    #[serde(default)]
    nav: NavigationTable,
}

impl PageDefinition {
    /// Describe a page by name and fully-qualified URL (noauth by default)
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            title: None,
            auth_mode: AuthMode::NoAuth,
            identity_checks: Vec::new(),
            load_checks: Vec::new(),
            unload_checks: Vec::new(),
            nav: NavigationTable::new(),
        }
    }

    /// Declare the expected browser title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Place the page in an auth namespace
    #[must_use]
    pub const fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Append an identity check
    #[must_use]
    pub fn with_identity_check(mut self, check: IdentityCheck) -> Self {
        self.identity_checks.push(check);
        self
    }

    /// Append a load check
    #[must_use]
    pub fn with_load_check(mut self, check: Check) -> Self {
        self.load_checks.push(check);
        self
    }

    /// Append an unload check
    #[must_use]
    pub fn with_unload_check(mut self, check: Check) -> Self {
        self.unload_checks.push(check);
        self
    }

    /// Add a menu navigation target
    #[must_use]
    pub fn with_nav_target(mut self, destination: impl Into<String>, target: MenuTarget) -> Self {
        self.nav.insert(destination, target);
        self
    }

    /// Page-object name (unique within its routing namespace)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified target URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Declared browser title, if any
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Auth namespace the page lives in
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Declared identity checks, in evaluation order
    #[must_use]
    pub fn identity_checks(&self) -> &[IdentityCheck] {
        &self.identity_checks
    }

    /// Declared load checks
    #[must_use]
    pub fn load_checks(&self) -> &[Check] {
        &self.load_checks
    }

    /// Declared unload checks
    #[must_use]
    pub fn unload_checks(&self) -> &[Check] {
        &self.unload_checks
    }

    /// Menu navigation table
    #[must_use]
    pub fn nav(&self) -> &NavigationTable {
        &self.nav
    }
}

/// A page definition bound to the live session and run context
pub struct PageObject {
    definition: PageDefinition,
    driver: DriverHandle,
    ctx: RunContext,
}

impl std::fmt::Debug for PageObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageObject")
            .field("definition", &self.definition)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl PageObject {
    pub(crate) fn from_parts(
        definition: PageDefinition,
        driver: DriverHandle,
        ctx: RunContext,
    ) -> Self {
        Self {
            definition,
            driver,
            ctx,
        }
    }

    /// Construct a test's starting page object.
    ///
    /// With `options.firstload` set, the session navigates to the declared
    /// URL first and the constructed instance carries no unload checks, so
    /// the immediately following transition evaluates none. Load and
    /// identity verification run exactly as they would after any
    /// transition.
    pub fn open(
        definition: PageDefinition,
        driver: DriverHandle,
        ctx: RunContext,
        options: PageOptions,
    ) -> NavegarResult<Self> {
        if options.firstload {
            lock(&driver).goto(definition.url())?;
        }
        let mut page = Self::from_parts(definition, driver, ctx);
        if options.firstload {
            page.clear_unload_checks();
        }
        lifecycle::finalize(page, &options)
    }

    /// Page-object name
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Declarative definition backing this instance
    #[must_use]
    pub fn definition(&self) -> &PageDefinition {
        &self.definition
    }

    /// Shared handle to the test's browser session
    #[must_use]
    pub fn driver(&self) -> DriverHandle {
        std::sync::Arc::clone(&self.driver)
    }

    /// The run's context handle
    #[must_use]
    pub fn ctx(&self) -> &RunContext {
        &self.ctx
    }

    /// URL the browser currently reports
    pub fn current_url(&self) -> NavegarResult<String> {
        lock(&self.driver).current_url()
    }

    /// Drop all declared unload checks from this instance
    pub fn clear_unload_checks(&mut self) {
        self.definition.unload_checks.clear();
    }

    /// Evaluate the declared unload checks against the live session.
    ///
    /// No declared checks is permitted (first loads cannot sensibly be
    /// unload-checked): the stage passes trivially with a warning.
    pub fn verify_unload(&self, options: &WaitOptions) -> NavegarResult<()> {
        if self.definition.unload_checks.is_empty() {
            tracing::warn!(
                page = self.name(),
                "no unload checks declared, skipping unload verification"
            );
            return Ok(());
        }
        let failures = checks::run_checks(&self.driver, &self.definition.unload_checks, options)?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NavegarError::PageUnload {
                page: self.name().to_string(),
                failures,
            })
        }
    }

    /// Evaluate the declared load checks, batching failures.
    ///
    /// Returns the failure set rather than raising so the caller can record
    /// the transition event before deciding the stage's outcome. No
    /// declared checks passes trivially with a warning.
    pub fn run_load_checks(&self, options: &WaitOptions) -> NavegarResult<Vec<CheckFailure>> {
        if self.definition.load_checks.is_empty() {
            tracing::warn!(
                page = self.name(),
                "no load checks declared, skipping load verification"
            );
            return Ok(Vec::new());
        }
        checks::run_checks(&self.driver, &self.definition.load_checks, options)
    }

    /// Evaluate the declared load checks; any failure is an error.
    pub fn verify_load(&self, options: &WaitOptions) -> NavegarResult<()> {
        let failures = self.run_load_checks(options)?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NavegarError::PageLoad {
                page: self.name().to_string(),
                failures,
            })
        }
    }

    /// Run the declared identity checks; any `false` result is an error.
    pub fn verify_identity(&self, options: &WaitOptions) -> NavegarResult<()> {
        let failures = checks::run_identity_checks(
            &self.driver,
            &self.definition.identity_checks,
            &self.definition.url,
            self.definition.title(),
            options,
        )?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NavegarError::Identity {
                page: self.name().to_string(),
                failures,
            })
        }
    }

    /// Transition to another page object by routing identifier.
    ///
    /// Consumes this instance: once the next page object is constructed on
    /// the same session handle, this one is stale and must not be used.
    pub fn load_pageobject(
        self,
        target: &str,
        cross_auth_boundary: bool,
        options: PageOptions,
    ) -> NavegarResult<PageObject> {
        lifecycle::load_pageobject(self, target, cross_auth_boundary, options)
    }

    /// Navigate through the page's menu to a destination, then transition.
    pub fn select_page_from_top_menu(
        self,
        destination: &str,
        cross_auth_boundary: bool,
        options: PageOptions,
    ) -> NavegarResult<PageObject> {
        navigation::select_page_from_top_menu(self, destination, cross_auth_boundary, options)
    }

    /// Click an element, recording the interaction
    pub fn click(&self, locator: &Locator) -> NavegarResult<()> {
        interaction::click(self, locator)
    }

    /// Hover over an element, recording the interaction
    pub fn hover(&self, locator: &Locator) -> NavegarResult<()> {
        interaction::hover(self, locator)
    }

    /// Type text into an element, recording the interaction
    pub fn fill(&self, locator: &Locator, text: &str) -> NavegarResult<()> {
        interaction::fill(self, locator, text)
    }

    /// Clear an input element and verify it emptied
    pub fn clear_field(&self, locator: &Locator) -> NavegarResult<()> {
        interaction::clear(self, locator)
    }

    /// Submit the form owning an element, recording the interaction
    pub fn submit(&self, locator: &Locator) -> NavegarResult<()> {
        interaction::submit(self, locator)
    }
}
