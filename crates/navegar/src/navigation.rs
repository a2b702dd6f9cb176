//! Multi-stage menu traversal.
//!
//! Marketing-site navigation menus are too heterogeneous to unify: some
//! open on hover, some on click, some need the viewport scrolled before the
//! nav bar is interactive, and destination links may sit one or two stages
//! deep. Each site's quirks live in its own [`NavigationTable`], which is
//! pure data interpreted by the one shared traversal algorithm in
//! [`select_page_from_top_menu`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics;
use crate::interaction;
use crate::lifecycle;
use crate::locator::{CheckFailure, Locator};
use crate::page_object::{PageObject, PageOptions};
use crate::result::{NavegarError, NavegarResult};
use crate::wait::{self, UrlPattern};

/// How the stage-1 element exposes its submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuOpen {
    /// Hover over stage 1 to reveal the submenu
    Hover,
    /// Click stage 1 to reveal the submenu
    Click,
    /// No submenu; stage 1 is not touched before the destination click
    Direct,
}

/// One destination in a page's menu: locator stages and traversal hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTarget {
    /// Menu-opening element (or the destination itself for flat menus)
    pub stage1: Locator,
    /// Destination link; stage 1 is used when absent
    #[serde(default)]
    pub stage2: Option<Locator>,
    /// How the submenu is exposed
    #[serde(default = "MenuTarget::default_open")]
    pub open: MenuOpen,
    /// Scroll the viewport here before touching the menu
    #[serde(default)]
    pub scroll_to: Option<(i64, i64)>,
    /// Whether the destination click is expected to change the URL
    #[serde(default = "MenuTarget::default_expect_url_change")]
    pub expect_url_change: bool,
    /// Explicit redirect target to wait for instead of any URL change
    #[serde(default)]
    pub expected_url: Option<UrlPattern>,
}

impl MenuTarget {
    const fn default_open() -> MenuOpen {
        MenuOpen::Direct
    }

    const fn default_expect_url_change() -> bool {
        true
    }

    /// Flat menu entry: the stage-1 element is the destination link
    #[must_use]
    pub fn new(stage1: Locator) -> Self {
        Self {
            stage1,
            stage2: None,
            open: MenuOpen::Direct,
            scroll_to: None,
            expect_url_change: true,
            expected_url: None,
        }
    }

    /// Set the destination link for a two-stage menu
    #[must_use]
    pub fn with_stage2(mut self, stage2: Locator) -> Self {
        self.stage2 = Some(stage2);
        self
    }

    /// Set how the submenu is exposed
    #[must_use]
    pub const fn opened_by(mut self, open: MenuOpen) -> Self {
        self.open = open;
        self
    }

    /// Require a viewport scroll before the menu is touched
    #[must_use]
    pub const fn with_scroll_to(mut self, x: i64, y: i64) -> Self {
        self.scroll_to = Some((x, y));
        self
    }

    /// Declare the click is not expected to change the URL
    #[must_use]
    pub const fn without_url_change(mut self) -> Self {
        self.expect_url_change = false;
        self
    }

    /// Wait for an explicit redirect target instead of any URL change
    #[must_use]
    pub fn with_expected_url(mut self, pattern: UrlPattern) -> Self {
        self.expected_url = Some(pattern);
        self
    }

    /// The element actually clicked: stage 2, falling back to stage 1
    #[must_use]
    pub fn destination(&self) -> &Locator {
        self.stage2.as_ref().unwrap_or(&self.stage1)
    }
}

/// A page's menu destinations, keyed by routing identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTable {
    targets: BTreeMap<String, MenuTarget>,
}

impl NavigationTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a destination
    pub fn insert(&mut self, destination: impl Into<String>, target: MenuTarget) {
        self.targets.insert(destination.into(), target);
    }

    /// Add a destination, chaining
    #[must_use]
    pub fn with_target(mut self, destination: impl Into<String>, target: MenuTarget) -> Self {
        self.insert(destination, target);
        self
    }

    /// Look up a destination
    #[must_use]
    pub fn get(&self, destination: &str) -> Option<&MenuTarget> {
        self.targets.get(destination)
    }

    /// All destination names, sorted
    #[must_use]
    pub fn destinations(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Number of destinations
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Traverse the current page's menu to a destination, then transition.
///
/// The destination name doubles as the routing identifier handed to the
/// lifecycle engine. The destination click retries exactly once, without
/// the unhover move, when the cursor's post-click offset lands outside the
/// viewport; that is the one automatic retry in the system. A URL that never
/// leaves the previous page within the bounded wait is reported as a
/// page-unload-class error with diagnostics captured.
pub fn select_page_from_top_menu(
    current: PageObject,
    destination: &str,
    cross_auth_boundary: bool,
    options: PageOptions,
) -> NavegarResult<PageObject> {
    let target = current
        .definition()
        .nav()
        .get(destination)
        .cloned()
        .ok_or_else(|| NavegarError::UnknownMenuTarget {
            page: current.name().to_string(),
            destination: destination.to_string(),
        })?;

    if let Some((x, y)) = target.scroll_to {
        crate::driver::lock(&current.driver()).scroll_to(x, y)?;
    }

    match target.open {
        MenuOpen::Hover => interaction::hover(&current, &target.stage1)?,
        MenuOpen::Click => interaction::click(&current, &target.stage1)?,
        MenuOpen::Direct => {}
    }

    let before_url = current.current_url()?;
    match interaction::click_and_unhover(&current, target.destination(), true) {
        Ok(()) => {}
        Err(e) if e.is_transient() => {
            tracing::warn!(
                destination,
                error = %e,
                "unhover left the viewport, retrying click once without it"
            );
            interaction::click_and_unhover(&current, target.destination(), false)?;
        }
        Err(e) => return Err(e),
    }

    if target.expect_url_change {
        if let Err(e) = wait::wait_for_url_change(
            &current.driver(),
            &before_url,
            target.expected_url.as_ref(),
            &options.url_wait,
        ) {
            let NavegarError::Timeout { ms } = e else {
                return Err(e);
            };
            let event = current.ctx().record_event(
                format!("url never left {before_url} heading for {destination}"),
                current.name(),
            );
            diagnostics::capture_failure(&current.driver(), current.ctx(), &event.key());
            return Err(NavegarError::PageUnload {
                page: current.name().to_string(),
                failures: vec![CheckFailure::for_condition(
                    format!("url change from {before_url}"),
                    "url did not change or match the expected redirect target",
                    ms,
                )],
            });
        }
    }

    lifecycle::load_pageobject(current, destination, cross_auth_boundary, options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::checks::IdentityCheck;
    use crate::context::{CaptureConfig, RunContext};
    use crate::driver::DriverHandle;
    use crate::locator::Check;
    use crate::mock::{MockDriver, PageState};
    use crate::page_object::PageDefinition;
    use crate::routing::{AuthMode, RoutingTable};
    use crate::wait::WaitOptions;

    fn pricing_heading() -> Locator {
        Locator::css("h1.pricing")
    }

    fn pricing_definition() -> PageDefinition {
        PageDefinition::new("pricing", "https://example.com/pricing")
            .with_identity_check(IdentityCheck::Url)
            .with_load_check(Check::present(pricing_heading()))
    }

    fn ctx() -> RunContext {
        let mut table = RoutingTable::new();
        table
            .register(AuthMode::NoAuth, "pricing", pricing_definition)
            .unwrap();
        RunContext::builder("navigation_tests")
            .with_artifact_dir(std::env::temp_dir().join("navegar-navigation-tests"))
            .with_capture(CaptureConfig::none())
            .with_routing(table)
            .build()
    }

    fn fast() -> PageOptions {
        PageOptions::new()
            .with_wait(WaitOptions::fast())
            .with_url_wait(WaitOptions::fast())
    }

    fn products_menu() -> Locator {
        Locator::css("nav .products")
    }

    fn pricing_link() -> Locator {
        Locator::css("nav .products a.pricing")
    }

    /// Home page whose hover menu reveals the pricing link
    fn hover_site(mock_mods: impl FnOnce(MockDriver) -> MockDriver) -> (Arc<Mutex<MockDriver>>, PageObject) {
        let driver = MockDriver::new()
            .with_page("https://example.com/", "Home")
            .with_element(products_menu())
            .on_hover(products_menu(), vec![pricing_link()])
            .on_activate(
                pricing_link(),
                PageState::new("https://example.com/pricing", "Pricing")
                    .with_element(pricing_heading()),
            );
        let mock = Arc::new(Mutex::new(mock_mods(driver)));
        let handle: DriverHandle = mock.clone();
        let definition = PageDefinition::new("home", "https://example.com/").with_nav_target(
            "pricing",
            MenuTarget::new(products_menu())
                .opened_by(MenuOpen::Hover)
                .with_stage2(pricing_link())
                .with_scroll_to(0, 0),
        );
        let page = PageObject::from_parts(definition, handle, ctx());
        (mock, page)
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_destination_falls_back_to_stage1() {
            let flat = MenuTarget::new(pricing_link());
            assert_eq!(flat.destination(), &pricing_link());

            let nested = MenuTarget::new(products_menu()).with_stage2(pricing_link());
            assert_eq!(nested.destination(), &pricing_link());
        }

        #[test]
        fn test_table_lookup_and_names() {
            let table = NavigationTable::new()
                .with_target("pricing", MenuTarget::new(pricing_link()))
                .with_target("about", MenuTarget::new(Locator::css("nav a.about")));
            assert_eq!(table.len(), 2);
            assert_eq!(table.destinations(), vec!["about", "pricing"]);
            assert!(table.get("pricing").is_some());
            assert!(table.get("careers").is_none());
        }

        #[test]
        fn test_every_destination_resolves_in_routing() {
            // every name a navigation table references must exist in
            // exactly one of the site's routing namespaces
            let (_mock, home) = hover_site(|d| d);
            let routing = home.ctx().routing();
            assert!(routing
                .verify_completeness(home.definition().nav().destinations())
                .is_ok());
        }

        #[test]
        fn test_menu_target_serde_defaults() {
            let json = r#"{"stage1":{"strategy":"css","value":"nav a"}}"#;
            let target: MenuTarget = serde_json::from_str(json).unwrap();
            assert_eq!(target.open, MenuOpen::Direct);
            assert!(target.expect_url_change);
            assert!(target.stage2.is_none());
        }
    }

    mod traversal_tests {
        use super::*;

        #[test]
        fn test_hover_menu_traversal() {
            let (mock, home) = hover_site(|d| d);
            let pricing = home
                .select_page_from_top_menu("pricing", false, fast())
                .unwrap();
            assert_eq!(pricing.name(), "pricing");

            let mock = mock.lock().unwrap();
            assert!(mock.was_called("scroll:0,0"));
            assert!(mock.was_called("hover:css=nav .products"));
            assert_eq!(mock.call_count("click:css=nav .products a.pricing"), 1);
            assert_eq!(mock.call_count("move:"), 1);
        }

        #[test]
        fn test_out_of_viewport_retried_exactly_once() {
            let (mock, home) = hover_site(|d| d.fail_unhover_times(1));
            let pricing = home
                .select_page_from_top_menu("pricing", false, fast())
                .unwrap();
            assert_eq!(pricing.name(), "pricing");

            let mock = mock.lock().unwrap();
            // one failed click+unhover, one retried click without unhover
            assert_eq!(mock.call_count("click:css=nav .products a.pricing"), 2);
            assert_eq!(mock.call_count("move:"), 1);
        }

        #[test]
        fn test_second_transient_failure_propagates() {
            // if the retry itself could fail the same way we would loop; the
            // retry deliberately skips the unhover, so a driver failing every
            // move still succeeds on the retry path. Force a non-transient
            // failure instead: destination missing entirely.
            let (_mock, home) = hover_site(|d| d);
            let definition = PageDefinition::new("home", "https://example.com/").with_nav_target(
                "pricing",
                MenuTarget::new(Locator::css("nav a.gone")),
            );
            let page = PageObject::from_parts(definition, home.driver(), ctx());
            let err = page
                .select_page_from_top_menu("pricing", false, fast())
                .unwrap_err();
            assert!(matches!(err, NavegarError::ElementMissing { .. }));
        }

        #[test]
        fn test_unknown_destination_is_config_error() {
            let (_mock, home) = hover_site(|d| d);
            let err = home
                .select_page_from_top_menu("careers", false, fast())
                .unwrap_err();
            match err {
                NavegarError::UnknownMenuTarget { page, destination } => {
                    assert_eq!(page, "home");
                    assert_eq!(destination, "careers");
                }
                other => panic!("expected UnknownMenuTarget, got {other:?}"),
            }
        }

        #[test]
        fn test_stuck_url_raises_unload_class_error() {
            // the click is swallowed: no scripted transition, URL never moves
            let stay_link = Locator::css("nav a.stay");
            let driver = MockDriver::new()
                .with_page("https://example.com/", "Home")
                .with_element(stay_link.clone())
                .into_handle();
            let definition = PageDefinition::new("home", "https://example.com/")
                .with_nav_target("pricing", MenuTarget::new(stay_link));
            let home = PageObject::from_parts(definition, driver, ctx());

            let err = home
                .select_page_from_top_menu("pricing", false, fast())
                .unwrap_err();
            match err {
                NavegarError::PageUnload { page, failures } => {
                    assert_eq!(page, "home");
                    assert!(failures[0].description.contains("url change"));
                }
                other => panic!("expected PageUnload, got {other:?}"),
            }
        }

        #[test]
        fn test_expected_redirect_target() {
            // the site redirects to a checkout URL that differs from the
            // destination's declared URL; the table declares the redirect
            let buy_link = Locator::css("nav a.buy");
            let driver = MockDriver::new()
                .with_page("https://example.com/", "Home")
                .with_element(buy_link.clone())
                .on_activate(
                    buy_link.clone(),
                    PageState::new("https://example.com/pricing?src=buy", "Pricing")
                        .with_element(pricing_heading()),
                )
                .into_handle();
            let definition = PageDefinition::new("home", "https://example.com/").with_nav_target(
                "pricing",
                MenuTarget::new(buy_link)
                    .with_expected_url(UrlPattern::Contains("/pricing".into())),
            );
            let home = PageObject::from_parts(definition, driver, ctx());

            let pricing = home
                .select_page_from_top_menu("pricing", false, fast())
                .unwrap();
            assert_eq!(pricing.name(), "pricing");
        }
    }
}
