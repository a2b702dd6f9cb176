//! Locator strategies and check tuples.
//!
//! A [`Locator`] names one element in a live page: a strategy (how to look)
//! plus a value (what to look for). A [`Check`] pairs a locator with an
//! expected presence, forming the declarative load/unload check entries that
//! page definitions carry.

use serde::{Deserialize, Serialize};

/// Locator strategy for finding elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Element id attribute
    Id,
    /// CSS selector
    Css,
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// Anchor text content
    LinkText,
    /// Tag name
    TagName,
}

impl Strategy {
    /// Get the strategy token string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::LinkText => "link_text",
            Self::TagName => "tag_name",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A locator: strategy plus value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// How to look for the element
    pub strategy: Strategy,
    /// What to look for
    pub value: String,
}

impl Locator {
    /// Create a locator with an explicit strategy
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Locate by element id
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// Locate by XPath expression
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Locate by anchor text
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag(value: impl Into<String>) -> Self {
        Self::new(Strategy::TagName, value)
    }

    /// Convert to a JavaScript expression evaluating to the element or null
    #[must_use]
    pub fn to_query(&self) -> String {
        match self.strategy {
            Strategy::Id => format!("document.getElementById({:?})", self.value),
            Strategy::Css => format!("document.querySelector({:?})", self.value),
            Strategy::XPath => format!(
                "document.evaluate({:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                self.value
            ),
            Strategy::LinkText => format!(
                "Array.from(document.querySelectorAll('a')).find(el => el.textContent.trim() === {:?})",
                self.value
            ),
            Strategy::TagName => format!("document.getElementsByTagName({:?})[0]", self.value),
        }
    }

    /// Convert to a JavaScript expression evaluating to a visibility boolean
    #[must_use]
    pub fn to_visible_query(&self) -> String {
        format!(
            "(function() {{ const el = {}; return !!el && el.getClientRects().length > 0; }})()",
            self.to_query()
        )
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// One declarative load/unload check: expected presence plus a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Pass iff the element is present and visible (true) or confirmed
    /// absent (false) within the bounded wait
    pub expect_present: bool,
    /// The element under check
    pub locator: Locator,
}

impl Check {
    /// Expect the element to be present and visible
    #[must_use]
    pub const fn present(locator: Locator) -> Self {
        Self {
            expect_present: true,
            locator,
        }
    }

    /// Expect the element to be absent
    #[must_use]
    pub const fn absent(locator: Locator) -> Self {
        Self {
            expect_present: false,
            locator,
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.expect_present {
            write!(f, "present {}", self.locator)
        } else {
            write!(f, "absent {}", self.locator)
        }
    }
}

/// Structured descriptor of one failed check
///
/// Element checks return these instead of raising, so callers can batch
/// several failures before deciding overall pass/fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// What was checked (display form, e.g. `present css=h1.hero`)
    pub description: String,
    /// Why it failed
    pub reason: String,
    /// How long the bounded wait ran before giving up
    pub elapsed_ms: u64,
}

impl CheckFailure {
    /// Build a failure descriptor for a check tuple
    #[must_use]
    pub fn for_check(check: &Check, reason: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            description: check.to_string(),
            reason: reason.into(),
            elapsed_ms,
        }
    }

    /// Build a failure descriptor for a non-element condition (URL waits)
    #[must_use]
    pub fn for_condition(
        description: impl Into<String>,
        reason: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            description: description.into(),
            reason: reason.into(),
            elapsed_ms,
        }
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (after {}ms)",
            self.description, self.reason, self.elapsed_ms
        )
    }
}
