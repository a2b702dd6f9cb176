//! Check primitives.
//!
//! Element checks poll a bounded wait and return a failure descriptor
//! instead of raising, so callers can batch several failures before
//! deciding overall pass/fail. URL checks read the session once. Title
//! checks wait, because titles routinely lag a navigation by a render
//! frame or two.

use serde::{Deserialize, Serialize};

use crate::driver::{lock, DriverHandle};
use crate::locator::{Check, CheckFailure, Locator};
use crate::result::{NavegarError, NavegarResult};
use crate::wait::{poll_until, WaitOptions};

/// Identity check kinds: how the browser is confirmed to be displaying the
/// expected page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityCheck {
    /// Browser title equals the declared title
    Title,
    /// Declared URL is contained in the current URL
    Url,
    /// Declared URL equals the current URL exactly
    ExactUrl,
    /// Every chunk is contained in the current URL
    UrlChunks(Vec<String>),
}

impl std::fmt::Display for IdentityCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Url => write!(f, "url"),
            Self::ExactUrl => write!(f, "exact_url"),
            Self::UrlChunks(chunks) => write!(f, "url_chunks[{}]", chunks.len()),
        }
    }
}

/// Structured descriptor of one failed identity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFailure {
    /// Which check failed (display form)
    pub check: String,
    /// What the page declared
    pub expected: String,
    /// What the browser reported
    pub actual: String,
}

impl std::fmt::Display for IdentityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {:?}, got {:?}",
            self.check, self.expected, self.actual
        )
    }
}

/// Wait (bounded) for the browser title to equal `expected`.
pub fn check_title(
    driver: &DriverHandle,
    expected: &str,
    options: &WaitOptions,
) -> NavegarResult<bool> {
    let result = poll_until(options, || Ok(lock(driver).title()? == expected));
    match result {
        Ok(_) => Ok(true),
        Err(NavegarError::Timeout { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// True iff the declared URL is a substring of the current browser URL.
///
/// Inclusion semantics tolerate trailing query strings and fragments.
pub fn check_url(driver: &DriverHandle, expected: &str) -> NavegarResult<bool> {
    Ok(lock(driver).current_url()?.contains(expected))
}

/// True iff the declared URL equals the current browser URL exactly.
pub fn check_exact_url(driver: &DriverHandle, expected: &str) -> NavegarResult<bool> {
    Ok(lock(driver).current_url()? == expected)
}

/// Evaluate each chunk against the current URL independently.
///
/// Used when no single contiguous expected URL exists; returns one boolean
/// per chunk, in input order.
pub fn check_url_chunks(
    driver: &DriverHandle,
    chunks: &[String],
) -> NavegarResult<Vec<(String, bool)>> {
    let url = lock(driver).current_url()?;
    Ok(chunks
        .iter()
        .map(|chunk| (chunk.clone(), url.contains(chunk.as_str())))
        .collect())
}

/// Poll until the element is present and visible; a timeout yields a
/// failure descriptor, not an error.
pub fn expect_element_to_be_present(
    driver: &DriverHandle,
    locator: &Locator,
    options: &WaitOptions,
) -> NavegarResult<Option<CheckFailure>> {
    let result = poll_until(options, || lock(driver).is_present(locator));
    match result {
        Ok(_) => Ok(None),
        Err(NavegarError::Timeout { ms }) => Ok(Some(CheckFailure::for_check(
            &Check::present(locator.clone()),
            "element not present within bounded wait",
            ms,
        ))),
        Err(e) => Err(e),
    }
}

/// Poll until the element is confirmed absent; a timeout yields a failure
/// descriptor, not an error.
pub fn expect_element_to_be_gone(
    driver: &DriverHandle,
    locator: &Locator,
    options: &WaitOptions,
) -> NavegarResult<Option<CheckFailure>> {
    let result = poll_until(options, || Ok(!lock(driver).is_present(locator)?));
    match result {
        Ok(_) => Ok(None),
        Err(NavegarError::Timeout { ms }) => Ok(Some(CheckFailure::for_check(
            &Check::absent(locator.clone()),
            "element still present after bounded wait",
            ms,
        ))),
        Err(e) => Err(e),
    }
}

/// Evaluate a check list, each entry with its own independent bounded wait,
/// batching failures.
pub fn run_checks(
    driver: &DriverHandle,
    checks: &[Check],
    options: &WaitOptions,
) -> NavegarResult<Vec<CheckFailure>> {
    let mut failures = Vec::new();
    for check in checks {
        let outcome = if check.expect_present {
            expect_element_to_be_present(driver, &check.locator, options)?
        } else {
            expect_element_to_be_gone(driver, &check.locator, options)?
        };
        if let Some(failure) = outcome {
            tracing::debug!(check = %check, "check failed");
            failures.push(failure);
        }
    }
    Ok(failures)
}

/// Run the declared identity checks in order against the live session.
///
/// Any single `false` result becomes a failure descriptor. A driver-level
/// [`NavegarError::ElementMissing`] signals the browser is probably not
/// displaying a recognizable page at all: it is escalated immediately and
/// short-circuits the remaining checks.
pub fn run_identity_checks(
    driver: &DriverHandle,
    checks: &[IdentityCheck],
    declared_url: &str,
    declared_title: Option<&str>,
    options: &WaitOptions,
) -> NavegarResult<Vec<IdentityFailure>> {
    let mut failures = Vec::new();
    for check in checks {
        match check {
            IdentityCheck::Title => {
                let expected = declared_title.unwrap_or_default();
                if !check_title(driver, expected, options)? {
                    failures.push(IdentityFailure {
                        check: check.to_string(),
                        expected: expected.to_string(),
                        actual: lock(driver).title()?,
                    });
                }
            }
            IdentityCheck::Url => {
                if !check_url(driver, declared_url)? {
                    failures.push(IdentityFailure {
                        check: check.to_string(),
                        expected: declared_url.to_string(),
                        actual: lock(driver).current_url()?,
                    });
                }
            }
            IdentityCheck::ExactUrl => {
                if !check_exact_url(driver, declared_url)? {
                    failures.push(IdentityFailure {
                        check: check.to_string(),
                        expected: declared_url.to_string(),
                        actual: lock(driver).current_url()?,
                    });
                }
            }
            IdentityCheck::UrlChunks(chunks) => {
                for (chunk, hit) in check_url_chunks(driver, chunks)? {
                    if !hit {
                        failures.push(IdentityFailure {
                            check: check.to_string(),
                            expected: chunk,
                            actual: lock(driver).current_url()?,
                        });
                    }
                }
            }
        }
    }
    Ok(failures)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    fn pricing_driver() -> DriverHandle {
        MockDriver::new()
            .with_page("https://example.com/pricing?ref=nav", "Pricing")
            .with_element(Locator::css("h1.pricing"))
            .into_handle()
    }

    mod url_check_tests {
        use super::*;

        #[test]
        fn test_inclusion_tolerates_query_string() {
            let driver = pricing_driver();
            assert!(check_url(&driver, "/pricing").unwrap());
        }

        #[test]
        fn test_exact_rejects_query_string() {
            let driver = pricing_driver();
            assert!(!check_exact_url(&driver, "https://example.com/pricing").unwrap());
            assert!(check_exact_url(&driver, "https://example.com/pricing?ref=nav").unwrap());
        }

        #[test]
        fn test_url_chunks_independent_results() {
            let driver = pricing_driver();
            let results = check_url_chunks(
                &driver,
                &["example.com".to_string(), "/pricing".to_string(), "/missing".to_string()],
            )
            .unwrap();
            assert_eq!(results.len(), 3);
            assert!(results[0].1);
            assert!(results[1].1);
            assert!(!results[2].1);
        }
    }

    mod title_check_tests {
        use super::*;

        #[test]
        fn test_title_match() {
            let driver = pricing_driver();
            assert!(check_title(&driver, "Pricing", &WaitOptions::fast()).unwrap());
        }

        #[test]
        fn test_title_mismatch_is_false_not_error() {
            let driver = pricing_driver();
            assert!(!check_title(&driver, "Checkout", &WaitOptions::fast()).unwrap());
        }

        #[test]
        fn test_unreadable_title_propagates() {
            let driver = MockDriver::new().with_unreadable_title().into_handle();
            let result = check_title(&driver, "Pricing", &WaitOptions::fast());
            assert!(matches!(result, Err(NavegarError::ElementMissing { .. })));
        }
    }

    mod element_check_tests {
        use super::*;

        #[test]
        fn test_present_element_yields_no_failure() {
            let driver = pricing_driver();
            let outcome = expect_element_to_be_present(
                &driver,
                &Locator::css("h1.pricing"),
                &WaitOptions::fast(),
            )
            .unwrap();
            assert!(outcome.is_none());
        }

        #[test]
        fn test_missing_element_yields_descriptor() {
            let driver = pricing_driver();
            let outcome = expect_element_to_be_present(
                &driver,
                &Locator::css("h1.absent"),
                &WaitOptions::fast(),
            )
            .unwrap();
            let failure = outcome.unwrap();
            assert!(failure.description.contains("present css=h1.absent"));
        }

        #[test]
        fn test_gone_check_on_absent_element() {
            let driver = pricing_driver();
            let outcome = expect_element_to_be_gone(
                &driver,
                &Locator::css("h1.absent"),
                &WaitOptions::fast(),
            )
            .unwrap();
            assert!(outcome.is_none());
        }

        #[test]
        fn test_gone_check_on_lingering_element() {
            let driver = pricing_driver();
            let outcome = expect_element_to_be_gone(
                &driver,
                &Locator::css("h1.pricing"),
                &WaitOptions::fast(),
            )
            .unwrap();
            assert!(outcome.unwrap().description.contains("absent"));
        }

        #[test]
        fn test_checks_are_idempotent() {
            let driver = pricing_driver();
            let locator = Locator::css("h1.pricing");
            let first =
                expect_element_to_be_present(&driver, &locator, &WaitOptions::fast()).unwrap();
            let second =
                expect_element_to_be_present(&driver, &locator, &WaitOptions::fast()).unwrap();
            assert_eq!(first.is_none(), second.is_none());
        }

        #[test]
        fn test_run_checks_batches_failures() {
            let driver = pricing_driver();
            let checks = vec![
                Check::present(Locator::css("h1.pricing")),
                Check::present(Locator::css("h1.absent")),
                Check::absent(Locator::css("h1.pricing")),
            ];
            let failures = run_checks(&driver, &checks, &WaitOptions::fast()).unwrap();
            assert_eq!(failures.len(), 2);
        }
    }

    mod identity_check_tests {
        use super::*;

        #[test]
        fn test_all_pass() {
            let driver = pricing_driver();
            let failures = run_identity_checks(
                &driver,
                &[IdentityCheck::Url, IdentityCheck::Title],
                "https://example.com/pricing",
                Some("Pricing"),
                &WaitOptions::fast(),
            )
            .unwrap();
            assert!(failures.is_empty());
        }

        #[test]
        fn test_failures_carry_expected_and_actual() {
            let driver = pricing_driver();
            let failures = run_identity_checks(
                &driver,
                &[IdentityCheck::ExactUrl],
                "https://example.com/pricing",
                None,
                &WaitOptions::fast(),
            )
            .unwrap();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].expected, "https://example.com/pricing");
            assert!(failures[0].actual.contains("ref=nav"));
        }

        #[test]
        fn test_url_chunks_identity() {
            let driver = pricing_driver();
            let failures = run_identity_checks(
                &driver,
                &[IdentityCheck::UrlChunks(vec![
                    "example.com".to_string(),
                    "/plans".to_string(),
                ])],
                "https://example.com/pricing",
                None,
                &WaitOptions::fast(),
            )
            .unwrap();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].expected, "/plans");
        }

        #[test]
        fn test_element_missing_short_circuits() {
            let driver = MockDriver::new()
                .with_page("https://example.com/pricing", "ignored")
                .with_unreadable_title()
                .into_handle();
            let result = run_identity_checks(
                &driver,
                &[IdentityCheck::Title, IdentityCheck::Url],
                "https://example.com/pricing",
                Some("Pricing"),
                &WaitOptions::fast(),
            );
            assert!(matches!(result, Err(NavegarError::ElementMissing { .. })));
        }
    }
}
