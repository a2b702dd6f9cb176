//! Routing and page-object resolution.
//!
//! Each site registers its page objects in two namespaces: pages reachable
//! without authentication and pages reachable only while authenticated.
//! Registration is a static table from page name to a definition factory:
//! there is no reflection and no stringly-typed module loading. A name
//! either resolves to a registered factory or fails as a configuration
//! error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::page_object::PageDefinition;
use crate::result::{NavegarError, NavegarResult};

/// Which side of the auth boundary a page lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMode {
    /// Reachable without logging in
    #[serde(rename = "noauth")]
    NoAuth,
    /// Reachable only while authenticated
    #[serde(rename = "auth")]
    Auth,
}

impl AuthMode {
    /// The namespace on the other side of the auth boundary
    #[must_use]
    pub const fn crossed(&self) -> Self {
        match self {
            Self::NoAuth => Self::Auth,
            Self::Auth => Self::NoAuth,
        }
    }

    /// Token string for the namespace
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAuth => "noauth",
            Self::Auth => "auth",
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Factory producing a page definition for a registered name
pub type PageFactory = fn() -> PageDefinition;

/// Select which namespace a transition resolves in.
///
/// Staying put keeps the current page's namespace; an explicit boundary
/// crossing (login/logout transitions) switches to the other one. Picking
/// the wrong namespace would silently resolve the wrong page, which is why
/// the crossing is never inferred.
#[must_use]
pub const fn select_map(current: AuthMode, cross_auth_boundary: bool) -> AuthMode {
    if cross_auth_boundary {
        current.crossed()
    } else {
        current
    }
}

/// Per-site routing table, partitioned by auth namespace
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    noauth: HashMap<String, PageFactory>,
    auth: HashMap<String, PageFactory>,
}

impl RoutingTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page factory under a name in one namespace.
    ///
    /// A name may exist in exactly one of the two namespaces; registering
    /// it twice anywhere is a configuration error.
    pub fn register(
        &mut self,
        mode: AuthMode,
        name: impl Into<String>,
        factory: PageFactory,
    ) -> NavegarResult<()> {
        let name = name.into();
        if self.noauth.contains_key(&name) || self.auth.contains_key(&name) {
            return Err(NavegarError::DuplicatePage { name });
        }
        match mode {
            AuthMode::NoAuth => self.noauth.insert(name, factory),
            AuthMode::Auth => self.auth.insert(name, factory),
        };
        Ok(())
    }

    /// Look up a name in one namespace.
    ///
    /// A missing key is a fatal configuration error in the per-site page
    /// definitions, not a transient runtime condition: it surfaces
    /// immediately and is never retried.
    pub fn resolve(&self, mode: AuthMode, name: &str) -> NavegarResult<PageFactory> {
        let map = match mode {
            AuthMode::NoAuth => &self.noauth,
            AuthMode::Auth => &self.auth,
        };
        map.get(name)
            .copied()
            .ok_or_else(|| NavegarError::UnknownPage {
                name: name.to_string(),
                mode,
            })
    }

    /// Which namespace a name is registered in, if any
    #[must_use]
    pub fn mode_of(&self, name: &str) -> Option<AuthMode> {
        if self.noauth.contains_key(name) {
            Some(AuthMode::NoAuth)
        } else if self.auth.contains_key(name) {
            Some(AuthMode::Auth)
        } else {
            None
        }
    }

    /// Verify every referenced name resolves in exactly one namespace.
    ///
    /// Returns the names that do not, for reporting.
    pub fn verify_completeness<'a>(
        &self,
        referenced: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), Vec<String>> {
        let missing: Vec<String> = referenced
            .into_iter()
            .filter(|name| self.mode_of(name).is_none())
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Total number of registered pages across both namespaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.noauth.len() + self.auth.len()
    }

    /// Whether no pages are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.noauth.is_empty() && self.auth.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::page_object::PageDefinition;

    fn home() -> PageDefinition {
        PageDefinition::new("home", "https://example.com/")
    }

    fn dashboard() -> PageDefinition {
        PageDefinition::new("dashboard", "https://example.com/app").with_auth_mode(AuthMode::Auth)
    }

    mod auth_mode_tests {
        use super::*;

        #[test]
        fn test_crossed() {
            assert_eq!(AuthMode::NoAuth.crossed(), AuthMode::Auth);
            assert_eq!(AuthMode::Auth.crossed(), AuthMode::NoAuth);
        }

        #[test]
        fn test_serde_tokens() {
            assert_eq!(serde_json::to_string(&AuthMode::NoAuth).unwrap(), "\"noauth\"");
            assert_eq!(serde_json::to_string(&AuthMode::Auth).unwrap(), "\"auth\"");
        }
    }

    mod select_map_tests {
        use super::*;

        #[test]
        fn test_full_decision_table() {
            assert_eq!(select_map(AuthMode::NoAuth, false), AuthMode::NoAuth);
            assert_eq!(select_map(AuthMode::NoAuth, true), AuthMode::Auth);
            assert_eq!(select_map(AuthMode::Auth, false), AuthMode::Auth);
            assert_eq!(select_map(AuthMode::Auth, true), AuthMode::NoAuth);
        }
    }

    mod routing_table_tests {
        use super::*;

        #[test]
        fn test_register_and_resolve() {
            let mut table = RoutingTable::new();
            table.register(AuthMode::NoAuth, "home", home).unwrap();
            table.register(AuthMode::Auth, "dashboard", dashboard).unwrap();
            assert_eq!(table.len(), 2);

            let factory = table.resolve(AuthMode::NoAuth, "home").unwrap();
            assert_eq!(factory().name(), "home");
        }

        #[test]
        fn test_unknown_name_is_fatal_config_error() {
            let table = RoutingTable::new();
            let err = table.resolve(AuthMode::NoAuth, "pricing").unwrap_err();
            assert!(err.is_configuration());
            assert!(matches!(err, NavegarError::UnknownPage { .. }));
        }

        #[test]
        fn test_namespaces_do_not_leak() {
            let mut table = RoutingTable::new();
            table.register(AuthMode::Auth, "dashboard", dashboard).unwrap();
            assert!(table.resolve(AuthMode::NoAuth, "dashboard").is_err());
            assert!(table.resolve(AuthMode::Auth, "dashboard").is_ok());
        }

        #[test]
        fn test_duplicate_rejected_across_namespaces() {
            let mut table = RoutingTable::new();
            table.register(AuthMode::NoAuth, "home", home).unwrap();
            let err = table.register(AuthMode::Auth, "home", home).unwrap_err();
            assert!(matches!(err, NavegarError::DuplicatePage { .. }));
        }

        #[test]
        fn test_mode_of() {
            let mut table = RoutingTable::new();
            table.register(AuthMode::NoAuth, "home", home).unwrap();
            assert_eq!(table.mode_of("home"), Some(AuthMode::NoAuth));
            assert_eq!(table.mode_of("pricing"), None);
        }

        #[test]
        fn test_verify_completeness() {
            let mut table = RoutingTable::new();
            table.register(AuthMode::NoAuth, "home", home).unwrap();
            table.register(AuthMode::Auth, "dashboard", dashboard).unwrap();

            assert!(table.verify_completeness(["home", "dashboard"]).is_ok());
            let missing = table
                .verify_completeness(["home", "pricing", "checkout"])
                .unwrap_err();
            assert_eq!(missing, vec!["pricing".to_string(), "checkout".to_string()]);
        }
    }
}
