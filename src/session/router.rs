//! Authorization routing.
//!
//! Pure mapping from the session's two gates to the navigation subtree the
//! frontend should mount. Recomputed from every published snapshot, so a
//! missed edge can never strand the UI in a stale subtree.

use serde::{Deserialize, Serialize};

/// The four navigation subtrees. At most one is mounted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Route {
    Onboarding,
    Authentication,
    Private,
    /// Defensive default; unreachable under the rules in `for_session`.
    PublicFallback,
}

impl Route {
    /// Select the subtree for the given gates. Checked in order, first
    /// match wins.
    pub fn for_session(is_authenticated: bool, is_onboarded: bool) -> Self {
        if !is_authenticated && !is_onboarded {
            return Route::Onboarding;
        }
        if !is_authenticated && is_onboarded {
            return Route::Authentication;
        }
        if is_authenticated {
            return Route::Private;
        }
        Route::PublicFallback
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Onboarding => write!(f, "Onboarding"),
            Route::Authentication => write!(f, "Authentication"),
            Route::Private => write!(f, "Private"),
            Route::PublicFallback => write!(f, "Public"),
        }
    }
}

/// Remount key for the navigation container.
///
/// The container and its whole subtree must be discarded and rebuilt whenever
/// this key changes; updating only the top screen leaks back-stack entries
/// across the authentication boundary.
pub fn container_key(is_authenticated: bool) -> &'static str {
    if is_authenticated {
        "authenticated"
    } else {
        "unauthenticated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_truth_table() {
        assert_eq!(Route::for_session(false, false), Route::Onboarding);
        assert_eq!(Route::for_session(false, true), Route::Authentication);
        assert_eq!(Route::for_session(true, false), Route::Private);
        assert_eq!(Route::for_session(true, true), Route::Private);
    }

    #[test]
    fn test_container_key_tracks_auth_edge() {
        assert_eq!(container_key(false), "unauthenticated");
        assert_eq!(container_key(true), "authenticated");
    }
}
