//! Route table and authentication/role guards.
//!
//! Guards run client-side only and are not an authorization boundary; the
//! backend must enforce its own checks.

use crate::models::Role;
use crate::store::AuthStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/applications";

/// Pages of the court-index application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourtIndexPage {
    Upload,
    Processing,
    Result,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Applications,
    History,
    Users,
    Help,
    CourtIndex(CourtIndexPage),
    MasterDeduplication,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Dashboard => "/dashboard",
            Self::Applications => HOME_PATH,
            Self::History => "/history",
            Self::Users => "/users",
            Self::Help => "/help",
            Self::CourtIndex(CourtIndexPage::Upload) => "/apps/court-index/upload",
            Self::CourtIndex(CourtIndexPage::Processing) => "/apps/court-index/processing",
            Self::CourtIndex(CourtIndexPage::Result) => "/apps/court-index/result",
            Self::CourtIndex(CourtIndexPage::Download) => "/apps/court-index/download",
            Self::MasterDeduplication => "/apps/master-deduplication",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// Roles allowed on this route; `None` admits any signed-in user.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Self::Users => Some(&[Role::Admin]),
            _ => None,
        }
    }

    /// Application id recorded in the app store when this route is active.
    pub fn app_id(&self) -> Option<&'static str> {
        match self {
            Self::CourtIndex(_) => Some("court-index"),
            Self::MasterDeduplication => Some("master-deduplication"),
            _ => None,
        }
    }
}

/// Outcome of matching a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    Route(Route),
    Redirect(&'static str),
}

/// Match a path against the route table. Query strings, fragments and
/// trailing slashes are ignored.
pub fn match_path(path: &str) -> Match {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Match::Redirect(HOME_PATH),
        ["login"] => Match::Route(Route::Login),
        ["dashboard"] => Match::Route(Route::Dashboard),
        ["applications"] => Match::Route(Route::Applications),
        ["history"] => Match::Route(Route::History),
        ["users"] => Match::Route(Route::Users),
        ["help"] => Match::Route(Route::Help),
        ["apps", "court-index"] => Match::Redirect("/apps/court-index/upload"),
        ["apps", "court-index", page] => match *page {
            "upload" => Match::Route(Route::CourtIndex(CourtIndexPage::Upload)),
            "processing" => Match::Route(Route::CourtIndex(CourtIndexPage::Processing)),
            "result" => Match::Route(Route::CourtIndex(CourtIndexPage::Result)),
            "download" => Match::Route(Route::CourtIndex(CourtIndexPage::Download)),
            _ => Match::Redirect("/apps/court-index/upload"),
        },
        ["apps", "master-deduplication", ..] => Match::Route(Route::MasterDeduplication),
        _ => Match::Redirect(HOME_PATH),
    }
}

/// What the guard decided for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Allow(Route),
    Redirect(String),
    Forbidden(Route),
}

/// Match `path` and apply the authentication and role guards.
pub fn resolve(path: &str, auth: &AuthStore) -> Resolution {
    let route = match match_path(path) {
        Match::Route(route) => route,
        Match::Redirect(target) => return Resolution::Redirect(target.to_string()),
    };

    if route.is_public() {
        return Resolution::Allow(route);
    }
    if !auth.is_authenticated() {
        return Resolution::Redirect(LOGIN_PATH.to_string());
    }
    match route.allowed_roles() {
        Some(roles) if !auth.has_role(roles) => Resolution::Forbidden(route),
        _ => Resolution::Allow(route),
    }
}

/// Follow redirects until a route is allowed or forbidden.
pub fn resolve_final(path: &str, auth: &AuthStore) -> Resolution {
    let mut current = path.to_string();
    // the table redirects at most twice (unknown -> home -> login)
    for _ in 0..4 {
        match resolve(&current, auth) {
            Resolution::Redirect(next) if next != current => current = next,
            other => return other,
        }
    }
    Resolution::Redirect(current)
}

/// A sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Applications",
        route: Route::Applications,
    },
    NavItem {
        label: "Dashboard",
        route: Route::Dashboard,
    },
    NavItem {
        label: "History",
        route: Route::History,
    },
    NavItem {
        label: "Users",
        route: Route::Users,
    },
    NavItem {
        label: "Help",
        route: Route::Help,
    },
];

/// Sidebar entries the signed-in user may see.
pub fn visible_nav_items(auth: &AuthStore) -> Vec<&'static NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|item| {
            item.route
                .allowed_roles()
                .map_or(true, |roles| auth.has_role(roles))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionUser;

    fn signed_in(role: Role) -> AuthStore {
        let mut auth = AuthStore::in_memory();
        auth.login(
            SessionUser {
                id: "1".into(),
                name: "A".into(),
                email: "a@b.co".into(),
                role,
                avatar: None,
            },
            "server-session".into(),
        )
        .unwrap();
        auth
    }

    #[test]
    fn test_match_path() {
        assert_eq!(match_path("/"), Match::Redirect(HOME_PATH));
        assert_eq!(match_path("/history/"), Match::Route(Route::History));
        assert_eq!(match_path("/users?page=2"), Match::Route(Route::Users));
        assert_eq!(
            match_path("/apps/court-index"),
            Match::Redirect("/apps/court-index/upload")
        );
        assert_eq!(
            match_path("/apps/court-index/result"),
            Match::Route(Route::CourtIndex(CourtIndexPage::Result))
        );
        assert_eq!(
            match_path("/apps/master-deduplication/anything"),
            Match::Route(Route::MasterDeduplication)
        );
        assert_eq!(match_path("/nowhere"), Match::Redirect(HOME_PATH));
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        let auth = AuthStore::in_memory();
        assert_eq!(
            resolve("/history", &auth),
            Resolution::Redirect(LOGIN_PATH.into())
        );
        assert_eq!(resolve("/login", &auth), Resolution::Allow(Route::Login));
        assert_eq!(resolve_final("/", &auth), Resolution::Allow(Route::Login));
    }

    #[test]
    fn test_users_is_admin_only() {
        assert_eq!(
            resolve("/users", &signed_in(Role::User)),
            Resolution::Forbidden(Route::Users)
        );
        assert_eq!(
            resolve("/users", &signed_in(Role::Admin)),
            Resolution::Allow(Route::Users)
        );
    }

    #[test]
    fn test_resolve_final_follows_redirects() {
        let auth = signed_in(Role::Viewer);
        assert_eq!(
            resolve_final("/unknown", &auth),
            Resolution::Allow(Route::Applications)
        );
    }

    #[test]
    fn test_nav_items_filtered_by_role() {
        let labels = |auth: &AuthStore| {
            visible_nav_items(auth)
                .iter()
                .map(|i| i.label)
                .collect::<Vec<_>>()
        };
        assert!(!labels(&signed_in(Role::User)).contains(&"Users"));
        assert!(labels(&signed_in(Role::Admin)).contains(&"Users"));
    }
}
