use tracing::debug;

use crate::identity::{Role, Session, SessionStore};

use super::table::{route_for_path, route_for_role, LOGIN_PATH};

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigate to `to` instead. `from` carries the originally requested path when the
    /// user is sent to login for lack of a session, so login can return there.
    Redirect { to: String, from: Option<String> },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool { matches!(self, GuardDecision::Allow) }

    fn to_login(from: Option<&str>) -> Self {
        GuardDecision::Redirect { to: LOGIN_PATH.to_string(), from: from.map(str::to_string) }
    }

    fn to(path: &str) -> Self {
        GuardDecision::Redirect { to: path.to_string(), from: None }
    }

    /// Path to actually visit next: the target, with the return path folded into the login URL.
    pub fn next_path(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { to, from: Some(from) } if to == LOGIN_PATH => Some(login_path_with_return(from)),
            GuardDecision::Redirect { to, .. } => Some(to.clone()),
        }
    }
}

/// Admit or redirect a request for `requested_path` that declares `required` as its role.
///
/// A role mismatch is handled exactly like a missing session: back to login, without a
/// return path.
pub fn check(session: &Session, required: Option<Role>, requested_path: &str) -> GuardDecision {
    if !session.is_authenticated() {
        return GuardDecision::to_login(Some(requested_path));
    }
    match required {
        Some(role) if !session.has_role(role) => GuardDecision::to_login(None),
        _ => GuardDecision::Allow,
    }
}

/// Start page: the dashboard of the highest-priority role held, else login.
pub fn default_landing(session: &Session) -> &'static str {
    if !session.is_authenticated() {
        return LOGIN_PATH;
    }
    session
        .known_roles()
        .first()
        .map(|r| route_for_role(*r).dashboard)
        .unwrap_or(LOGIN_PATH)
}

/// Resolve any path against the route table and apply the guard.
///
/// Only real pages and role indexes are guarded; anything else, including unknown pages
/// under another role's prefix, goes to the default landing. A query string never takes
/// part in the lookup but is kept in the return path.
pub fn resolve(session: &Session, path: &str) -> GuardDecision {
    if is_login_path(path) {
        return GuardDecision::Allow;
    }
    let page = strip_query(path);
    let Some(route) = route_for_path(page).filter(|r| r.is_index(page) || r.has_page(page)) else {
        return GuardDecision::to(default_landing(session));
    };
    let decision = check(session, Some(route.role), path);
    if !decision.is_allowed() {
        return decision;
    }
    if route.is_index(page) {
        GuardDecision::to(route.dashboard)
    } else {
        GuardDecision::Allow
    }
}

/// Path part of a location, without `?query` or `#fragment`.
pub fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn is_login_path(path: &str) -> bool {
    path == LOGIN_PATH || path.strip_prefix(LOGIN_PATH).map(|r| r.starts_with('?')).unwrap_or(false)
}

/// `/login?from=<encoded path>`
pub fn login_path_with_return(from: &str) -> String {
    format!("{}?from={}", LOGIN_PATH, urlencoding::encode(from))
}

/// Return path carried by a login URL, if any.
pub fn parse_return_path(login_path: &str) -> Option<String> {
    let query = login_path.strip_prefix(LOGIN_PATH)?.strip_prefix('?')?;
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == "from")
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.into_owned())
        .filter(|v| v.starts_with('/'))
}

/// Guard bound to a session store; every call re-reads the current session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    sessions: SessionStore,
}

impl RouteGuard {
    pub fn new(sessions: SessionStore) -> Self { Self { sessions } }

    pub fn check(&self, required: Option<Role>, requested_path: &str) -> GuardDecision {
        check(&self.sessions.get_session(), required, requested_path)
    }

    pub fn navigate(&self, path: &str) -> GuardDecision {
        let decision = resolve(&self.sessions.get_session(), path);
        debug!(target: "eduadmin::guard", "navigate path={} decision={:?}", path, decision);
        decision
    }

    pub fn landing(&self) -> &'static str {
        default_landing(&self.sessions.get_session())
    }

    /// Where to go after a successful login: the carried return path when the new session
    /// is admitted there, otherwise the default landing.
    pub fn after_login(&self, login_path: &str) -> String {
        let session = self.sessions.get_session();
        if let Some(from) = parse_return_path(login_path) {
            if resolve(&session, &from).is_allowed() {
                return from;
            }
        }
        default_landing(&session).to_string()
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod guard_tests;
