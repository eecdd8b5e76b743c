//! Role-aware navigation: the declarative route table and the guard that admits or
//! redirects navigation requests against the current session.

mod guard;
mod table;

pub use guard::{check, default_landing, login_path_with_return, parse_return_path, resolve, strip_query, GuardDecision, RouteGuard};
pub use table::{nav_for, route_for_path, route_for_role, NavItem, RoleRoute, LOGIN_PATH, ROUTE_TABLE};
