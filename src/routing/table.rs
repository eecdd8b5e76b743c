use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::identity::Role;

pub const LOGIN_PATH: &str = "/login";

/// Sidebar entry of a role's console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub key: String,
    pub label: String,
    pub path: String,
}

impl NavItem {
    fn new(key: &str, label: &str, path: &str) -> Self {
        Self { key: key.into(), label: label.into(), path: path.into() }
    }
}

/// One guarded subtree: every path under `prefix` requires `role`.
#[derive(Debug, Clone)]
pub struct RoleRoute {
    pub role: Role,
    pub prefix: &'static str,
    pub dashboard: &'static str,
    pub nav: Vec<NavItem>,
    /// Pages reachable in the subtree but not listed in the sidebar.
    pub hidden: Vec<&'static str>,
}

impl RoleRoute {
    /// True when `path` names a page of this subtree (nav or hidden).
    pub fn has_page(&self, path: &str) -> bool {
        self.nav.iter().any(|n| n.path == path) || self.hidden.iter().any(|h| *h == path)
    }

    /// True when `path` is the bare prefix, with or without a trailing slash.
    pub fn is_index(&self, path: &str) -> bool {
        path.trim_end_matches('/') == self.prefix
    }

    /// True when `path` lies inside this subtree.
    pub fn contains(&self, path: &str) -> bool {
        self.is_index(path) || path.strip_prefix(self.prefix).map(|rest| rest.starts_with('/')).unwrap_or(false)
    }
}

pub static ROUTE_TABLE: Lazy<Vec<RoleRoute>> = Lazy::new(|| {
    vec![
        RoleRoute {
            role: Role::Admin,
            prefix: "/admin",
            dashboard: "/admin/dashboard",
            nav: vec![
                NavItem::new("dashboard", "Overview", "/admin/dashboard"),
                NavItem::new("students", "Enrollment / Courses", "/admin/students"),
                NavItem::new("majors", "Majors / Terms", "/admin/majors-terms"),
                NavItem::new("schedule", "Timetabling", "/admin/schedule"),
                NavItem::new("plans", "Training Plans", "/admin/plans"),
                NavItem::new("grades", "Grade Review", "/admin/grades"),
                NavItem::new("exams", "Exams", "/admin/exams"),
                NavItem::new("access", "Accounts / Permissions", "/admin/access"),
            ],
            hidden: vec!["/admin/assistant"],
        },
        RoleRoute {
            role: Role::Teacher,
            prefix: "/teacher",
            dashboard: "/teacher/dashboard",
            nav: vec![
                NavItem::new("dashboard", "Workbench", "/teacher/dashboard"),
                NavItem::new("schedule", "Teaching Schedule", "/teacher/schedule"),
                NavItem::new("courses", "My Courses", "/teacher/courses"),
                NavItem::new("grades", "Grade Entry", "/teacher/grades"),
            ],
            hidden: vec!["/teacher/assistant"],
        },
        RoleRoute {
            role: Role::Student,
            prefix: "/student",
            dashboard: "/student/dashboard",
            nav: vec![
                NavItem::new("dashboard", "Home", "/student/dashboard"),
                NavItem::new("schedule", "Timetable", "/student/schedule"),
                NavItem::new("grades", "Grades", "/student/grades"),
                NavItem::new("exams", "Exams", "/student/exams"),
            ],
            hidden: vec!["/student/assistant"],
        },
    ]
});

/// Route entry for a role.
pub fn route_for_role(role: Role) -> &'static RoleRoute {
    ROUTE_TABLE
        .iter()
        .find(|r| r.role == role)
        .unwrap_or_else(|| unreachable!("every role has a route table entry"))
}

/// Sidebar items for a role.
pub fn nav_for(role: Role) -> &'static [NavItem] {
    &route_for_role(role).nav
}

/// Subtree containing `path`, if any.
pub fn route_for_path(path: &str) -> Option<&'static RoleRoute> {
    ROUTE_TABLE.iter().find(|r| r.contains(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_dashboard_in_its_nav() {
        for role in Role::PRIORITY {
            let route = route_for_role(role);
            assert!(route.has_page(route.dashboard), "{} dashboard missing from nav", role);
            assert!(nav_for(role).iter().all(|n| n.path.starts_with(route.prefix)));
        }
    }

    #[test]
    fn prefix_matching_respects_segment_boundaries() {
        assert_eq!(route_for_path("/admin/grades").map(|r| r.role), Some(Role::Admin));
        assert_eq!(route_for_path("/admin").map(|r| r.role), Some(Role::Admin));
        assert_eq!(route_for_path("/admin/").map(|r| r.role), Some(Role::Admin));
        assert!(route_for_path("/administrator").is_none());
        assert!(route_for_path("/login").is_none());
    }

    #[test]
    fn hidden_pages_are_reachable_but_not_listed() {
        let r = route_for_role(Role::Student);
        assert!(r.has_page("/student/assistant"));
        assert!(!r.nav.iter().any(|n| n.path == "/student/assistant"));
    }
}
