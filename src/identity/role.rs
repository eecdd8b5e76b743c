use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Role labels the console knows how to route. Any other label coming from the API is kept
/// in the session as a plain string but never satisfies a route requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Landing priority: the first role held decides the default dashboard.
    pub const PRIORITY: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }

    /// Parse a label as typed by a user; matching is case-insensitive.
    pub fn from_label(s: &str) -> Option<Role> {
        Role::PRIORITY.into_iter().find(|r| r.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_label(s).ok_or_else(|| format!("unknown role label: {}", s))
    }
}
