use serde::{Deserialize, Serialize};

/// User record returned by the API at login and from `/auth/me`.
/// The client treats it as opaque: unknown fields are kept in `extra` and written back verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub org_unit_id: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_active() -> bool { true }

impl UserProfile {
    /// Name to show in prompts and status lines.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() { &self.username } else { &self.full_name }
    }
}
