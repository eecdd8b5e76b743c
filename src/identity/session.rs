use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::kv::{KvStore, MemoryKv};
use super::profile::UserProfile;
use super::role::Role;

pub const TOKEN_KEY: &str = "token";
pub const ROLES_KEY: &str = "roles";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode session field '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        SessionError::Io { path: path.to_path_buf(), source }
    }
}

/// Snapshot of the client-held login state.
/// Role labels are a navigation convenience; the remote API makes the real authorization decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub roles: BTreeSet<String>,
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { roles: BTreeSet<String> },
}

impl Session {
    pub fn anonymous() -> Self { Self::default() }

    pub fn is_authenticated(&self) -> bool { self.token.is_some() }

    pub fn has_role(&self, role: Role) -> bool { self.roles.contains(role.label()) }

    /// Known roles held, in landing priority order.
    pub fn known_roles(&self) -> Vec<Role> {
        Role::PRIORITY.into_iter().filter(|r| self.has_role(*r)).collect()
    }

    pub fn state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated { roles: self.roles.clone() }
        } else {
            AuthState::Anonymous
        }
    }
}

/// Accessor/mutator handle over the session medium. Cloning shares the medium.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self { Self { kv } }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryKv::new())) }

    /// Persist a fresh login. Writes the token first, then roles, then the profile, so any
    /// reader that sees roles also sees the token they belong to. If a write after the token
    /// fails, the whole session is cleared before the error is returned.
    pub fn set_session<I, S>(&self, token: &str, roles: I, profile: Option<&UserProfile>) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        let roles_json = serde_json::to_string(&roles).map_err(|e| SessionError::Encode { key: ROLES_KEY, source: e })?;
        let profile_json = match profile {
            Some(p) => Some(serde_json::to_string(p).map_err(|e| SessionError::Encode { key: USER_KEY, source: e })?),
            None => None,
        };

        self.kv.set(TOKEN_KEY, token)?;
        let rest = self.kv.set(ROLES_KEY, &roles_json).and_then(|_| match profile_json {
            Some(p) => self.kv.set(USER_KEY, &p),
            None => self.kv.remove(USER_KEY),
        });
        if let Err(e) = rest {
            // the new token must not sit next to the previous login's roles or profile
            if let Err(cleanup) = self.clear_session() {
                warn!(target: "eduadmin::session", "rollback after failed session write also failed: {}", cleanup);
            }
            return Err(e);
        }
        debug!(target: "eduadmin::session", "session stored roles={:?}", roles);
        Ok(())
    }

    /// Current session. Never fails: missing or malformed entries read as logged out.
    pub fn get_session(&self) -> Session {
        let token = self.token();
        let roles = self
            .read(ROLES_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(v) => Some(v.into_iter().collect::<BTreeSet<_>>()),
                Err(e) => {
                    warn!(target: "eduadmin::session", "ignoring malformed role list: {}", e);
                    None
                }
            })
            .unwrap_or_default();
        let profile = self.read(USER_KEY).and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(target: "eduadmin::session", "ignoring malformed user profile: {}", e);
                None
            }
        });
        Session { token, roles, profile }
    }

    /// Token alone, as read by the gateway on every request. Empty strings count as absent.
    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn clear_session(&self) -> Result<(), SessionError> {
        self.kv.remove(TOKEN_KEY)?;
        self.kv.remove(ROLES_KEY)?;
        self.kv.remove(USER_KEY)?;
        debug!(target: "eduadmin::session", "session cleared");
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "eduadmin::session", "session read of '{}' failed: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
