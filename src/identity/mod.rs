//! Client-side identity: the session record (token, role labels, profile) and the
//! key-value medium it is persisted in.
//! Keep the public surface thin and split implementation across sub-modules.

mod kv;
mod profile;
mod role;
mod session;

pub use kv::{FileKv, KvStore, MemoryKv};
pub use profile::UserProfile;
pub use role::Role;
pub use session::{AuthState, Session, SessionError, SessionStore, ROLES_KEY, TOKEN_KEY, USER_KEY};
