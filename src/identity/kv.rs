use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use super::session::SessionError;

/// String key-value medium the session is persisted in.
/// Implementations serialize their own writes; callers never hold a lock across calls.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Ephemeral store for tests and for embedders that keep the session in process.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self { Self::default() }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Single JSON object file holding all keys, rewritten on every mutation.
/// A missing file is an empty store; an unreadable or corrupt file reads as empty too.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKv {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn load(&self) -> BTreeMap<String, String> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(target: "eduadmin::session", "session file {} unreadable: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!(target: "eduadmin::session", "session file {} is corrupt, treating as empty: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| SessionError::io(dir, e))?;
            }
        }
        let text = serde_json::to_string_pretty(map).map_err(|e| SessionError::Encode { key: "store", source: e })?;
        // write-then-rename so a concurrent reader never sees a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| SessionError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| SessionError::io(&self.path, e))?;
        Ok(())
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _g = self.lock.lock();
        Ok(self.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _g = self.lock.lock();
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());
        self.store(&map)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let _g = self.lock.lock();
        let mut map = self.load();
        if map.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.store(&map)
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod kv_tests;
