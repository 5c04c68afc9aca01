//! Persisted client storage for the session token and role.
//!
//! Two fixed keys are kept: [`TOKEN_KEY`] and [`ROLE_KEY`]. The token is
//! process-wide; it is written only by the session store and read by the API
//! client on every outgoing request.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::{ClientError, Result};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";

/// Key-value storage that survives between runs.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    /// Remove both session keys.
    fn clear_session(&self) -> Result<()> {
        self.remove(TOKEN_KEY)?;
        self.remove(ROLE_KEY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

impl StoredSession {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            TOKEN_KEY => Some(&mut self.token),
            ROLE_KEY => Some(&mut self.role),
            _ => None,
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match key {
            TOKEN_KEY => self.token.clone(),
            ROLE_KEY => self.role.clone(),
            _ => None,
        }
    }
}

/// In-memory store, used when nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.slot(key) {
            Some(slot) => {
                *slot = Some(value.to_string());
                Ok(())
            }
            None => Err(unknown_key(key)),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        if let Some(slot) = self.inner.lock().slot(key) {
            *slot = None;
        }
        Ok(())
    }
}

/// TOML file store (`<data_dir>/session.toml`), re-written on every change.
/// The file is removed once both keys are gone.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: Mutex<StoredSession>,
}

impl FileTokenStore {
    pub const FILE_NAME: &'static str = "session.toml";

    /// Open (or lazily create) the store inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(Self::FILE_NAME);
        let cache = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ClientError::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            // A corrupt file is treated as "no session" rather than a hard error.
            toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                StoredSession::default()
            })
        } else {
            StoredSession::default()
        };

        debug!("Session store at {}", path.display());
        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &StoredSession) -> Result<()> {
        if session.token.is_none() && session.role.is_none() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| {
                    ClientError::Storage(format!("Failed to remove {}: {}", self.path.display(), e))
                })?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let content =
            toml::to_string(session).map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| {
            ClientError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.lock().read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.lock();
        let mut next = cache.clone();
        match next.slot(key) {
            Some(slot) => *slot = Some(value.to_string()),
            None => return Err(unknown_key(key)),
        }
        self.persist(&next)?;
        *cache = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut cache = self.cache.lock();
        let mut next = cache.clone();
        if let Some(slot) = next.slot(key) {
            *slot = None;
        }
        if next != *cache {
            self.persist(&next)?;
            *cache = next;
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ClientError {
    ClientError::Storage(format!("Unknown storage key: {}", key))
}
