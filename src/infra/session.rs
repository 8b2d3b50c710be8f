//! Persisted administrator session.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use murales_api_types::AdminUser;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::repos::{SessionError, SessionStore};
use crate::util::lock::lock_state;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct AuthStorage {
    #[serde(default)]
    user: Option<AdminUser>,
}

/// On-disk layout. Key names are shared with the web frontend's storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(rename = "auth-storage", default)]
    auth_storage: AuthStorage,
}

/// Session kept in a JSON file so a login survives process restarts.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    document: Mutex<SessionDocument>,
}

impl FileTokenStore {
    /// Open the store at `path`. A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let document = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => SessionDocument::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => SessionDocument::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, apply: impl FnOnce(&mut SessionDocument)) -> Result<(), SessionError> {
        let mut document = lock_state(&self.document, "session");
        let mut next = document.clone();
        apply(&mut next);
        write_atomically(&self.path, &next)?;
        *document = next;
        Ok(())
    }
}

fn write_atomically(path: &Path, document: &SessionDocument) -> Result<(), SessionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(document)?;
    let staging = path.with_extension("tmp");
    fs::write(&staging, bytes)?;
    fs::rename(&staging, path)?;
    debug!(
        target = "murales::infra::session",
        path = %path.display(),
        "Session written"
    );
    Ok(())
}

impl SessionStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        lock_state(&self.document, "session").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock_state(&self.document, "session").refresh_token.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        self.update(|doc| {
            doc.access_token = Some(access_token.to_string());
            doc.refresh_token = Some(refresh_token.to_string());
        })
    }

    fn clear_tokens(&self) -> Result<(), SessionError> {
        self.update(|doc| {
            doc.access_token = None;
            doc.refresh_token = None;
        })
    }

    fn user(&self) -> Option<AdminUser> {
        lock_state(&self.document, "session")
            .auth_storage
            .user
            .clone()
    }

    fn set_user(&self, user: Option<&AdminUser>) -> Result<(), SessionError> {
        self.update(|doc| doc.auth_storage.user = user.cloned())
    }
}

/// Process-local session; nothing is written anywhere.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    document: Mutex<SessionDocument>,
}

impl MemoryTokenStore {
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            document: Mutex::new(SessionDocument {
                access_token: Some(access_token.to_string()),
                refresh_token: Some(refresh_token.to_string()),
                auth_storage: AuthStorage::default(),
            }),
        }
    }
}

impl SessionStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        lock_state(&self.document, "session").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock_state(&self.document, "session").refresh_token.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        let mut doc = lock_state(&self.document, "session");
        doc.access_token = Some(access_token.to_string());
        doc.refresh_token = Some(refresh_token.to_string());
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), SessionError> {
        let mut doc = lock_state(&self.document, "session");
        doc.access_token = None;
        doc.refresh_token = None;
        Ok(())
    }

    fn user(&self) -> Option<AdminUser> {
        lock_state(&self.document, "session")
            .auth_storage
            .user
            .clone()
    }

    fn set_user(&self, user: Option<&AdminUser>) -> Result<(), SessionError> {
        lock_state(&self.document, "session").auth_storage.user = user.cloned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn admin() -> AdminUser {
        AdminUser {
            id: "u1".into(),
            email: "admin@murales.ar".into(),
            role: "admin".into(),
        }
    }

    #[test]
    fn session_survives_reopen() -> Result<(), SessionError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::open(&path)?;
        store.set_tokens("a1", "r1")?;
        store.set_user(Some(&admin()))?;

        let reopened = FileTokenStore::open(&path)?;
        assert_eq!(reopened.access_token().as_deref(), Some("a1"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("r1"));
        assert_eq!(reopened.user(), Some(admin()));
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }

    #[test]
    fn uses_shared_key_names() -> Result<(), SessionError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path)?;
        store.set_tokens("a1", "r1")?;
        store.set_user(Some(&admin()))?;

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(raw["access_token"], "a1");
        assert_eq!(raw["refresh_token"], "r1");
        assert_eq!(raw["auth-storage"]["user"]["email"], "admin@murales.ar");
        Ok(())
    }

    #[test]
    fn clearing_tokens_keeps_file_readable() -> Result<(), SessionError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(&path)?;
        store.set_tokens("a1", "r1")?;

        store.clear_tokens()?;

        let reopened = FileTokenStore::open(&path)?;
        assert!(reopened.access_token().is_none());
        assert!(reopened.refresh_token().is_none());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> Result<(), SessionError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json")?;

        let err = FileTokenStore::open(&path).expect_err("corrupt");
        assert!(matches!(err, SessionError::Corrupt(_)));
        Ok(())
    }
}
