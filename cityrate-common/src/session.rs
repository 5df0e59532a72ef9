//! Persisted login
//!
//! The only state kept between runs is the logged-in user id. It lives in a
//! small TOML file written atomically (temp file + rename) with owner-only
//! permissions on Unix.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Default, Deserialize, Serialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

/// File-backed store for the logged-in user id
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored user id, or `None` when nobody is logged in
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let session: SessionFile = toml::from_str(&content).map_err(|e| {
            Error::Session(format!("Parse {} failed: {}", self.path.display(), e))
        })?;

        Ok(session
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    pub fn save(&self, user_id: &str) -> Result<()> {
        let session = SessionFile {
            user_id: Some(user_id.to_string()),
        };
        let content = toml::to_string(&session)
            .map_err(|e| Error::Session(format!("Serialize session failed: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        std::fs::write(&temp_path, content)?;
        set_owner_only(&temp_path)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Forget the stored user id; succeeds when there is nothing to remove
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.toml".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}
