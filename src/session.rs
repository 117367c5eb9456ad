//! Chat session identity
//!
//! A [`Session`] is created once when the conversation starts and is
//! threaded through every webhook call. The identifier can optionally be
//! kept in a session file so a restarted front end rejoins the same
//! backend conversation.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Zone name sent when the host zone cannot be determined
const FALLBACK_TIME_ZONE: &str = "UTC";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Opaque session token, passed verbatim as `user_id` / `key`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One conversation session
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    time_zone_override: Option<String>,
}

impl Session {
    /// Fresh in-memory session
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            time_zone_override: None,
        }
    }

    /// Reuse the identifier stored at `path`, or generate and store one.
    pub fn load_or_create(path: &Path) -> Result<Self, SessionError> {
        match std::fs::read_to_string(path) {
            Ok(contents) if !contents.trim().is_empty() => {
                let id = SessionId::from(contents.trim().to_string());
                tracing::debug!(path = %path.display(), session_id = %id, "Resuming session");
                return Ok(Self::with_id(id));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SessionError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        let id = SessionId::generate();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, id.as_str()).map_err(|source| SessionError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), session_id = %id, "Created session");
        Ok(Self::with_id(id))
    }

    /// Pin the zone name instead of asking the host
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone_override = Some(time_zone.into());
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// IANA zone name for the next request, resolved on every call.
    pub fn time_zone(&self) -> String {
        if let Some(tz) = &self.time_zone_override {
            return tz.clone();
        }
        iana_time_zone::get_timezone().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Could not resolve host time zone");
            FALLBACK_TIME_ZONE.to_string()
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
