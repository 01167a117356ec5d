#![allow(missing_docs)]

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Failure reading or writing the persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Filesystem failure.
    #[error("session storage I/O failed for {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The stored document could not be (de)serialised.
    #[error("session file {path} is malformed: {source}")]
    Format {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Single-key store for the display name.
pub trait SessionStore: Send + Sync {
    /// Stored name, if any.
    fn get(&self) -> Result<Option<String>, SessionError>;
    /// Persist `name`. A blank name is not a login and leaves storage untouched.
    fn set(&self, name: &str) -> Result<(), SessionError>;
    /// Forget the stored name.
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// JSON document on disk holding the `user` key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn format_error(&self, source: serde_json::Error) -> SessionError {
        SessionError::Format {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let document: SessionDocument =
            serde_json::from_str(&contents).map_err(|err| self.format_error(err))?;
        Ok(document.user.filter(|name| !name.is_empty()))
    }

    fn set(&self, name: &str) -> Result<(), SessionError> {
        if name.trim().is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let document = SessionDocument {
            user: Some(name.to_string()),
        };
        let serialized =
            serde_json::to_string_pretty(&document).map_err(|err| self.format_error(err))?;
        fs::write(&self.path, serialized).map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    name: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Mutex::new(Some(name.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<String>, SessionError> {
        Ok(self.name.lock().clone())
    }

    fn set(&self, name: &str) -> Result<(), SessionError> {
        if !name.trim().is_empty() {
            *self.name.lock() = Some(name.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.name.lock() = None;
        Ok(())
    }
}
