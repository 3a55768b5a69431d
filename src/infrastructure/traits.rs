//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Credentials, ProjectConfig};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persistence for the per-directory alias mapping.
pub trait ConfigStore: Send + Sync {
    /// Load the mapping. Missing or corrupt files yield an empty mapping.
    fn read(&self) -> ProjectConfig;

    /// Overwrite the stored mapping.
    fn write(&self, config: &ProjectConfig) -> io::Result<()>;

    /// Where the mapping lives, for messages.
    fn location(&self) -> PathBuf;
}

/// Persistence for login state.
pub trait CredentialStore: Send + Sync {
    /// Load stored credentials; `None` when logged out.
    fn load(&self) -> io::Result<Option<Credentials>>;

    fn save(&self, credentials: &Credentials) -> io::Result<()>;

    /// Forget stored credentials. No-op when none are stored.
    fn clear(&self) -> io::Result<()>;

    /// Where credentials live, for messages.
    fn location(&self) -> PathBuf;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Project file stored as pretty-printed JSON.
pub struct JsonConfigStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonConfigStore {
    /// Store for `file_name` inside `dir` (normally the working directory).
    pub fn new(fs: Arc<dyn FileSystem>, dir: &Path, file_name: &str) -> Self {
        Self {
            fs,
            path: dir.join(file_name),
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn read(&self) -> ProjectConfig {
        if !self.fs.exists(&self.path) {
            debug!("no project file at {}", self.path.display());
            return ProjectConfig::default();
        }
        let content = match self.fs.read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("cannot read {}: {}", self.path.display(), e);
                return ProjectConfig::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring unparsable {}: {}", self.path.display(), e);
            ProjectConfig::default()
        })
    }

    fn write(&self, config: &ProjectConfig) -> io::Result<()> {
        let mut content = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        content.push('\n');
        debug!("writing project file {}", self.path.display());
        self.fs.write(&self.path, &content)
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Credentials stored as JSON in the user's data directory.
pub struct FileCredentialStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> io::Result<Option<Credentials>> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let content = self.fs.read_to_string(&self.path)?;
        let credentials = serde_json::from_str(&content).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("corrupt credentials file {}: {}", self.path.display(), e),
            )
        })?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> io::Result<()> {
        let content = serde_json::to_string_pretty(credentials)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.fs.ensure_parent(&self.path)?;
        self.fs.write(&self.path, &content)
    }

    fn clear(&self) -> io::Result<()> {
        if self.fs.exists(&self.path) {
            self.fs.remove_file(&self.path)?;
        }
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
