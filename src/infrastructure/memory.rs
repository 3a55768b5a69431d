//! In-memory stores
//!
//! Drop-in replacements for the file-backed stores, used by tests and by
//! callers that must not touch the working directory.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::{Credentials, ProjectConfig};
use crate::infrastructure::traits::{ConfigStore, CredentialStore};

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<ProjectConfig>,
    writes: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config: Mutex::new(config),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> ProjectConfig {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn write(&self, config: &ProjectConfig) -> io::Result<()> {
        *self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    pub fn current(&self) -> Option<Credentials> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> io::Result<Option<Credentials>> {
        Ok(self.current())
    }

    fn save(&self, credentials: &Credentials) -> io::Result<()> {
        *self
            .credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self
            .credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }
}
