//! Locked JSON documents over a pluggable byte backend.
//!
//! A `Document<T>` never caches `T`: every read loads the backend, every
//! update loads, mutates and stores while holding the document lock.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::StateError;

/// Raw byte storage for one document.
pub trait DocumentBackend: Send + Sync {
    /// Current bytes, or `None` if the document was never written.
    fn load(&self) -> Result<Option<Vec<u8>>, StateError>;

    /// Replace the document contents.
    fn store(&self, bytes: &[u8]) -> Result<(), StateError>;
}

/// Document stored as a single file on the local filesystem.
///
/// Writes go to a sibling temp file which is then renamed over the target.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentBackend for FileBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, StateError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::Io(format!("read {}: {e}", self.path.display()))),
        }
    }

    fn store(&self, bytes: &[u8]) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StateError::Io(format!("create dir: {e}")))?;
            }
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, bytes)
            .map_err(|e| StateError::Io(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StateError::Io(format!("rename into {}: {e}", self.path.display())))
    }
}

/// In-process backend, used by tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryBackend {
    bytes: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing raw contents (possibly malformed).
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `store` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw contents as text, for assertions.
    pub fn contents(&self) -> Option<String> {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.as_ref().map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl DocumentBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.bytes.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn store(&self, bytes: &[u8]) -> Result<(), StateError> {
        *self.bytes.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Result of an update closure: whether the mutated value must be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<R> {
    Unchanged(R),
    Dirty(R),
}

/// A typed JSON document with serialized read-modify-write.
pub struct Document<T> {
    name: String,
    backend: Arc<dyn DocumentBackend>,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(name: impl Into<String>, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Document backed by a file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self::new(name, Arc::new(FileBackend::new(path)))
    }

    /// Document held in memory only.
    pub fn memory(name: impl Into<String>) -> Self {
        Self::new(name, Arc::new(MemoryBackend::new()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current persisted value.
    pub fn read(&self) -> T {
        let _guard = self.guard();
        self.load()
    }

    /// Load, mutate and, if the closure reports `Dirty`, write back the whole document.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> Outcome<R>) -> Result<R, StateError> {
        let _guard = self.guard();
        let mut value = self.load();
        match f(&mut value) {
            Outcome::Unchanged(r) => Ok(r),
            Outcome::Dirty(r) => {
                self.save(&value)?;
                Ok(r)
            }
        }
    }

    /// Overwrite the document unconditionally.
    pub fn replace(&self, value: &T) -> Result<(), StateError> {
        let _guard = self.guard();
        self.save(value)
    }

    // The guarded value is `()`; state lives in the backend, so a poisoned
    // lock carries nothing stale.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self) -> T {
        let bytes = match self.backend.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!(document = %self.name, error = %e, "unreadable document, starting empty");
                return T::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(document = %self.name, error = %e, "malformed document, starting empty");
                T::default()
            }
        }
    }

    fn save(&self, value: &T) -> Result<(), StateError> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        self.backend.store(&bytes)
    }
}
