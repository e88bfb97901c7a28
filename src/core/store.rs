//! Option Storage
//!
//! Interface to the host's persistent key/value option store, plus in-memory,
//! file-backed and mock implementations.

use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

/// Option store interface (for dependency injection).
pub trait OptionStore: Send + Sync {
    /// Read an option.
    fn get_option(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write an option, replacing any previous value.
    fn set_option(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove an option. Returns whether it existed.
    fn delete_option(&self, key: &str) -> Result<bool, StorageError>;

    /// Check if an option exists.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get_option(key)?.is_some())
    }

    /// Write `new` only if the current value equals `expected` (`None` = absent).
    ///
    /// Returns `Ok(false)` on conflict. Stores without an atomic primitive
    /// return [`StorageError::Unsupported`].
    fn compare_and_swap(
        &self,
        _key: &str,
        _expected: Option<&Value>,
        _new: Value,
    ) -> Result<bool, StorageError> {
        Err(StorageError::Unsupported {
            operation: "compare_and_swap".to_string(),
        })
    }
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    on_poison: fn(String) -> StorageError,
) -> Result<MutexGuard<'a, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| on_poison(format!("option store lock poisoned: {}", e)))
}

fn read_failed(message: String) -> StorageError {
    StorageError::ReadFailed { message }
}

fn write_failed(message: String) -> StorageError {
    StorageError::WriteFailed { message }
}

fn delete_failed(message: String) -> StorageError {
    StorageError::DeleteFailed { message }
}

/// In-memory option store with atomic compare-and-swap.
#[derive(Debug, Default)]
pub struct InMemoryOptionStore {
    options: Mutex<HashMap<String, Value>>,
}

impl InMemoryOptionStore {
    /// Create new in-memory option store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for InMemoryOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.options, read_failed)?.get(key).cloned())
    }

    fn set_option(&self, key: &str, value: Value) -> Result<(), StorageError> {
        lock(&self.options, write_failed)?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete_option(&self, key: &str) -> Result<bool, StorageError> {
        Ok(lock(&self.options, delete_failed)?.remove(key).is_some())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Value>,
        new: Value,
    ) -> Result<bool, StorageError> {
        let mut options = lock(&self.options, write_failed)?;
        if options.get(key) != expected {
            return Ok(false);
        }
        options.insert(key.to_string(), new);
        Ok(true)
    }
}

/// Option store persisted as a single JSON object on disk.
///
/// Every write rewrites the whole file. Access is serialized within the
/// process only; there is no compare-and-swap.
#[derive(Debug)]
pub struct FileOptionStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileOptionStore {
    /// Open (or lazily create) the store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    message: e.to_string(),
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::CorruptedData {
                message: format!("{} does not contain a JSON object", self.path.display()),
            }),
            Err(e) => Err(StorageError::CorruptedData {
                message: e.to_string(),
            }),
        }
    }

    fn save(&self, options: &Map<String, Value>) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(options).map_err(|e| StorageError::WriteFailed {
            message: e.to_string(),
        })?;
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            message: e.to_string(),
        };

        // Replace the file in one rename so a crash never leaves it half written.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
        file.write_all(body.as_bytes()).map_err(write_failed)?;
        file.as_file().sync_all().map_err(write_failed)?;
        file.persist(&self.path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

impl OptionStore for FileOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = lock(&self.guard, read_failed)?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set_option(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = lock(&self.guard, write_failed)?;
        let mut options = self.load()?;
        options.insert(key.to_string(), value);
        self.save(&options)
    }

    fn delete_option(&self, key: &str) -> Result<bool, StorageError> {
        let _guard = lock(&self.guard, delete_failed)?;
        let mut options = self.load()?;
        let existed = options.remove(key).is_some();
        if existed {
            self.save(&options)?;
        }
        Ok(existed)
    }
}

/// Mock option store for testing.
#[derive(Default)]
pub struct MockOptionStore {
    options: Mutex<HashMap<String, Value>>,
    set_history: Mutex<Vec<(String, Value)>>,
    delete_history: Mutex<Vec<String>>,
    fail_writes: Mutex<bool>,
    fail_reads: Mutex<bool>,
    supports_cas: Mutex<bool>,
    concurrent_writes: Mutex<VecDeque<(String, Value)>>,
}

impl MockOptionStore {
    /// Create new mock option store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and delete fail.
    pub fn set_fail_writes(&self, fail: bool) -> &Self {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
        self
    }

    /// Make every read fail.
    pub fn set_fail_reads(&self, fail: bool) -> &Self {
        *self.fail_reads.lock().unwrap_or_else(|e| e.into_inner()) = fail;
        self
    }

    /// Enable compare-and-swap support.
    pub fn set_supports_cas(&self, supports: bool) -> &Self {
        *self.supports_cas.lock().unwrap_or_else(|e| e.into_inner()) = supports;
        self
    }

    /// Simulate another request writing `value` right before the next
    /// compare-and-swap.
    pub fn queue_concurrent_write(&self, key: &str, value: Value) -> &Self {
        self.concurrent_writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((key.to_string(), value));
        self
    }

    /// Pre-populate an option.
    pub fn add_option(&self, key: &str, value: Value) -> &Self {
        self.options
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        self
    }

    /// Get set history.
    pub fn get_set_history(&self) -> Vec<(String, Value)> {
        self.set_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get delete history.
    pub fn get_delete_history(&self) -> Vec<String> {
        self.delete_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StorageError::WriteFailed {
                message: "Mock storage failure".to_string(),
            });
        }
        Ok(())
    }
}

impl OptionStore for MockOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<Value>, StorageError> {
        if *self.fail_reads.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StorageError::ReadFailed {
                message: "Mock storage failure".to_string(),
            });
        }
        Ok(lock(&self.options, read_failed)?.get(key).cloned())
    }

    fn set_option(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check_write()?;
        lock(&self.set_history, write_failed)?.push((key.to_string(), value.clone()));
        lock(&self.options, write_failed)?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete_option(&self, key: &str) -> Result<bool, StorageError> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StorageError::DeleteFailed {
                message: "Mock storage failure".to_string(),
            });
        }
        lock(&self.delete_history, delete_failed)?.push(key.to_string());
        Ok(lock(&self.options, delete_failed)?.remove(key).is_some())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Value>,
        new: Value,
    ) -> Result<bool, StorageError> {
        if !*self.supports_cas.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StorageError::Unsupported {
                operation: "compare_and_swap".to_string(),
            });
        }
        self.check_write()?;

        let mut options = lock(&self.options, write_failed)?;
        if let Some((other_key, value)) = lock(&self.concurrent_writes, write_failed)?.pop_front()
        {
            options.insert(other_key, value);
        }
        if options.get(key) != expected {
            return Ok(false);
        }
        lock(&self.set_history, write_failed)?.push((key.to_string(), new.clone()));
        options.insert(key.to_string(), new);
        Ok(true)
    }
}
