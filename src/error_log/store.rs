//! Error Log Store
//!
//! The error log lives in the option store under a single key and is always
//! read and written as a whole.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::core::OptionStore;
use crate::error::StorageError;
use crate::types::ErrorLogEntry;

/// Option key holding the error log.
pub const ERROR_LOG_OPTION: &str = "auth0_error_log";

/// Maximum number of entries kept.
pub const MAX_ERROR_LOG_ENTRIES: usize = 30;

/// Log as read, along with the raw stored value for compare-and-set.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorLogSnapshot {
    pub raw: Option<Value>,
    pub entries: Vec<ErrorLogEntry>,
}

/// CRUD access to the persisted error log.
pub struct ErrorLogStore<O: OptionStore + ?Sized> {
    options: Arc<O>,
}

impl<O: OptionStore + ?Sized> Clone for ErrorLogStore<O> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
        }
    }
}

impl<O: OptionStore + ?Sized> ErrorLogStore<O> {
    pub fn new(options: Arc<O>) -> Self {
        Self { options }
    }

    /// Get the log, most recent first. Absent or unreadable logs are empty.
    pub fn get(&self) -> Vec<ErrorLogEntry> {
        self.snapshot().entries
    }

    /// Read the log together with the raw stored value.
    pub fn snapshot(&self) -> ErrorLogSnapshot {
        let raw = match self.options.get_option(ERROR_LOG_OPTION) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read error log");
                None
            }
        };
        let entries = decode(raw.as_ref());
        ErrorLogSnapshot { raw, entries }
    }

    /// Overwrite the log.
    pub fn update(&self, log: &[ErrorLogEntry]) -> bool {
        match encode(log).and_then(|value| self.options.set_option(ERROR_LOG_OPTION, value)) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, entries = log.len(), "Failed to write error log");
                false
            }
        }
    }

    /// Overwrite the log with an empty one.
    pub fn clear(&self) -> bool {
        self.update(&[])
    }

    /// Remove the stored option entirely. Returns whether it existed.
    pub fn delete(&self) -> bool {
        match self.options.delete_option(ERROR_LOG_OPTION) {
            Ok(existed) => existed,
            Err(e) => {
                warn!(error = %e, "Failed to delete error log");
                false
            }
        }
    }

    /// Write `log` only if the stored value is still the one in `snapshot`.
    pub fn compare_and_set(
        &self,
        snapshot: &ErrorLogSnapshot,
        log: &[ErrorLogEntry],
    ) -> Result<bool, StorageError> {
        let value = encode(log)?;
        self.options
            .compare_and_swap(ERROR_LOG_OPTION, snapshot.raw.as_ref(), value)
    }
}

fn encode(log: &[ErrorLogEntry]) -> Result<Value, StorageError> {
    serde_json::to_value(log).map_err(|e| StorageError::WriteFailed {
        message: e.to_string(),
    })
}

fn decode(raw: Option<&Value>) -> Vec<ErrorLogEntry> {
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, index, "Skipping undecodable error log entry");
                    None
                }
            })
            .collect(),
        Some(_) => {
            warn!("Discarding error log that is not a list");
            Vec::new()
        }
    }
}
