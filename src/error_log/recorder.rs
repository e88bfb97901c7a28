//! Error Recorder
//!
//! Normalizes a failure and merges it into the head of the error log.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{Clock, OptionStore, SystemClock};
use crate::error::StorageError;
use crate::error_log::store::{ErrorLogStore, MAX_ERROR_LOG_ENTRIES};
use crate::types::{ErrorCandidate, ErrorInput, ErrorLogEntry};

/// Attempts made by [`ErrorRecorder::record_error_atomic`] before giving up.
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// How a failure was merged into the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Same failure as the head entry; its count was bumped.
    Repeated,
    /// New head entry.
    Prepended,
}

/// Merge a candidate into `log` (most recent first) and enforce the size cap.
pub fn merge_error(log: &mut Vec<ErrorLogEntry>, candidate: ErrorCandidate, now: i64) -> MergeOutcome {
    let outcome = match log.first_mut() {
        Some(head) if head.matches(&candidate) => {
            head.repeat(now);
            MergeOutcome::Repeated
        }
        _ => {
            log.insert(0, ErrorLogEntry::new(candidate, now));
            MergeOutcome::Prepended
        }
    };
    log.truncate(MAX_ERROR_LOG_ENTRIES);
    outcome
}

/// Records provider/API failures into the error log.
///
/// [`record_error`](Self::record_error) is a plain read-merge-write: two
/// overlapping requests can lose one of their updates.
/// [`record_error_atomic`](Self::record_error_atomic) retries the merge through
/// the store's compare-and-swap instead.
pub struct ErrorRecorder<O: OptionStore + ?Sized> {
    log: ErrorLogStore<O>,
    clock: Arc<dyn Clock>,
}

impl<O: OptionStore + ?Sized> ErrorRecorder<O> {
    /// Create a recorder using the wall clock.
    pub fn new(options: Arc<O>) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Create a recorder with a custom clock.
    pub fn with_clock(options: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            log: ErrorLogStore::new(options),
            clock,
        }
    }

    /// Underlying log store.
    pub fn log(&self) -> &ErrorLogStore<O> {
        &self.log
    }

    /// Record a failure. Returns whether the log write succeeded.
    pub fn record_error(&self, section: &str, error: impl Into<ErrorInput>) -> bool {
        let candidate = error.into().normalize(section);
        let mut log = self.log.get();
        let outcome = merge_error(&mut log, candidate, self.clock.now());
        debug!(section, outcome = ?outcome, entries = log.len(), "Recording error");
        self.log.update(&log)
    }

    /// Record a failure, retrying the merge on concurrent modification.
    ///
    /// Falls back to [`record_error`](Self::record_error) when the store has no
    /// compare-and-swap.
    pub fn record_error_atomic(&self, section: &str, error: impl Into<ErrorInput>) -> bool {
        let candidate = error.into().normalize(section);

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let snapshot = self.log.snapshot();
            let mut log = snapshot.entries.clone();
            let outcome = merge_error(&mut log, candidate.clone(), self.clock.now());

            match self.log.compare_and_set(&snapshot, &log) {
                Ok(true) => {
                    debug!(section, outcome = ?outcome, attempt, "Recorded error atomically");
                    return true;
                }
                Ok(false) => {
                    debug!(section, attempt, "Error log changed concurrently, retrying");
                }
                Err(StorageError::Unsupported { .. }) => {
                    debug!("Option store has no compare-and-swap, using plain write");
                    let mut log = snapshot.entries;
                    merge_error(&mut log, candidate, self.clock.now());
                    return self.log.update(&log);
                }
                Err(e) => {
                    warn!(error = %e, section, "Failed to write error log");
                    return false;
                }
            }
        }

        warn!(section, attempts = MAX_CAS_ATTEMPTS, "Gave up recording error after repeated conflicts");
        false
    }
}
