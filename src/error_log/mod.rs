//! Error Log
//!
//! Bounded, deduplicated log of provider/API failures kept in the option store.

pub mod recorder;
pub mod store;

pub use recorder::{merge_error, ErrorRecorder, MergeOutcome, MAX_CAS_ATTEMPTS};
pub use store::{ErrorLogSnapshot, ErrorLogStore, ERROR_LOG_OPTION, MAX_ERROR_LOG_ENTRIES};
