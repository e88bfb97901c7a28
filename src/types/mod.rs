//! Types
//!
//! Configuration, authorization parameter and error log types.

pub mod auth;
pub mod config;
pub mod error_log;

pub use auth::*;
pub use config::*;
pub use error_log::*;
