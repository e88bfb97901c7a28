//! Builders
//!
//! Fluent builder for the login configuration.

pub mod config;

pub use config::{login_config, LoginConfigBuilder};
