//! Management API

pub mod management;

pub use management::{encode_path_segment, ApiErrorBody, ManagementApi};
