//! Log backend client for logscope
//!
//! This crate defines the backend operations the viewer consumes and an
//! HTTP implementation of them. Responses are returned loosely typed; the
//! normalizers in `logscope-logs` turn them into canonical values.

mod backend;
mod error;
mod http;

pub use backend::LogBackend;
pub use error::{ClientError, Result};
pub use http::{DEFAULT_TIMEOUT, HttpBackend};

// Re-export types used in our public API
pub use logscope_types::CreateLogRequest;
