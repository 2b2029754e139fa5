//! HTTP client for the Enterprise Auth admin backend.
//!
//! Requests and responses use the typed records from the `domain` crate.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod logging;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use config::{ApiConfig, ClientConfig, LoggingConfig};
pub use error::{ClientError, ClientResult, ValidationDetail};
pub use logging::init_logging;
