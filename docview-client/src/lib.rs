//! docview Client
//!
//! Record and view service façade over the document-view REST endpoints,
//! with the reqwest transport, TOML configuration and tracing setup the
//! `docview` binary uses.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod service;
pub mod telemetry;

pub use config::{AuthConfig, ClientConfig, ConfigError, LogConfig, ModuleOverride};
pub use envelope::{unwrap_envelope, Envelope};
pub use error::{ApiClientError, ApiClientResult};
pub use http::HttpTransport;
pub use service::{BulkOutcome, DocumentViewService, NewView};
pub use telemetry::init_tracing;
