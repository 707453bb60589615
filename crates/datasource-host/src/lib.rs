//! datasource-host
//!
//! Lifecycle plumbing a host needs around [`datasource_core::DataSource`]
//! instances: initialize each once, never touch one that failed, and bound
//! every call with a timeout. Results are routed back per source, unmerged.

pub mod config;
pub mod error;
pub mod logging;
pub mod registry;

pub use config::{HostConfig, SourceSettings};
pub use error::{HostError, Result};
pub use registry::{InitReport, SourceRegistry, SourceState};
