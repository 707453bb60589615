use datasource_core::Error as SourceError;
use thiserror::Error;

use crate::registry::SourceState;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown source '{0}'")]
    UnknownSource(String),

    #[error("Source '{0}' is already registered")]
    DuplicateSource(String),

    /// The source exists but was never initialized successfully.
    #[error("Source '{name}' is not ready ({state})")]
    NotReady { name: String, state: SourceState },

    #[error("Source '{name}' timed out during {operation}")]
    Timeout { name: String, operation: &'static str },

    #[error("Source '{name}' failed: {source}")]
    Source {
        name: String,
        #[source]
        source: SourceError,
    },
}

impl HostError {
    /// The source's own error, if the call reached it and it failed.
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            HostError::Source { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
