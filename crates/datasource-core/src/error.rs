use thiserror::Error;

/// Failures a [`DataSource`](crate::DataSource) reports to its host.
///
/// An empty result is never an error: "zero matches" is `Ok(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Setup failed; the instance must not be used afterwards.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Caller input broke a precondition. Raised before any remote call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Network, timeout or rate-limit failure while talking to the source.
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
