use thiserror::Error;

pub type Result<T> = std::result::Result<T, GoLinkError>;

/// Failures surfaced by the mapping store and everything built on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoLinkError {
    #[error("invalid short name: {0}")]
    InvalidShortName(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("storage failure: {0}")]
    StorageFailure(String),
    /// Reserved for callers that treat a missing mapping as an error.
    /// The store itself never raises it.
    #[error("no mapping for go/{0}")]
    NotFound(String),
    #[error("invalid import: {0}")]
    InvalidImport(String),
}

/// Failures reported by the storage area primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

impl From<StorageError> for GoLinkError {
    fn from(value: StorageError) -> Self {
        Self::StorageFailure(value.0)
    }
}

/// Failures reported by the host's tab control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tab update failed: {0}")]
pub struct HostError(pub String);
