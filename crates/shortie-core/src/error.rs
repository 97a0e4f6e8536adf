use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
}

/// Errors returned by mapping store backends.
///
/// The first five variants are sentinels: the allocation protocols match on
/// them to decide between retrying, returning an existing mapping, or
/// aborting. The remaining variants describe backend failures and are never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("short id must not be empty")]
    EmptyId,
    #[error("short id already exists: {0}")]
    IdAlreadyExists(String),
    #[error("original url already exists: {0}")]
    UrlAlreadyExists(String),
    #[error("mapping not found: {0}")]
    NotFound(String),
    #[error("mapping was deleted: {0}")]
    Deleted(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage io failed: {0}")]
    Io(String),
    #[error("storage serialization failed: {0}")]
    Serialization(String),
    #[error("schema migration failed: {0}")]
    Migration(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
