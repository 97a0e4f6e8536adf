use shortie_core::StorageError;
use shortie_generator::GeneratorError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("empty batch")]
    EmptyBatch,
    #[error("url was shortened and then deleted: {0}")]
    UrlDeleted(String),
    #[error("url already shortened: {0}")]
    UrlConflict(String),
    #[error("short id not found: {0}")]
    NotFound(String),
    #[error("short id deleted: {0}")]
    Deleted(String),
    #[error("no free short id after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ShortenerError {
    /// Whether the failure is on our side rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::GenerationExhausted { .. } | Self::Generator(_) | Self::Storage(_)
        )
    }
}

pub type Result<T, E = ShortenerError> = std::result::Result<T, E>;
