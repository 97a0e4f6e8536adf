use thiserror::Error;

/// Errors returned by short id generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("entropy source failed: {0}")]
    Entropy(String),
}
