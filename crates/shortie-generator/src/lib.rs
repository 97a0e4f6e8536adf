//! Short id generators.
//!
//! Generators are pure: they never consult storage, so they cannot promise
//! uniqueness. The allocation protocols in `shortie-shortener` detect and
//! retry collisions.

pub mod error;
pub mod random;
pub mod seq;

pub use error::GeneratorError;
pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use shortie_core::ShortId;

/// Trait for generating candidate short ids.
///
/// Implementations can vary from random tokens to sequential counters.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate id.
    ///
    /// An error means the generator itself is broken (e.g. the entropy source
    /// failed) and must not be retried by the caller.
    fn generate(&self) -> Result<ShortId, GeneratorError>;
}

impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    fn generate(&self) -> Result<ShortId, GeneratorError> {
        (**self).generate()
    }
}
