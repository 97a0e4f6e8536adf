use crate::error::GeneratorError;
use crate::Generator;
use shortie_core::ShortId;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator producing sequential ids.
///
/// Ids look like "wh000000", "wh000001", etc. Unlike [`RandomGenerator`]
/// it restarts from its offset on every process start, so against a durable
/// store it collides with every id it handed out before. Useful for tests
/// and local runs where predictable ids matter more than density; the
/// gateway selects it with `--generator seq`.
///
/// [`RandomGenerator`]: crate::RandomGenerator
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> Result<ShortId, GeneratorError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(ShortId::new_unchecked(format!("{}{:06}", self.prefix, count)))
    }
}
