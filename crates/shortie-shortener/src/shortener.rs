use crate::error::Result;
use async_trait::async_trait;
use shortie_core::{OwnerId, ShortId};

/// Outcome of shortening a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub short_id: ShortId,
    pub short_url: String,
    /// `false` when the URL was already shortened and the existing id is returned.
    pub created: bool,
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

impl BatchItem {
    pub fn new(correlation_id: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            original_url: original_url.into(),
        }
    }
}

/// One entry of a batch response, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchShortened {
    pub correlation_id: String,
    pub short_url: String,
}

/// A live mapping owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedUrl {
    pub short_url: String,
    pub original_url: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens one URL, returning the existing short URL when it was already shortened.
    async fn shorten(&self, original_url: &str, owner: &OwnerId) -> Result<Shortened>;

    /// Shortens every item or none of them.
    async fn shorten_batch(
        &self,
        items: &[BatchItem],
        owner: &OwnerId,
    ) -> Result<Vec<BatchShortened>>;

    /// Retrieves the original URL behind a short id.
    async fn resolve(&self, id: &ShortId) -> Result<String>;

    /// Lists the caller's live mappings.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<OwnedUrl>>;

    /// Tombstones the caller's ids, returning how many changed.
    async fn delete(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64>;

    /// Checks that the backing store answers.
    async fn ping(&self) -> Result<()>;
}
