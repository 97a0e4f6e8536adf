use crate::error::StorageError;
use crate::owner::OwnerId;
use crate::short_id::ShortId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL mapping, live or tombstoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The identifier the mapping is reachable under.
    pub short_id: ShortId,
    /// The original URL that was shortened.
    pub original_url: String,
    /// Who created the mapping. Empty for anonymous callers.
    pub owner_id: OwnerId,
    /// Tombstone flag. Deleted records keep both the id and the URL reserved.
    pub deleted: bool,
}

impl UrlRecord {
    pub fn new(short_id: ShortId, original_url: impl Into<String>, owner_id: OwnerId) -> Self {
        Self {
            short_id,
            original_url: original_url.into(),
            owner_id,
            deleted: false,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.deleted
    }
}

/// An `(id, url)` pair, used both as batch input and as owner listing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub short_id: ShortId,
    pub original_url: String,
}

impl UrlMapping {
    pub fn new(short_id: ShortId, original_url: impl Into<String>) -> Self {
        Self {
            short_id,
            original_url: original_url.into(),
        }
    }
}

/// The read side of the mapping store.
///
/// Lookups never retry: `NotFound` and `Deleted` are terminal outcomes.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Resolves a short id to its original URL.
    ///
    /// Returns `Err(NotFound)` if the id was never stored and `Err(Deleted)`
    /// if the mapping is tombstoned.
    async fn get_url_by_id(&self, id: &ShortId) -> Result<String>;

    /// Resolves an original URL to the short id it was stored under.
    ///
    /// Same sentinels as [`ReadRepository::get_url_by_id`].
    async fn get_id_by_url(&self, url: &str) -> Result<ShortId>;

    /// Returns every live mapping created by `owner`. Order is unspecified.
    async fn get_urls_by_owner(&self, owner: &OwnerId) -> Result<Vec<UrlMapping>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// The full mapping store contract every backend implements.
///
/// Both `short_id` and `original_url` are unique across live and
/// tombstoned records, and neither is ever released.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts one mapping into both indices.
    ///
    /// Fails with `EmptyId`, `IdAlreadyExists` or `UrlAlreadyExists`.
    async fn create(&self, id: &ShortId, url: &str, owner: &OwnerId) -> Result<()>;

    /// Inserts every mapping or none of them.
    ///
    /// All items are checked against existing storage and against each other
    /// before anything is written.
    async fn create_batch(&self, items: &[UrlMapping], owner: &OwnerId) -> Result<()>;

    /// Tombstones the ids in `ids` that belong to `owner` and are still live.
    ///
    /// Unknown ids, ids of other owners and already deleted ids are skipped
    /// silently. Returns how many records were tombstoned.
    async fn delete_batch(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn get_url_by_id(&self, id: &ShortId) -> Result<String> {
        (**self).get_url_by_id(id).await
    }

    async fn get_id_by_url(&self, url: &str) -> Result<ShortId> {
        (**self).get_id_by_url(url).await
    }

    async fn get_urls_by_owner(&self, owner: &OwnerId) -> Result<Vec<UrlMapping>> {
        (**self).get_urls_by_owner(owner).await
    }

    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn create(&self, id: &ShortId, url: &str, owner: &OwnerId) -> Result<()> {
        (**self).create(id, url, owner).await
    }

    async fn create_batch(&self, items: &[UrlMapping], owner: &OwnerId) -> Result<()> {
        (**self).create_batch(items, owner).await
    }

    async fn delete_batch(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64> {
        (**self).delete_batch(owner, ids).await
    }
}
