use crate::index::RecordIndex;
use async_trait::async_trait;
use shortie_core::repository::{ReadRepository, Repository, Result};
use shortie_core::{OwnerId, ShortId, UrlMapping, UrlRecord};
use tokio::sync::RwLock;
use tracing::trace;

/// In-memory implementation of the repository contract.
///
/// Both indices sit behind one `RwLock`, so "check uniqueness, then insert"
/// runs under a single exclusive guard. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    index: RwLock<RecordIndex>,
}

impl InMemoryRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(RecordIndex::new()),
        }
    }

    /// Number of stored records, live and tombstoned.
    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get_url_by_id(&self, id: &ShortId) -> Result<String> {
        self.index.read().await.url_by_id(id)
    }

    async fn get_id_by_url(&self, url: &str) -> Result<ShortId> {
        self.index.read().await.id_by_url(url)
    }

    async fn get_urls_by_owner(&self, owner: &OwnerId) -> Result<Vec<UrlMapping>> {
        Ok(self.index.read().await.live_by_owner(owner))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(&self, id: &ShortId, url: &str, owner: &OwnerId) -> Result<()> {
        let mut index = self.index.write().await;
        index.check_insert(id, url)?;
        index.insert(UrlRecord::new(id.clone(), url, owner.clone()));
        trace!(short_id = %id, owner = %owner, "stored mapping");
        Ok(())
    }

    async fn create_batch(&self, items: &[UrlMapping], owner: &OwnerId) -> Result<()> {
        let mut index = self.index.write().await;
        index.check_batch(items)?;
        index.insert_batch(items, owner);
        trace!(count = items.len(), owner = %owner, "stored mapping batch");
        Ok(())
    }

    async fn delete_batch(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64> {
        let mut index = self.index.write().await;
        let deletable = index.deletable(owner, ids);
        index.tombstone(&deletable);
        Ok(deletable.len() as u64)
    }
}
