use shortie_core::repository::Result;
use shortie_core::{OwnerId, ShortId, StorageError, UrlMapping, UrlRecord};
use std::collections::{HashMap, HashSet};

/// The forward and inverse indices of a process-local store.
///
/// Records live once, in the forward map. The inverse map only points back
/// at a forward key, so owner and tombstone state cannot drift between the
/// two lookups. Callers hold the whole index behind a single lock and never
/// touch the maps directly.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordIndex {
    by_id: HashMap<ShortId, UrlRecord>,
    by_url: HashMap<String, ShortId>,
}

impl RecordIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds an index from persisted records, rejecting duplicates.
    pub(crate) fn from_records(records: impl IntoIterator<Item = UrlRecord>) -> Result<Self> {
        let mut index = Self::new();
        for record in records {
            index.check_insert(&record.short_id, &record.original_url)?;
            index.insert(record);
        }
        Ok(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Checks that a single mapping may be inserted.
    pub(crate) fn check_insert(&self, id: &ShortId, url: &str) -> Result<()> {
        if id.is_empty() {
            return Err(StorageError::EmptyId);
        }
        if self.by_id.contains_key(id) {
            return Err(StorageError::IdAlreadyExists(id.to_string()));
        }
        if self.by_url.contains_key(url) {
            return Err(StorageError::UrlAlreadyExists(url.to_owned()));
        }
        Ok(())
    }

    /// Checks a whole batch against storage and against itself.
    pub(crate) fn check_batch(&self, items: &[UrlMapping]) -> Result<()> {
        let mut ids = HashSet::with_capacity(items.len());
        let mut urls = HashSet::with_capacity(items.len());

        for item in items {
            self.check_insert(&item.short_id, &item.original_url)?;
            if !ids.insert(&item.short_id) {
                return Err(StorageError::IdAlreadyExists(item.short_id.to_string()));
            }
            if !urls.insert(item.original_url.as_str()) {
                return Err(StorageError::UrlAlreadyExists(item.original_url.clone()));
            }
        }
        Ok(())
    }

    /// Inserts a record that already passed [`RecordIndex::check_insert`].
    pub(crate) fn insert(&mut self, record: UrlRecord) {
        self.by_url
            .insert(record.original_url.clone(), record.short_id.clone());
        self.by_id.insert(record.short_id.clone(), record);
    }

    pub(crate) fn insert_batch(&mut self, items: &[UrlMapping], owner: &OwnerId) {
        for item in items {
            self.insert(UrlRecord::new(
                item.short_id.clone(),
                item.original_url.clone(),
                owner.clone(),
            ));
        }
    }

    pub(crate) fn url_by_id(&self, id: &ShortId) -> Result<String> {
        match self.by_id.get(id) {
            None => Err(StorageError::NotFound(id.to_string())),
            Some(record) if record.deleted => Err(StorageError::Deleted(id.to_string())),
            Some(record) => Ok(record.original_url.clone()),
        }
    }

    pub(crate) fn id_by_url(&self, url: &str) -> Result<ShortId> {
        let record = self
            .by_url
            .get(url)
            .and_then(|id| self.by_id.get(id))
            .ok_or_else(|| StorageError::NotFound(url.to_owned()))?;

        if record.deleted {
            return Err(StorageError::Deleted(url.to_owned()));
        }
        Ok(record.short_id.clone())
    }

    pub(crate) fn live_by_owner(&self, owner: &OwnerId) -> Vec<UrlMapping> {
        let mut mappings: Vec<UrlMapping> = self
            .by_id
            .values()
            .filter(|record| record.is_live() && &record.owner_id == owner)
            .map(|record| UrlMapping::new(record.short_id.clone(), record.original_url.clone()))
            .collect();
        mappings.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        mappings
    }

    /// Returns the ids among `ids` that `owner` may tombstone, deduplicated.
    pub(crate) fn deletable(&self, owner: &OwnerId, ids: &[ShortId]) -> Vec<ShortId> {
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .filter(|id| {
                self.by_id
                    .get(*id)
                    .is_some_and(|record| record.is_live() && &record.owner_id == owner)
            })
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }

    pub(crate) fn tombstone(&mut self, ids: &[ShortId]) {
        for id in ids {
            if let Some(record) = self.by_id.get_mut(id) {
                record.deleted = true;
            }
        }
    }

    /// Every record, live and tombstoned, ordered by short id.
    pub(crate) fn records(&self) -> Vec<&UrlRecord> {
        let mut records: Vec<&UrlRecord> = self.by_id.values().collect();
        records.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        records
    }
}
