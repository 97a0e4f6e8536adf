use crate::index::RecordIndex;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shortie_core::repository::{ReadRepository, Repository, Result};
use shortie_core::{OwnerId, ShortId, StorageError, UrlMapping, UrlRecord};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default upper bound for writing one snapshot to disk.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// One entry of the on-disk snapshot.
///
/// `uuid` and `user_id` are accepted on load so older snapshots keep
/// working; new snapshots always use the primary field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(alias = "uuid")]
    id: String,
    short_url: String,
    original_url: String,
    #[serde(alias = "user_id", default)]
    owner_id: String,
    #[serde(default)]
    is_deleted: bool,
}

impl SnapshotRecord {
    fn from_record(record: &UrlRecord) -> Self {
        Self {
            id: record.short_id.to_string(),
            short_url: record.short_id.to_string(),
            original_url: record.original_url.clone(),
            owner_id: record.owner_id.as_str().to_owned(),
            is_deleted: record.deleted,
        }
    }

    fn into_record(self) -> Result<UrlRecord> {
        if self.id.is_empty() {
            return Err(StorageError::InvalidData(
                "snapshot contains a record with an empty id".to_string(),
            ));
        }
        if self.short_url != self.id {
            return Err(StorageError::InvalidData(format!(
                "snapshot record '{}' has mismatched short_url '{}'",
                self.id, self.short_url
            )));
        }

        Ok(UrlRecord {
            short_id: ShortId::new_unchecked(self.id),
            original_url: self.original_url,
            owner_id: OwnerId::new(self.owner_id),
            deleted: self.is_deleted,
        })
    }
}

/// Snapshot-file implementation of the repository contract.
///
/// Holds the same indices as [`InMemoryRepository`], and rewrites the whole
/// record set to `path` on every mutation before reporting success. The new
/// state is only published to readers once the file write has succeeded,
/// so a failed write leaves memory and disk as they were.
///
/// [`InMemoryRepository`]: crate::InMemoryRepository
#[derive(Debug)]
pub struct FileRepository {
    path: PathBuf,
    write_timeout: Duration,
    index: RwLock<RecordIndex>,
}

impl FileRepository {
    /// Opens the snapshot at `path`, loading every record into memory.
    ///
    /// A missing or empty file yields an empty store. A malformed file, or
    /// one holding a duplicate id or URL, is rejected.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_snapshot(&path).await?;
        let count = records.len();

        let index = RecordIndex::from_records(records).map_err(|err| match err {
            StorageError::IdAlreadyExists(id) => StorageError::InvalidData(format!(
                "snapshot {} contains duplicate short id '{}'",
                path.display(),
                id
            )),
            StorageError::UrlAlreadyExists(url) => StorageError::InvalidData(format!(
                "snapshot {} contains duplicate original url '{}'",
                path.display(),
                url
            )),
            other => other,
        })?;

        info!(path = %path.display(), records = count, "loaded snapshot");

        Ok(Self {
            path,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            index: RwLock::new(index),
        })
    }

    /// Overrides the bound on a single snapshot write.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records, live and tombstoned.
    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Serializes `index` and replaces the snapshot file with it.
    async fn persist(&self, index: &RecordIndex) -> Result<()> {
        let snapshot: Vec<SnapshotRecord> = index
            .records()
            .into_iter()
            .map(SnapshotRecord::from_record)
            .collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let claim = Arc::new(WriteClaim::default());
        let mut writer = tokio::task::spawn_blocking({
            let path = self.path.clone();
            let claim = Arc::clone(&claim);
            move || write_replacing(&path, &bytes, &claim)
        });

        let written = match tokio::time::timeout(self.write_timeout, &mut writer).await {
            Ok(joined) => joined,
            Err(_) if claim.try_abandon() => {
                warn!(
                    path = %self.path.display(),
                    timeout = ?self.write_timeout,
                    "abandoned snapshot write"
                );
                return Err(StorageError::Timeout(format!(
                    "writing snapshot {} exceeded {:?}",
                    self.path.display(),
                    self.write_timeout
                )));
            }
            // Already renaming; that outcome stands.
            Err(_) => writer.await,
        };
        let written =
            written.map_err(|e| StorageError::Io(format!("snapshot writer failed: {e}")))?;
        if let Err(err) = written {
            warn!(path = %self.path.display(), error = %err, "failed to write snapshot");
            return Err(err);
        }

        debug!(path = %self.path.display(), records = snapshot.len(), "snapshot written");
        Ok(())
    }
}

async fn load_snapshot(path: &Path) -> Result<Vec<UrlRecord>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "snapshot file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let snapshot: Vec<SnapshotRecord> = serde_json::from_slice(&bytes).map_err(|e| {
        StorageError::InvalidData(format!("malformed snapshot {}: {e}", path.display()))
    })?;

    snapshot.into_iter().map(SnapshotRecord::into_record).collect()
}

/// Decides once whether an in-flight snapshot write may still land.
///
/// The writer claims it right before renaming; a caller whose deadline
/// passed claims it to abandon the write. Whoever comes second loses.
#[derive(Debug, Default)]
struct WriteClaim(AtomicU8);

impl WriteClaim {
    const PENDING: u8 = 0;
    const COMMITTING: u8 = 1;
    const ABANDONED: u8 = 2;

    fn try_commit(&self) -> bool {
        self.claim(Self::COMMITTING)
    }

    fn try_abandon(&self) -> bool {
        self.claim(Self::ABANDONED)
    }

    fn claim(&self, state: u8) -> bool {
        self.0
            .compare_exchange(Self::PENDING, state, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Writes `bytes` to a fresh temporary file next to `path`, flushes it to
/// disk and renames it over `path`.
///
/// Blocking; run it on the blocking pool. An abandoned write removes its
/// temporary file and leaves `path` alone.
fn write_replacing(path: &Path, bytes: &[u8], claim: &WriteClaim) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    if !claim.try_commit() {
        return Ok(());
    }
    tmp.persist(path).map_err(|e| StorageError::from(e.error))?;
    Ok(())
}

#[async_trait]
impl ReadRepository for FileRepository {
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
impl Repository for FileRepository {
    async fn create(&self, id: &ShortId, url: &str, owner: &OwnerId) -> Result<()> {
        let mut index = self.index.write().await;
        index.check_insert(id, url)?;

        let mut next = index.clone();
        next.insert(UrlRecord::new(id.clone(), url, owner.clone()));
        self.persist(&next).await?;

        *index = next;
        Ok(())
    }

    async fn create_batch(&self, items: &[UrlMapping], owner: &OwnerId) -> Result<()> {
        let mut index = self.index.write().await;
        index.check_batch(items)?;
        if items.is_empty() {
            return Ok(());
        }

        let mut next = index.clone();
        next.insert_batch(items, owner);
        self.persist(&next).await?;

        *index = next;
        Ok(())
    }

    async fn delete_batch(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64> {
        let mut index = self.index.write().await;
        let deletable = index.deletable(owner, ids);
        if deletable.is_empty() {
            return Ok(0);
        }

        let mut next = index.clone();
        next.tombstone(&deletable);
        self.persist(&next).await?;

        *index = next;
        Ok(deletable.len() as u64)
    }
}
