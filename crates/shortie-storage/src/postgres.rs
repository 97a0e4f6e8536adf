use async_trait::async_trait;
use shortie_core::repository::{ReadRepository, Repository, Result};
use shortie_core::{OwnerId, ShortId, StorageError, UrlMapping};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Name of the unique constraint guarding `urls.original_url`.
///
/// Unique violations naming this constraint are URL conflicts; any other
/// unique violation on `urls` comes from the `short_id` primary key.
pub const URL_UNIQUE_CONSTRAINT: &str = "idx_original_url";

/// Deadline applied to every repository call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(3);

const INSERT_URL: &str = r#"
    INSERT INTO urls (short_id, original_url, user_id)
    VALUES ($1, $2, $3)
"#;

/// PostgreSQL implementation of the repository contract.
///
/// Uniqueness is enforced by the schema: the primary key on `short_id` and
/// the [`URL_UNIQUE_CONSTRAINT`] on `original_url`. Soft delete flips
/// `is_deleted`; rows are never removed, so neither key is ever reused.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    call_timeout: Duration,
}

impl PostgresRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Creates a repository by opening a new connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(DEFAULT_CALL_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Overrides the per-call deadline.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        info!("database schema is up to date");
        Ok(())
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                StorageError::Timeout(format!(
                    "{operation} exceeded {:?}",
                    self.call_timeout
                ))
            })?
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

/// Translates an insert failure into the matching uniqueness sentinel.
fn map_insert_error(err: sqlx::Error, id: &ShortId, url: &str) -> StorageError {
    let url_conflict = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint() == Some(URL_UNIQUE_CONSTRAINT));

    match url_conflict {
        Some(true) => StorageError::UrlAlreadyExists(url.to_owned()),
        Some(false) => StorageError::IdAlreadyExists(id.to_string()),
        None => map_sqlx_error(err),
    }
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn get_url_by_id(&self, id: &ShortId) -> Result<String> {
        self.with_deadline("get_url_by_id", async {
            let row: Option<(String, bool)> = sqlx::query_as(
                r#"
                SELECT original_url, is_deleted
                FROM urls
                WHERE short_id = $1
                "#,
            )
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            match row {
                None => Err(StorageError::NotFound(id.to_string())),
                Some((_, true)) => Err(StorageError::Deleted(id.to_string())),
                Some((original_url, false)) => Ok(original_url),
            }
        })
        .await
    }

    async fn get_id_by_url(&self, url: &str) -> Result<ShortId> {
        self.with_deadline("get_id_by_url", async {
            let row: Option<(String, bool)> = sqlx::query_as(
                r#"
                SELECT short_id, is_deleted
                FROM urls
                WHERE original_url = $1
                "#,
            )
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            match row {
                None => Err(StorageError::NotFound(url.to_owned())),
                Some((_, true)) => Err(StorageError::Deleted(url.to_owned())),
                Some((short_id, false)) => Ok(ShortId::new_unchecked(short_id)),
            }
        })
        .await
    }

    async fn get_urls_by_owner(&self, owner: &OwnerId) -> Result<Vec<UrlMapping>> {
        self.with_deadline("get_urls_by_owner", async {
            let rows: Vec<(String, String)> = sqlx::query_as(
                r#"
                SELECT short_id, original_url
                FROM urls
                WHERE user_id = $1
                  AND NOT is_deleted
                ORDER BY short_id
                "#,
            )
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok(rows
                .into_iter()
                .map(|(short_id, original_url)| {
                    UrlMapping::new(ShortId::new_unchecked(short_id), original_url)
                })
                .collect())
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_deadline("ping", async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create(&self, id: &ShortId, url: &str, owner: &OwnerId) -> Result<()> {
        if id.is_empty() {
            return Err(StorageError::EmptyId);
        }

        self.with_deadline("create", async {
            sqlx::query(INSERT_URL)
                .bind(id.as_str())
                .bind(url)
                .bind(owner.as_str())
                .execute(&self.pool)
                .await
                .map_err(|err| map_insert_error(err, id, url))?;
            Ok(())
        })
        .await
    }

    async fn create_batch(&self, items: &[UrlMapping], owner: &OwnerId) -> Result<()> {
        if items.iter().any(|item| item.short_id.is_empty()) {
            return Err(StorageError::EmptyId);
        }
        if items.is_empty() {
            return Ok(());
        }

        self.with_deadline("create_batch", async {
            // Dropping `tx` without commit rolls back, including on deadline expiry.
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            for item in items {
                sqlx::query(INSERT_URL)
                    .bind(item.short_id.as_str())
                    .bind(item.original_url.as_str())
                    .bind(owner.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| map_insert_error(err, &item.short_id, &item.original_url))?;
            }

            tx.commit().await.map_err(map_sqlx_error)?;
            debug!(count = items.len(), owner = %owner, "committed mapping batch");
            Ok(())
        })
        .await
    }

    async fn delete_batch(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();

        self.with_deadline("delete_batch", async {
            let result = sqlx::query(
                r#"
                UPDATE urls
                SET is_deleted = TRUE
                WHERE user_id = $1
                  AND short_id = ANY($2)
                  AND NOT is_deleted
                "#,
            )
            .bind(owner.as_str())
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok(result.rows_affected())
        })
        .await
    }
}
