use crate::error::{Result, ShortenerError};
use crate::shortener::{BatchItem, BatchShortened, OwnedUrl, Shortened, Shortener};
use async_trait::async_trait;
use shortie_core::{OwnerId, ReadRepository, Repository, ShortId, StorageError, UrlMapping};
use shortie_generator::Generator;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

/// Upper bound on generation attempts, for both allocation protocols.
pub const MAX_ATTEMPTS: usize = 10;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - Id allocation with bounded collision retry
/// - Building public short URLs under `base_url`
///
/// The generator never consults storage, so uniqueness is enforced by the
/// repository and collisions surface as `IdAlreadyExists`.
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    base_url: String,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` publishing short URLs under `base_url`.
    pub fn new(repository: R, generator: G, base_url: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates that the URL is absolute http(s) with a host.
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let parsed = Url::parse(url)
            .map_err(|e| ShortenerError::InvalidUrl(format!("{url}: {e}")))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                parsed.scheme()
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {url}"
            )));
        }

        Ok(())
    }

    fn generate_id(&self) -> Result<ShortId> {
        self.generator.generate().map_err(|err| {
            error!(%err, "short id generator failed");
            ShortenerError::from(err)
        })
    }

    /// Draws a candidate that no other item of the current batch holds.
    fn distinct_candidate(&self, taken: &mut HashSet<ShortId>) -> Result<ShortId> {
        for _ in 0..MAX_ATTEMPTS {
            let id = self.generate_id()?;
            if taken.insert(id.clone()) {
                return Ok(id);
            }
        }

        error!(
            max = MAX_ATTEMPTS,
            "could not draw a distinct short id for a batch item"
        );
        Err(ShortenerError::GenerationExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn candidate_batch(&self, items: &[BatchItem]) -> Result<Vec<UrlMapping>> {
        let mut taken = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| {
                let id = self.distinct_candidate(&mut taken)?;
                Ok(UrlMapping::new(id, item.original_url.as_str()))
            })
            .collect()
    }

    /// Returns the mapping an earlier request stored for `url`.
    async fn existing(&self, url: &str) -> Result<Shortened> {
        match self.repository.get_id_by_url(url).await {
            Ok(short_id) => Ok(Shortened {
                short_url: short_id.to_url(&self.base_url),
                short_id,
                created: false,
            }),
            Err(StorageError::Deleted(_)) => Err(ShortenerError::UrlDeleted(url.to_owned())),
            Err(err) => {
                error!(%err, "failed to look up existing mapping");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, original_url: &str, owner: &OwnerId) -> Result<Shortened> {
        Self::validate_url(original_url)?;

        for attempt in 1..=MAX_ATTEMPTS {
            let short_id = self.generate_id()?;

            match self.repository.create(&short_id, original_url, owner).await {
                Ok(()) => {
                    debug!(short_id = %short_id, owner = %owner, "shortened url");
                    return Ok(Shortened {
                        short_url: short_id.to_url(&self.base_url),
                        short_id,
                        created: true,
                    });
                }
                Err(StorageError::IdAlreadyExists(_)) => {
                    info!(
                        attempt,
                        max = MAX_ATTEMPTS,
                        short_id = %short_id,
                        "short id collision detected, retrying"
                    );
                }
                Err(StorageError::UrlAlreadyExists(_)) => return self.existing(original_url).await,
                Err(err) => {
                    error!(%err, "failed to store mapping");
                    return Err(err.into());
                }
            }
        }

        error!(max = MAX_ATTEMPTS, "short id generation exhausted");
        Err(ShortenerError::GenerationExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    async fn shorten_batch(
        &self,
        items: &[BatchItem],
        owner: &OwnerId,
    ) -> Result<Vec<BatchShortened>> {
        if items.is_empty() {
            return Err(ShortenerError::EmptyBatch);
        }
        for item in items {
            Self::validate_url(&item.original_url)?;
        }

        for attempt in 1..=MAX_ATTEMPTS {
            let candidates = self.candidate_batch(items)?;

            match self.repository.create_batch(&candidates, owner).await {
                Ok(()) => {
                    debug!(count = items.len(), owner = %owner, "shortened url batch");
                    return Ok(items
                        .iter()
                        .zip(candidates)
                        .map(|(item, mapping)| BatchShortened {
                            correlation_id: item.correlation_id.clone(),
                            short_url: mapping.short_id.to_url(&self.base_url),
                        })
                        .collect());
                }
                Err(StorageError::IdAlreadyExists(short_id)) => {
                    info!(
                        attempt,
                        max = MAX_ATTEMPTS,
                        short_id = %short_id,
                        "short id collision detected in batch, regenerating every id"
                    );
                }
                Err(StorageError::UrlAlreadyExists(url)) => {
                    return Err(ShortenerError::UrlConflict(url));
                }
                Err(err) => {
                    error!(%err, "failed to store mapping batch");
                    return Err(err.into());
                }
            }
        }

        error!(max = MAX_ATTEMPTS, "short id generation exhausted for batch");
        Err(ShortenerError::GenerationExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    async fn resolve(&self, id: &ShortId) -> Result<String> {
        self.repository
            .get_url_by_id(id)
            .await
            .map_err(|err| match err {
                StorageError::NotFound(id) => ShortenerError::NotFound(id),
                StorageError::Deleted(id) => ShortenerError::Deleted(id),
                other => other.into(),
            })
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<OwnedUrl>> {
        let mappings = self.repository.get_urls_by_owner(owner).await?;
        Ok(mappings
            .into_iter()
            .map(|mapping| OwnedUrl {
                short_url: mapping.short_id.to_url(&self.base_url),
                original_url: mapping.original_url,
            })
            .collect())
    }

    async fn delete(&self, owner: &OwnerId, ids: &[ShortId]) -> Result<u64> {
        let deleted = self.repository.delete_batch(owner, ids).await?;
        debug!(requested = ids.len(), deleted, owner = %owner, "tombstoned urls");
        Ok(deleted)
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.repository.ping().await?)
    }
}
