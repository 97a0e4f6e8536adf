use serde::{Deserialize, Serialize};
use shortie_shortener::{BatchItem, BatchShortened, OwnedUrl};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequestItem {
    pub correlation_id: String,
    pub original_url: String,
}

impl From<BatchRequestItem> for BatchItem {
    fn from(item: BatchRequestItem) -> Self {
        BatchItem::new(item.correlation_id, item.original_url)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}

impl From<BatchShortened> for BatchResponseItem {
    fn from(item: BatchShortened) -> Self {
        Self {
            correlation_id: item.correlation_id,
            short_url: item.short_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrlResponse {
    pub short_url: String,
    pub original_url: String,
}

impl From<OwnedUrl> for UserUrlResponse {
    fn from(url: OwnedUrl) -> Self {
        Self {
            short_url: url.short_url,
            original_url: url.original_url,
        }
    }
}
