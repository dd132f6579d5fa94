//! HTTP client for the remote catalog API
//!
//! Wraps a [`reqwest::Client`] with the retry and paging rules the remote
//! API needs: exponential backoff on retryable status codes and transport
//! errors, immediate failure on everything else, and a page walker that
//! derives the total page count from the first page.

use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use super::config::SwapiConfig;
use super::{ImportError, Result};

/// One page of a paginated resource listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope {
    /// Total records across all pages, as reported by the remote API
    #[serde(default)]
    pub count: u64,
    /// Raw records on this page
    pub results: Vec<serde_json::Value>,
}

/// Client for paginated catalog resources.
pub struct SwapiClient {
    client: reqwest::Client,
    config: SwapiConfig,
}

impl SwapiClient {
    /// Create a new client from import settings.
    pub fn new(config: SwapiConfig) -> Result<Self> {
        // The upstream host serves an expired certificate chain, so
        // verification is disabled for this client only.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout())
            .user_agent("holocron-catalog-import/1.0")
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch one page of a resource, retrying retryable failures.
    ///
    /// Retryable failures (transport errors and configured status codes)
    /// back off `2^attempt` seconds after every failed attempt before the
    /// next one. Non-retryable status codes, malformed payloads and decode
    /// errors fail immediately without touching the network again.
    pub async fn fetch_page(&self, resource: &str, page: u64) -> Result<PageEnvelope> {
        for attempt in 0..self.config.max_retries {
            match self.try_fetch(resource, page).await {
                Ok(envelope) => return Ok(envelope),
                Err(err) if err.is_retryable(&self.config.retryable_codes) => {
                    let backoff_secs = 2u64.pow(attempt);
                    warn!(
                        "Fetch attempt {}/{} for {} page {} failed: {}",
                        attempt + 1,
                        self.config.max_retries,
                        resource,
                        page,
                        err
                    );
                    info!("Retrying in {} seconds...", backoff_secs);
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                }
                Err(err) => {
                    error!("Giving up on {} page {}: {}", resource, page, err);
                    return Err(err);
                }
            }
        }

        Err(ImportError::RetriesExhausted {
            resource: resource.to_string(),
            page,
            attempts: self.config.max_retries,
        })
    }

    /// Fetch every record of a resource, walking all pages in order.
    ///
    /// The page size is taken from the first page's record count and the
    /// total page count derived from the envelope's `count` field. Any page
    /// failure aborts the walk.
    pub async fn fetch_all(&self, resource: &str) -> Result<Vec<serde_json::Value>> {
        info!("Fetching all {} records", resource);

        let first_page = self.fetch_page(resource, 1).await?;
        let pages = total_pages(first_page.count, first_page.results.len());
        let mut records = first_page.results;

        for page in 2..=pages {
            info!("Fetching {} page {}/{}", resource, page, pages);
            let envelope = self.fetch_page(resource, page).await?;
            records.extend(envelope.results);
        }

        info!("Fetched {} {} records", records.len(), resource);
        Ok(records)
    }

    async fn try_fetch(&self, resource: &str, page: u64) -> Result<PageEnvelope> {
        let url = format!("{}/{}/?page={}", self.config.base_url, resource, page);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Status {
                status: status.as_u16(),
                resource: resource.to_string(),
                page,
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;

        match value.as_object() {
            Some(map) if map.contains_key("results") => {}
            _ => {
                return Err(ImportError::MalformedPayload {
                    resource: resource.to_string(),
                    page,
                })
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Number of pages needed for `total_count` records when the first page
/// held `first_page_len` of them. An empty first page counts as size 1 so
/// the division stays defined.
fn total_pages(total_count: u64, first_page_len: usize) -> u64 {
    let page_size = if first_page_len == 0 {
        1
    } else {
        first_page_len as u64
    };
    (total_count + page_size - 1) / page_size
}
