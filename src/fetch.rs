//! HTTP downloads with an optional response cache.

use crate::cache::PageCache;
use crate::config::FetchConfig;
use crate::error::{MirrorError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Downloads pages and assets, reading through the cache when one is open.
pub struct Fetcher {
    client: Client,
    cache: Option<PageCache>,
    downloads: usize,
}

impl Fetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &FetchConfig, cache: Option<PageCache>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MirrorError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            cache,
            downloads: 0,
        })
    }

    /// Body of `url`, from the cache when present.
    pub async fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(url)? {
                debug!(url, "cache hit");
                return Ok(body);
            }
        }

        info!(url, "downloading");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::fetch(url, format!("HTTP {status}")));
        }
        let body = response.bytes().await?.to_vec();
        self.downloads += 1;

        if let Some(cache) = &self.cache {
            cache.set(url, &body)?;
        }
        Ok(body)
    }

    /// Number of bodies fetched over the network so far.
    pub fn downloads(&self) -> usize {
        self.downloads
    }

    /// Close the cache, if one is open.
    pub fn close(self) -> Result<()> {
        match self.cache {
            Some(cache) => {
                debug!(entries = cache.len()?, "closing response cache");
                cache.close()
            }
            None => Ok(()),
        }
    }
}
