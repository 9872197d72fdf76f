//! SpecGen client with an in-memory response cache in front.
//!
//! Summary pages are cached for a short TTL so flipping between views does
//! not refetch; refresh goes through [`CachedSpecGenClient::summaries_fresh`]
//! which always hits the network. Generation and image fetches are never
//! cached.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::client::{GenerateRequest, SpecGenClient, SummaryQuery};
use crate::api::types::{GeneratedStory, SummaryPage};
use crate::cache::MemoryCache;
use crate::config::Config;

const SUMMARY_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct CachedSpecGenClient {
  inner: SpecGenClient,
  summaries: Arc<Mutex<MemoryCache<SummaryPage>>>,
}

impl CachedSpecGenClient {
  pub fn new(config: &Config) -> Result<Self> {
    Ok(Self {
      inner: SpecGenClient::new(config)?,
      summaries: Arc::new(Mutex::new(MemoryCache::new())),
    })
  }

  /// Fetch a summary page, serving from the in-memory cache when live.
  pub async fn summaries(&self, query: &SummaryQuery) -> Result<SummaryPage> {
    let key = query.cache_hash();
    {
      let mut cache = self.summaries.lock().await;
      if let Some(page) = cache.get(&key) {
        debug!(page = query.page, "summary page served from memory cache");
        return Ok(page.clone());
      }
    }

    let page = self.inner.summaries(query).await?;
    self
      .summaries
      .lock()
      .await
      .set(key, page.clone(), Some(SUMMARY_TTL));
    Ok(page)
  }

  /// Fetch a summary page from the network unconditionally, refreshing the
  /// cache entry on success.
  pub async fn summaries_fresh(&self, query: &SummaryQuery) -> Result<SummaryPage> {
    let page = self.inner.summaries(query).await?;
    self
      .summaries
      .lock()
      .await
      .set(query.cache_hash(), page.clone(), Some(SUMMARY_TTL));
    Ok(page)
  }

  /// Fetch a story image (never cached; the payload is large and rare).
  pub async fn image(&self, story_id: &str) -> Result<Vec<u8>> {
    self.inner.image(story_id).await
  }

  /// Submit a generation request (write operation, never cached).
  pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedStory> {
    self.inner.generate(request).await
  }
}
