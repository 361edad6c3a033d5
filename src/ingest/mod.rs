//! Batch feed ingestion.
//!
//! Fans out one fetch-parse task per tracked channel, bounded by a
//! semaphore, and joins every attempt before merging. One channel's
//! failure or latency never touches another's result; only a
//! zero-success batch is an overall failure.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{FreshetError, Result};
use crate::domain::{Channel, Video};
use crate::fetcher::ProxyClient;
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 4;

pub struct Aggregator {
    proxy: ProxyClient,
    normalizer: Normalizer,
    feed_url: String,
    semaphore: Arc<Semaphore>,
}

/// Result of a batch refresh: the merged, recency-sorted videos and how
/// many channels contributed.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub videos: Vec<Video>,
    pub succeeded: usize,
    pub attempted: usize,
}

impl Aggregator {
    pub fn new(proxy: ProxyClient, normalizer: Normalizer, feed_url: String) -> Self {
        Self::with_workers(proxy, normalizer, feed_url, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        proxy: ProxyClient,
        normalizer: Normalizer,
        feed_url: String,
        workers: usize,
    ) -> Self {
        Self {
            proxy,
            normalizer,
            feed_url,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Fetch and parse every channel's feed, merge the survivors, and
    /// sort descending by publish timestamp. The caller replaces the
    /// cache with the outcome; on `RefreshFailed` it must leave the
    /// existing cache untouched.
    pub async fn refresh_all(&self, channels: &[Channel]) -> Result<RefreshOutcome> {
        let mut handles = Vec::new();

        for channel in channels.iter().cloned() {
            let proxy = self.proxy.clone();
            let normalizer = self.normalizer.clone();
            let feed_url = format!("{}{}", self.feed_url, channel.id);
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = fetch_channel_videos(&proxy, &normalizer, &feed_url, &channel).await;
                (channel, result)
            }));
        }

        let attempted = handles.len();
        let mut videos = Vec::new();
        let mut succeeded = 0;

        for handle in handles {
            match handle.await {
                Ok((channel, Ok(batch))) => {
                    tracing::info!(
                        "Fetched {} videos from {}",
                        batch.len(),
                        channel.display_name()
                    );
                    videos.extend(batch);
                    succeeded += 1;
                }
                Ok((channel, Err(e))) => {
                    tracing::warn!("Refresh failed for {}: {}", channel.display_name(), e);
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        if attempted > 0 && succeeded == 0 {
            return Err(FreshetError::RefreshFailed);
        }

        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(RefreshOutcome {
            videos,
            succeeded,
            attempted,
        })
    }
}

async fn fetch_channel_videos(
    proxy: &ProxyClient,
    normalizer: &Normalizer,
    feed_url: &str,
    channel: &Channel,
) -> Result<Vec<Video>> {
    let body = proxy.fetch_via_proxies(feed_url).await?;
    normalizer.normalize(channel, body.as_bytes())
}
