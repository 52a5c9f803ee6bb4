use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::Result;
use crate::config::FeedConfig;
use crate::domain::Item;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

/// Fetches and parses many feeds concurrently, bounded by a semaphore.
///
/// This only produces item candidates; the caller serializes the upserts
/// into the store, one batch per refresh run.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn fetch_all(
        &self,
        feeds: Vec<FeedConfig>,
        normalizer: &Normalizer,
    ) -> Vec<(FeedConfig, Result<Vec<Item>>)> {
        let mut handles = Vec::new();

        for feed in feeds {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let normalizer = normalizer.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = fetch_single_feed(&fetcher, &feed.url, &normalizer).await;
                (feed, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

async fn fetch_single_feed(
    fetcher: &Arc<dyn Fetcher + Send + Sync>,
    url: &str,
    normalizer: &Normalizer,
) -> Result<Vec<Item>> {
    let body = fetcher.fetch(url).await?;
    let (_, items) = normalizer.normalize(url, &body)?;
    tracing::debug!("Fetched {} items from {}", items.len(), url);
    Ok(items)
}
