pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;
pub use parallel::{ParallelFetcher, DEFAULT_WORKERS};

/// Fetches the raw body of a feed document.
///
/// Feeds are refetched in full on every refresh; the storage engine's
/// upsert dedup makes that idempotent, so no conditional-request state is
/// carried.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
