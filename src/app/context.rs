use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Runtime;
use crate::fetcher::{Fetcher, HttpFetcher, ParallelFetcher, DEFAULT_WORKERS};
use crate::normalizer::Normalizer;
use crate::store::{MemoryStore, SqliteStore, Store};

pub struct AppContext {
    pub runtime: Runtime,
    pub store: Arc<dyn Store + Send + Sync>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(runtime: Runtime) -> Result<Self> {
        Self::with_workers(runtime, DEFAULT_WORKERS)
    }

    /// Wire up a session. The backend is chosen here, exactly once: preview
    /// sessions get the ephemeral store, everything else the durable one.
    pub fn with_workers(runtime: Runtime, workers: usize) -> Result<Self> {
        let store: Arc<dyn Store + Send + Sync> = if runtime.is_preview_mode() {
            Arc::new(MemoryStore::new())
        } else {
            std::fs::create_dir_all(&runtime.config_dir)?;
            Arc::new(SqliteStore::new(runtime.database_path())?)
        };

        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new());
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher.clone(), workers);

        Ok(Self {
            runtime,
            store,
            fetcher,
            parallel_fetcher,
            normalizer: Normalizer::new(),
        })
    }
}
