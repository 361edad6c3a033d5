use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{FreshetError, Result};
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher, ProxyClient, RotationCursor};
use crate::ingest::Aggregator;
use crate::normalizer::Normalizer;
use crate::resolver::Resolver;
use crate::store::JsonStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub rotation: Arc<RotationCursor>,
    pub resolver: Resolver,
    pub aggregator: Aggregator,
    /// Held for the duration of a refresh so a second one is rejected
    /// instead of racing on the shared video cache.
    pub refresh_lock: tokio::sync::Mutex<()>,
}

impl AppContext {
    pub fn new(state_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(config, state_path)
    }

    pub fn with_config(config: Config, state_path: Option<PathBuf>) -> Result<Self> {
        let state_path = match state_path {
            Some(p) => p,
            None => Self::default_state_path()?,
        };

        let store = Arc::new(JsonStore::open(&state_path)?);
        let fetcher: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::with_timeout(config.fetch_timeout_secs));
        Ok(Self::assemble(config, store, fetcher))
    }

    /// Wire the pipeline around an arbitrary fetcher. Tests use this
    /// with a stub.
    pub fn assemble(config: Config, store: Arc<JsonStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        let rotation = Arc::new(RotationCursor::new());
        let proxy = ProxyClient::new(fetcher.clone(), config.proxies.clone());
        let normalizer = Normalizer::new();
        let resolver = Resolver::new(
            fetcher,
            proxy.clone(),
            rotation.clone(),
            normalizer.clone(),
            &config,
        );
        let aggregator = Aggregator::with_workers(
            proxy,
            normalizer,
            config.feed_url.clone(),
            config.workers,
        );

        Self {
            config,
            store,
            rotation,
            resolver,
            aggregator,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn default_state_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| FreshetError::Other("Could not find data directory".into()))?;
        let freshet_dir = data_dir.join("freshet");
        std::fs::create_dir_all(&freshet_dir)?;
        Ok(freshet_dir.join("state.json"))
    }
}
