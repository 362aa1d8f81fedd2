//! Application state shared across handlers.

use crate::cache::CacheService;
use std::sync::Arc;
use std::time::Duration;
use trustcenter_core::config::AppConfig;
use trustcenter_db::ContentStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Content database.
    pub store: Arc<dyn ContentStore>,
    /// Read-through cache in front of `store`.
    pub cache: CacheService,
}

impl AppState {
    /// Create a new application state with a fresh cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>) -> Self {
        if let Err(error) = config.validate() {
            panic!("Invalid configuration: {}", error);
        }

        let cache = CacheService::new(store.clone(), config.cache.ttl());

        Self {
            config: Arc::new(config),
            store,
            cache,
        }
    }

    /// Build state around an existing cache, e.g. one with a short test TTL.
    pub fn with_cache(config: AppConfig, store: Arc<dyn ContentStore>, cache: CacheService) -> Self {
        Self {
            config: Arc::new(config),
            store,
            cache,
        }
    }

    /// How often the background sweeper purges expired entries.
    pub fn sweep_interval(&self) -> Duration {
        self.config.cache.check_period()
    }
}
