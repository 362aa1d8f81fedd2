//! Server test utilities.

use super::store::MockContentStore;
use std::sync::Arc;
use std::time::Duration;
use trustcenter_core::config::AppConfig;
use trustcenter_server::{AppState, CacheService, create_router};

/// A router wired to a [`MockContentStore`].
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub store: Arc<MockContentStore>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn new() -> Self {
        Self::build(AppConfig::for_testing(), None)
    }

    /// Create a test server whose cache uses `ttl` instead of whole seconds.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::build(AppConfig::for_testing(), Some(ttl))
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing();
        modifier(&mut config);
        Self::build(config, None)
    }

    fn build(config: AppConfig, ttl: Option<Duration>) -> Self {
        let store = MockContentStore::new();
        let state = match ttl {
            Some(ttl) => {
                let cache = CacheService::new(store.clone(), ttl);
                AppState::with_cache(config, store.clone(), cache)
            }
            None => AppState::new(config, store.clone()),
        };
        let router = create_router(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    pub fn cache(&self) -> &CacheService {
        &self.state.cache
    }
}
