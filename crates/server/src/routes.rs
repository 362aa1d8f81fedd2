//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Content reads (served through the cache)
        .route("/api/trustControls", get(handlers::get_trust_controls))
        .route("/api/allTeams", get(handlers::get_all_teams))
        .route("/api/trustFaqs", get(handlers::get_trust_faqs))
        // Cache administration
        .route("/api/admin/clear-cache", post(handlers::clear_cache))
        .route("/api/admin/cache-stats", get(handlers::cache_stats))
        // Health check (unauthenticated for probes)
        .route("/api/health", get(handlers::health_check));

    let mut router = Router::new().merge(api_routes);

    // When enabled, restrict /metrics to scrapers at the network level.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    if let Some(cors) = cors_layer(&state.config.server.cors_origins) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// CORS for the configured front-end origins. `None` when no origin is usable.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
