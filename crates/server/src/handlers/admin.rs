//! Cache administration endpoints.

use crate::cache::CacheStats;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use trustcenter_core::Resource;

/// Request body for clearing the cache. An absent body clears everything.
#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
}

/// Response for a cache clear, including the stats after clearing.
#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub stats: CacheStats,
}

fn parse_clear_request(body: &[u8]) -> ApiResult<Option<Resource>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let request: ClearCacheRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;

    request
        .resource_type
        .as_deref()
        .map(|t| {
            t.parse::<Resource>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))
        })
        .transpose()
}

/// POST /api/admin/clear-cache
pub async fn clear_cache(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ClearCacheResponse>> {
    let resource = parse_clear_request(&body)?;

    state.cache.invalidate(resource).await;

    let message = match resource {
        Some(resource) => format!("Cache cleared for {resource}"),
        None => "All cache cleared".to_string(),
    };

    Ok(Json(ClearCacheResponse {
        success: true,
        message,
        timestamp: OffsetDateTime::now_utc(),
        stats: state.cache.stats(),
    }))
}

/// GET /api/admin/cache-stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
