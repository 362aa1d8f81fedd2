//! Content read endpoints.
//!
//! Every endpoint returns the same envelope: the resource's rows, where they
//! came from, and when the response was produced. A failed read returns a
//! generic error and no rows.

use crate::cache::{Fetched, Source};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use trustcenter_core::{Resource, Row};

/// Response envelope for a content read.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub source: Source,
    pub data: Arc<Vec<Row>>,
    pub cached: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<Fetched> for ContentResponse {
    fn from(fetched: Fetched) -> Self {
        Self {
            cached: fetched.is_cached(),
            source: fetched.source,
            data: fetched.data,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

async fn read_resource(state: &AppState, resource: Resource) -> ApiResult<Json<ContentResponse>> {
    let fetched = state.cache.fetch(resource).await.map_err(|e| {
        tracing::error!(resource = %resource, error = %e, "Failed to retrieve resource");
        ApiError::Retrieval(resource)
    })?;

    tracing::debug!(
        resource = %resource,
        rows = fetched.data.len(),
        cached = fetched.is_cached(),
        "Serving resource"
    );

    Ok(Json(fetched.into()))
}

/// GET /api/trustControls
pub async fn get_trust_controls(
    State(state): State<AppState>,
) -> ApiResult<Json<ContentResponse>> {
    read_resource(&state, Resource::Controls).await
}

/// GET /api/allTeams
pub async fn get_all_teams(State(state): State<AppState>) -> ApiResult<Json<ContentResponse>> {
    read_resource(&state, Resource::Teams).await
}

/// GET /api/trustFaqs
pub async fn get_trust_faqs(State(state): State<AppState>) -> ApiResult<Json<ContentResponse>> {
    read_resource(&state, Resource::Faqs).await
}
