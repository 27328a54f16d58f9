use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery, JSend};
use crate::content::{Collection, ContentError, ContentManager, Photoset, Video};
use crate::site::{self, filter_photosets, CategoryFilter};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct BackgroundResponse {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotosetParams {
    /// `all`, `editorial`, `campaign` or `lookbook`; anything else means all.
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn api_collections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<Collection>>>, ApiError> {
    let collections = ContentManager::<Collection>::new(Arc::clone(&state.backend))
        .list()
        .await
        .map_err(content_error)?;
    Ok(JSend::success(collections))
}

pub async fn api_photosets(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<PhotosetParams>,
) -> Result<Json<JSend<Vec<Photoset>>>, ApiError> {
    let photosets = ContentManager::<Photoset>::new(Arc::clone(&state.backend))
        .list()
        .await
        .map_err(content_error)?;
    let filter = CategoryFilter::parse(params.category.as_deref());
    Ok(JSend::success(filter_photosets(&photosets, filter)))
}

pub async fn api_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<Video>>>, ApiError> {
    let videos = ContentManager::<Video>::new(Arc::clone(&state.backend))
        .list()
        .await
        .map_err(content_error)?;
    Ok(JSend::success(videos))
}

pub async fn api_background(State(state): State<Arc<AppState>>) -> Json<JSend<BackgroundResponse>> {
    JSend::success(BackgroundResponse {
        url: site::background_image(&state.backend).await,
    })
}

/// Map a content error to an ApiError
fn content_error(e: ContentError) -> ApiError {
    tracing::error!(error = %e, "Failed to read content");
    match e {
        ContentError::Fetch { .. } => ApiError::unavailable(e.to_string()),
        _ => ApiError::internal(e.to_string()),
    }
}
