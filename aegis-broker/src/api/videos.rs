//! Related-video endpoints: GET /videos/search, GET /videos/trending

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::videos::VideoSearchError;
use crate::AppState;

/// GET /videos/search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// GET /videos/search?query=...
pub async fn search_videos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    if params.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let videos = state
        .videos
        .search(&params.query)
        .await
        .map_err(map_video_error)?;
    Ok(Json(json!({ "videos": videos })))
}

/// GET /videos/trending
pub async fn trending_videos(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let videos = state.videos.trending().await.map_err(map_video_error)?;
    Ok(Json(json!({ "videos": videos })))
}

fn map_video_error(e: VideoSearchError) -> ApiError {
    match e {
        VideoSearchError::NotConfigured => ApiError::Unavailable(e.to_string()),
        other => ApiError::Upstream(other.to_string()),
    }
}

/// Build video routes
pub fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/videos/search", get(search_videos))
        .route("/videos/trending", get(trending_videos))
}
