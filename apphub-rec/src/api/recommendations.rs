//! Recommendation endpoint
//!
//! The service boundary the survey UI calls once per completed
//! question flow. Terminal pipeline failures surface as 502 with the
//! provider's reason; everything else has already been degraded into
//! the option list by the orchestrator.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use apphub_common::types::{EnrichedOption, RecommendationRequest};

/// Response payload for a recommendation request
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub options: Vec<EnrichedOption>,
}

/// POST /api/recommendations
///
/// **Request:** `{"category": "eat", "answers": {"cuisine": ["italian"]}}`
/// **Response:** `{"options": [...]}` with up to 8 enriched options
pub async fn get_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> ApiResult<Json<RecommendationResponse>> {
    // Malformed bodies and unknown categories are the caller's fault
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    info!(
        category = request.category.as_str(),
        answer_count = request.answers.len(),
        "Recommendation request"
    );

    let options = state
        .recommender
        .get_recommendations(request.category, &request.answers)
        .await?;

    Ok(Json(RecommendationResponse { options }))
}

/// Build recommendation routes
pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/api/recommendations", post(get_recommendations))
}
