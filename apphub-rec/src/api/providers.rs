//! Provider configuration status endpoint
//!
//! Lets the UI tell the user which integrations are live before they
//! start a survey; an unconfigured chat provider means recommendations
//! cannot be produced at all, while missing catalog keys only degrade
//! results to AI-sourced fallbacks.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Which external providers have API keys configured
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    /// Chat completion (required; nothing works without it)
    pub chat: bool,
    /// Film/TV catalog
    pub films: bool,
    /// Game catalog
    pub games: bool,
    /// Business search
    pub dining: bool,
}

/// GET /api/providers
pub async fn provider_status(State(state): State<AppState>) -> Json<ProviderStatus> {
    Json(state.providers.clone())
}

/// Build provider status routes
pub fn provider_routes() -> Router<AppState> {
    Router::new().route("/api/providers", get(provider_status))
}
