//! apphub-rec library interface
//!
//! Exposes the recommendation pipeline and HTTP router for the binary
//! and for integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult, RecError};
pub use crate::services::Recommender;

use crate::api::providers::ProviderStatus;
use crate::config::ProvidersConfig;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Recommendation pipeline (chat client + catalog adapters)
    pub recommender: Arc<Recommender>,
    /// Configured-provider summary for the status endpoint
    pub providers: ProviderStatus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &ProvidersConfig) -> apphub_common::Result<Self> {
        let recommender = Recommender::new(config)
            .map_err(|e| apphub_common::Error::Internal(e.to_string()))?;

        Ok(Self {
            recommender: Arc::new(recommender),
            providers: ProviderStatus {
                chat: config.chat_configured(),
                films: config.films_configured(),
                games: config.games_configured(),
                dining: config.dining_configured(),
            },
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::recommendation_routes())
        .merge(api::provider_routes())
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        // The survey UI runs in a browser on a different origin
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
