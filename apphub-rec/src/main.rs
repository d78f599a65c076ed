//! apphub-rec - Recommendation Service
//!
//! Backs the AppHub survey UI: turns a completed question flow into a
//! list of enriched recommendations by combining a chat-completion
//! model with external content catalogs (film/TV, games, businesses).

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use apphub_rec::config::ProvidersConfig;
use apphub_rec::AppState;

const BIND_ADDR: &str = "127.0.0.1:5725";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting apphub-rec (Recommendation Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Provider configuration is read once here and injected; leaf code
    // never touches the environment
    let config = ProvidersConfig::load()?;

    let state = AppState::new(&config)?;
    let app = apphub_rec::build_router(state);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    info!("Listening on http://{}", BIND_ADDR);
    info!("Health check: http://{}/health", BIND_ADDR);

    axum::serve(listener, app).await?;

    Ok(())
}
