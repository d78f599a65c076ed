//! HTTP API handlers for apphub-rec

pub mod health;
pub mod providers;
pub mod recommendations;

pub use health::health_routes;
pub use providers::provider_routes;
pub use recommendations::recommendation_routes;
