// Library exports for the Vitrina backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use app::{build_router, AppState};
pub use app_config::{AppConfig, CONFIG};
pub use db::{DieselPool, MIGRATIONS};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::auth::AccessTokenClaims;
pub use services::{
    Entitlements, JwtConfig, JwtError, JwtService, PromoError, Redemption, ReferralError,
    RewardProgress, TierBand,
};
pub use storage::{LocalStorage, ObjectStorage};
pub use utils::ApiError;

// Library initialization function for external consumers and the binary
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    // Initialize config
    let config = app_config::config();

    // Initialize database pool
    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::default();
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    // Run migrations if enabled
    if migrations::should_run_migrations() {
        info!("Running embedded migrations...");
        migrations::run_migrations()
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    }

    // Initialize services
    let jwt_service = Arc::new(JwtService::from_app_config());
    let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::from_config());

    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        jwt_service,
        storage,
        max_connections,
    })
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    let (overall_healthy, postgres_health) = match db::check_diesel_health(&state.diesel_pool).await
    {
        Ok(_) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let status = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if overall_healthy { "healthy" } else { "unhealthy" },
            "timestamp": timestamp,
            "services": {
                "postgres": postgres_health,
            }
        })),
    )
}
