// Application state and router assembly
use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    app_config::AppConfig,
    db::DieselPool,
    handlers,
    middleware::{auth_middleware, dynamic_cors_middleware},
    services::JwtService,
    storage::ObjectStorage,
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub max_connections: u32,
}

/// Build the full route tree. Listing and authentication entry points are
/// public; everything else sits behind the bearer-token middleware.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(crate::health_check))
        .nest("/api/auth", handlers::auth_routes())
        .nest("/api/listings", handlers::listing_routes());

    let protected = Router::new()
        .nest("/api/auth", handlers::session_routes())
        .nest("/api/profile", handlers::profile_routes())
        .nest("/api/stories", handlers::story_routes())
        .nest("/api/admin", handlers::admin_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum_middleware::from_fn(dynamic_cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
