// Statistics dashboard handler

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    app::AppState,
    handlers::{profiles::load_own_profile, ApiResponse},
    middleware::auth::AuthenticatedUser,
    services::{entitlements::Entitlements, stats},
    utils::ApiError,
};

const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i64>,
}

/// GET /api/profile/stats
pub async fn get_profile_stats(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    let entitlements =
        Entitlements::for_account(profile.user_type_enum(), profile.verification_status);
    if !entitlements.can_view_statistics {
        return Err(ApiError::Forbidden);
    }

    let window = query
        .days
        .unwrap_or(stats::DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);

    let profile_stats = stats::stats_for_profile(&mut conn, profile.id, window).await?;

    Ok(ApiResponse::ok(profile_stats, "OK"))
}
