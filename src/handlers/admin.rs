// Admin handlers
// Admin scope comes from the token; every handler checks it first so the
// route tree carries no special wiring.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::{
        profile::{PremiumPeriod, Profile},
        promo_code::PromoCode,
        review::{Review, ReviewStatus},
    },
    services::promo,
    utils::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct CreatePromoRequest {
    pub code: String,
    pub period: String,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/admin/promo-codes
pub async fn create_promo_code(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreatePromoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    if request.code.trim().is_empty() {
        return Err(ApiError::Validation("Promo code is required".to_string()));
    }

    let period = PremiumPeriod::from_str(&request.period)
        .map_err(ApiError::Validation)?;

    if matches!(request.max_uses, Some(n) if n <= 0) {
        return Err(ApiError::Validation(
            "max_uses must be positive".to_string(),
        ));
    }

    if matches!(request.expires_at, Some(at) if at <= Utc::now()) {
        return Err(ApiError::Validation(
            "expires_at must be in the future".to_string(),
        ));
    }

    let mut conn = state.diesel_pool.get().await?;
    let created = promo::create_code(
        &mut conn,
        &request.code,
        period,
        request.max_uses,
        request.expires_at,
        auth.uuid()?,
    )
    .await?;

    tracing::info!(code = created.code, "Promo code created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created, "Promo code created"),
    ))
}

/// GET /api/admin/promo-codes
pub async fn list_promo_codes(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let codes = PromoCode::list_all(&mut conn).await?;

    Ok(ApiResponse::ok(codes, "OK"))
}

/// POST /api/admin/promo-codes/{id}/deactivate
pub async fn deactivate_promo_code(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(code_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated = PromoCode::deactivate(&mut conn, code_id).await?;

    Ok(ApiResponse::ok(updated, "Promo code deactivated"))
}

/// DELETE /api/admin/promo-codes/{id}
pub async fn delete_promo_code(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(code_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    PromoCode::delete(&mut conn, code_id).await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Promo code deleted"))
}

/// GET /api/admin/verifications
pub async fn list_pending_verifications(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let pending = Profile::pending_verifications(&mut conn).await?;

    Ok(ApiResponse::ok(pending, "OK"))
}

/// POST /api/admin/verifications/{id}/approve
pub async fn approve_verification(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated = Profile::approve_verification(&mut conn, profile_id).await?;

    tracing::info!(profile_id = %profile_id, "Verification approved");

    Ok(ApiResponse::ok(updated, "Verification approved"))
}

/// POST /api/admin/verifications/{id}/reject
pub async fn reject_verification(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated = Profile::reject_verification(&mut conn, profile_id).await?;

    tracing::info!(profile_id = %profile_id, "Verification rejected");

    Ok(ApiResponse::ok(updated, "Verification rejected"))
}

#[derive(Debug, Deserialize)]
pub struct ModerationVisibilityRequest {
    pub hidden: bool,
}

/// PATCH /api/admin/profiles/{id}/visibility
pub async fn set_profile_visibility(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<ModerationVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated = Profile::set_hidden(&mut conn, profile_id, request.hidden).await?;

    tracing::info!(profile_id = %profile_id, hidden = request.hidden, "Moderation visibility change");

    Ok(ApiResponse::ok(updated, "Visibility updated"))
}

/// DELETE /api/admin/users/{id}
/// Removes the account; the profile and its stories cascade with it.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    if auth.uuid()? == user_id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    let mut conn = state.diesel_pool.get().await?;
    crate::models::user::User::delete(&mut conn, user_id).await?;

    tracing::info!(user_id = %user_id, "Account deleted by moderation");

    Ok(ApiResponse::ok(serde_json::json!({}), "Account deleted"))
}

/// DELETE /api/admin/profiles/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    Profile::delete(&mut conn, profile_id).await?;

    tracing::info!(profile_id = %profile_id, "Profile deleted by moderation");

    Ok(ApiResponse::ok(serde_json::json!({}), "Profile deleted"))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQueueQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewVerdictRequest {
    pub admin_note: Option<String>,
}

/// GET /api/admin/reviews?status=pending
/// Moderation queue; defaults to the pending backlog.
pub async fn list_reviews(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    axum::extract::Query(query): axum::extract::Query<ReviewQueueQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let queue_status = match query.status.as_deref() {
        None => ReviewStatus::Pending,
        Some(raw) => ReviewStatus::from_str(raw).map_err(ApiError::Validation)?,
    };

    let mut conn = state.diesel_pool.get().await?;
    let reviews = Review::list_by_status(&mut conn, queue_status).await?;

    Ok(ApiResponse::ok(reviews, "OK"))
}

/// POST /api/admin/reviews/{id}/approve
pub async fn approve_review(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(review_id): Path<Uuid>,
    Json(request): Json<ReviewVerdictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated =
        Review::set_status(&mut conn, review_id, ReviewStatus::Approved, request.admin_note)
            .await?;

    tracing::info!(review_id = %review_id, "Review approved");

    Ok(ApiResponse::ok(updated, "Review approved"))
}

/// POST /api/admin/reviews/{id}/reject
pub async fn reject_review(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(review_id): Path<Uuid>,
    Json(request): Json<ReviewVerdictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    let updated =
        Review::set_status(&mut conn, review_id, ReviewStatus::Rejected, request.admin_note)
            .await?;

    tracing::info!(review_id = %review_id, "Review rejected");

    Ok(ApiResponse::ok(updated, "Review rejected"))
}

/// DELETE /api/admin/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;

    let mut conn = state.diesel_pool.get().await?;
    Review::delete(&mut conn, review_id).await?;

    tracing::info!(review_id = %review_id, "Review deleted by moderation");

    Ok(ApiResponse::ok(serde_json::json!({}), "Review deleted"))
}
