// Review handlers
// Anyone can leave a review on a visible profile; it lands in the
// moderation queue as pending and only approved reviews show publicly.
// Owners see everything they received and can flag a pending review.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    handlers::{profiles::load_own_profile, ApiResponse},
    middleware::auth::AuthenticatedUser,
    models::{
        profile::{Profile, ProfileError},
        review::{NewReview, Review},
    },
    utils::ApiError,
};

const MIN_RATING: i32 = 1;
const MAX_RATING: i32 = 5;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    #[validate(length(min = 1, max = 100, message = "Reviewer name must be 1-100 characters"))]
    pub reviewer_name: String,
    pub rating: i32,
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub comment: String,
}

async fn visible_profile(
    conn: &mut diesel_async::AsyncPgConnection,
    profile_id: Uuid,
) -> Result<Profile, ApiError> {
    match Profile::find_by_id(conn, profile_id).await {
        Ok(profile) if !profile.is_hidden => Ok(profile),
        Ok(_) | Err(ProfileError::NotFound) => Err(ApiError::NotFound("Profile")),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/listings/{id}/reviews
/// Public submission; the review stays pending until an admin rules on it.
pub async fn submit_review(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(ApiError::Validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    let mut conn = state.diesel_pool.get().await?;
    let profile = visible_profile(&mut conn, profile_id).await?;

    let created = Review::create(
        &mut conn,
        NewReview {
            profile_id: profile.id,
            reviewer_name: request.reviewer_name.trim().to_string(),
            rating: request.rating,
            comment: request.comment.trim().to_string(),
        },
    )
    .await?;

    tracing::info!(profile_id = %profile.id, review_id = %created.id, "Review submitted");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created, "Review submitted for moderation"),
    ))
}

/// GET /api/listings/{id}/reviews
pub async fn list_public_reviews(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = visible_profile(&mut conn, profile_id).await?;

    let reviews = Review::list_approved_for_profile(&mut conn, profile.id).await?;

    Ok(ApiResponse::ok(reviews, "OK"))
}

/// GET /api/profile/reviews
/// Owner view: every received review in every moderation state.
pub async fn list_own_reviews(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    let reviews = Review::list_for_profile(&mut conn, profile.id).await?;

    Ok(ApiResponse::ok(reviews, "OK"))
}

/// POST /api/profile/reviews/{id}/flag
pub async fn flag_review(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    let flagged = Review::flag(&mut conn, review_id, profile.id).await?;

    tracing::info!(review_id = %flagged.id, profile_id = %profile.id, "Review flagged");

    Ok(ApiResponse::ok(flagged, "Review flagged for moderation"))
}
