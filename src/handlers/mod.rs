// HTTP handlers and route builders

pub mod admin;
pub mod auth;
pub mod listings;
pub mod media;
pub mod profiles;
pub mod reviews;
pub mod stats;
pub mod stories;

use axum::extract::DefaultBodyLimit;
use axum::response::Json;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use serde::Serialize;

use crate::app::AppState;
use crate::services::media::MAX_VIDEO_BYTES;

/// Standard success envelope mirrored by the error responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
        })
    }
}

/// Multipart bodies need headroom above the largest allowed video
const UPLOAD_BODY_LIMIT: usize = MAX_VIDEO_BYTES as usize + 1024 * 1024;

/// Public authentication endpoints
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Authenticated session endpoints
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/logout", post(auth::logout))
        .route("/change-password", post(auth::change_password))
        .route("/login-history", get(auth::login_history))
}

/// Owner-facing profile endpoints
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(profiles::get_own_profile)
                .put(profiles::upsert_own_profile)
                .delete(profiles::delete_own_profile),
        )
        .route("/visibility", patch(profiles::set_visibility))
        .route("/entitlements", get(profiles::get_entitlements))
        .route("/promo", post(profiles::redeem_promo))
        .route("/referrals", get(profiles::get_referral_progress))
        .route(
            "/referrals/acknowledge",
            post(profiles::acknowledge_referral_reward),
        )
        .route("/stats", get(stats::get_profile_stats))
        .route("/reviews", get(reviews::list_own_reviews))
        .route("/reviews/{id}/flag", post(reviews::flag_review))
        .route(
            "/photos",
            post(media::upload_photo).delete(media::delete_photo),
        )
        .route(
            "/video",
            post(media::upload_video).delete(media::delete_video),
        )
        .route("/verification", post(profiles::submit_verification))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Public directory endpoints
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::list_profiles))
        .route("/{id}", get(listings::get_public_profile))
        .route("/{id}/events", post(listings::record_stat_event))
        .route(
            "/{id}/reviews",
            post(reviews::submit_review).get(reviews::list_public_reviews),
        )
}

/// Story endpoints (authenticated)
pub fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(stories::create_story).get(stories::list_stories))
        .route("/{id}", get(stories::get_story).delete(stories::delete_story))
        .route("/{id}/view", post(stories::record_view))
        .route("/{id}/reaction", put(stories::react))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Admin endpoints; every handler checks the admin scope itself
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/promo-codes",
            post(admin::create_promo_code).get(admin::list_promo_codes),
        )
        .route(
            "/promo-codes/{id}/deactivate",
            post(admin::deactivate_promo_code),
        )
        .route("/promo-codes/{id}", delete(admin::delete_promo_code))
        .route("/verifications", get(admin::list_pending_verifications))
        .route(
            "/verifications/{id}/approve",
            post(admin::approve_verification),
        )
        .route(
            "/verifications/{id}/reject",
            post(admin::reject_verification),
        )
        .route("/reviews", get(admin::list_reviews))
        .route("/reviews/{id}/approve", post(admin::approve_review))
        .route("/reviews/{id}/reject", post(admin::reject_review))
        .route("/reviews/{id}", delete(admin::delete_review))
        .route("/profiles/{id}/visibility", patch(admin::set_profile_visibility))
        .route("/profiles/{id}", delete(admin::delete_profile))
        .route("/users/{id}", delete(admin::delete_user))
}
