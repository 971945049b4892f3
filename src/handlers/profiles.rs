// Owner-facing profile handlers
// The profile row is created lazily on first save; reads run the lazy
// premium downgrade before anything derived from the tier is computed.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::profile::{NewProfile, Profile, ProfileError, ProfileUpdate},
    services::{
        entitlements::Entitlements,
        media::{self, MediaKind},
        premium, promo,
        referral::{self, RewardProgress},
    },
    storage::buckets,
    utils::{validate_adult, validate_description, validate_phone, ApiError},
};

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub birth_date: NaiveDate,

    pub phone: String,

    #[validate(length(min = 1, max = 100))]
    pub county: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    pub address: Option<String>,
    pub description: Option<String>,
    pub services: Option<Vec<String>>,
    pub incall_rates: Option<serde_json::Value>,
    pub outcall_rates: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

/// Premium window state for the owner dashboard
#[derive(Debug, Serialize)]
pub struct PremiumView {
    pub period: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Everything the owner dashboard needs in one response
#[derive(Debug, Serialize)]
pub struct OwnerProfileView {
    pub profile: Profile,
    pub entitlements: Entitlements,
    pub premium: PremiumView,
    pub referrals: RewardProgress,
}

impl OwnerProfileView {
    fn build(profile: Profile) -> Self {
        let entitlements =
            Entitlements::for_account(profile.user_type_enum(), profile.verification_status);
        let premium = PremiumView {
            period: profile.premium_period.clone(),
            started_at: profile.premium_started_at,
            expires_at: profile.premium_expires_at,
            active: profile
                .premium_expires_at
                .map(|expires| premium::is_active(Utc::now(), expires))
                .unwrap_or(false),
        };
        let referrals = referral::reward_progress(profile.referral_count);

        Self {
            profile,
            entitlements,
            premium,
            referrals,
        }
    }
}

fn validate_profile_request(request: &ProfileRequest) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validate_phone(&request.phone).map_err(|e| ApiError::Validation(e.code.to_string()))?;
    validate_adult(request.birth_date).map_err(|e| ApiError::Validation(e.code.to_string()))?;
    if let Some(description) = request.description.as_deref() {
        validate_description(description)
            .map_err(|e| ApiError::Validation(e.code.to_string()))?;
    }
    Ok(())
}

/// Load the caller's profile, applying the lazy premium downgrade
pub(crate) async fn load_own_profile(
    conn: &mut diesel_async::AsyncPgConnection,
    auth: &AuthenticatedUser,
) -> Result<Profile, ApiError> {
    let profile = Profile::find_by_user_id(conn, auth.uuid()?).await?;
    Ok(premium::refresh_if_lapsed(conn, profile).await?)
}

/// GET /api/profile
pub async fn get_own_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    Ok(ApiResponse::ok(OwnerProfileView::build(profile), "OK"))
}

/// PUT /api/profile
/// Creates the profile on first save, updates it afterwards.
pub async fn upsert_own_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<ProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_profile_request(&request)?;

    let mut conn = state.diesel_pool.get().await?;
    let owner_id = auth.uuid()?;

    match Profile::find_by_user_id(&mut conn, owner_id).await {
        Ok(existing) => {
            let changes = ProfileUpdate {
                name: Some(request.name),
                birth_date: Some(request.birth_date),
                phone: Some(request.phone),
                county: Some(request.county),
                city: Some(request.city),
                address: Some(request.address),
                description: Some(request.description),
                services: request.services.map(|s| serde_json::json!(s)),
                incall_rates: request.incall_rates,
                outcall_rates: request.outcall_rates,
                ..ProfileUpdate::default()
            };

            let updated = Profile::update(&mut conn, existing.id, changes).await?;
            Ok((
                StatusCode::OK,
                ApiResponse::ok(OwnerProfileView::build(updated), "Profile updated"),
            ))
        },
        Err(ProfileError::NotFound) => {
            let created = create_profile(&mut conn, owner_id, request).await?;
            Ok((
                StatusCode::CREATED,
                ApiResponse::ok(OwnerProfileView::build(created), "Profile created"),
            ))
        },
        Err(e) => Err(e.into()),
    }
}

async fn create_profile(
    conn: &mut diesel_async::AsyncPgConnection,
    owner_id: Uuid,
    request: ProfileRequest,
) -> Result<Profile, ApiError> {
    // Referral code collisions are vanishingly rare at 36^8; retry a couple
    // of times rather than locking anything
    for _ in 0..3 {
        let new_profile = NewProfile {
            user_id: owner_id,
            name: request.name.clone(),
            birth_date: request.birth_date,
            phone: request.phone.clone(),
            county: request.county.clone(),
            city: request.city.clone(),
            address: request.address.clone(),
            description: request.description.clone(),
            services: serde_json::json!(request.services.clone().unwrap_or_default()),
            incall_rates: request
                .incall_rates
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            outcall_rates: request
                .outcall_rates
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            referral_code: referral::generate_referral_code(),
        };

        match Profile::create(conn, new_profile).await {
            Ok(profile) => {
                tracing::info!(profile_id = %profile.id, "Profile created");
                return Ok(profile);
            },
            Err(ProfileError::Database(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::Internal(
        "Could not allocate a referral code".to_string(),
    ))
}

/// DELETE /api/profile
pub async fn delete_own_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    Profile::delete(&mut conn, profile.id).await?;
    tracing::info!(profile_id = %profile.id, "Profile deleted by owner");

    Ok(ApiResponse::ok(serde_json::json!({}), "Profile deleted"))
}

/// PATCH /api/profile/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<VisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    let updated = Profile::set_hidden(&mut conn, profile.id, request.hidden).await?;
    Ok(ApiResponse::ok(
        OwnerProfileView::build(updated),
        "Visibility updated",
    ))
}

/// GET /api/profile/entitlements
pub async fn get_entitlements(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    let entitlements =
        Entitlements::for_account(profile.user_type_enum(), profile.verification_status);
    Ok(ApiResponse::ok(entitlements, "OK"))
}

/// POST /api/profile/promo
pub async fn redeem_promo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<RedeemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.code.trim().is_empty() {
        return Err(ApiError::Validation("Promo code is required".to_string()));
    }

    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    let redemption = promo::redeem(&mut conn, &request.code, profile.id).await?;
    Ok(ApiResponse::ok(redemption, "Premium activated"))
}

/// GET /api/profile/referrals
pub async fn get_referral_progress(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    let progress = referral::reward_progress(profile.referral_count);
    Ok(ApiResponse::ok(
        serde_json::json!({
            "referral_code": profile.referral_code,
            "progress": progress,
            "reward_pending": profile.earned_premium_reward,
        }),
        "OK",
    ))
}

/// POST /api/profile/referrals/acknowledge
pub async fn acknowledge_referral_reward(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    referral::acknowledge_reward(&mut conn, profile.id).await?;
    Ok(ApiResponse::ok(serde_json::json!({}), "Reward acknowledged"))
}

/// POST /api/profile/verification
/// Multipart upload of one verification photo; review is manual.
pub async fn submit_verification(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    let (content_type, bytes) = super::media::read_upload_field(&mut multipart).await?;
    let kind = media::classify(&content_type)?;
    if kind != MediaKind::Photo {
        return Err(ApiError::Validation(
            "Verification upload must be a photo".to_string(),
        ));
    }
    media::validate(kind, &content_type, bytes.len() as u64)?;

    let object_path = format!(
        "{}/{}.{}",
        profile.id,
        Uuid::new_v4(),
        media::extension_for(&content_type)
    );
    let url = state
        .storage
        .upload(buckets::VERIFICATIONS, &object_path, &bytes)
        .await?;

    let updated = Profile::submit_verification(&mut conn, profile.id, &url).await?;
    tracing::info!(profile_id = %profile.id, "Verification submitted");

    Ok(ApiResponse::ok(
        OwnerProfileView::build(updated),
        "Verification submitted",
    ))
}
