// Public directory handlers
// The listing is unauthenticated: hidden profiles are absent, contact
// details render only for tiers whose entitlements include them, and the
// order is the seeded tier-banded shuffle.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::ApiResponse,
    models::{
        profile::{Profile, ProfileError},
        profile_stat::StatEventType,
    },
    services::{
        entitlements::Entitlements,
        premium,
        ranking::{self, TierBand},
        stats,
    },
    utils::{age_in_years, ApiError},
};

const DEFAULT_PER_PAGE: usize = 15;
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub county: Option<String>,
    #[serde(rename = "type")]
    pub tier: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Shuffle seed echoed from a previous page of the same session
    pub seed: Option<u64>,
}

/// Directory card and public profile payload
#[derive(Debug, Serialize)]
pub struct PublicProfileView {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub county: String,
    pub city: String,
    pub description: Option<String>,
    pub services: Vec<String>,
    pub incall_rates: serde_json::Value,
    pub outcall_rates: serde_json::Value,
    pub verified: bool,
    pub premium: bool,
    pub photos: Vec<String>,
    pub video_url: Option<String>,
    /// Present only when the tier's entitlements include contact buttons
    pub phone: Option<String>,
}

impl PublicProfileView {
    fn build(profile: &Profile) -> Self {
        // Entitlements follow the effective band, not the raw tier, so a
        // lapsed-but-not-yet-downgraded premium row renders consistently
        let band = TierBand::effective(profile, Utc::now());
        let entitlements =
            Entitlements::for_account(band.as_user_type(), profile.verification_status);

        let mut photos = profile.photo_urls();
        photos.truncate(entitlements.max_photos);

        Self {
            id: profile.id,
            name: profile.name.clone(),
            age: age_in_years(profile.birth_date),
            county: profile.county.clone(),
            city: profile.city.clone(),
            description: profile.description.clone(),
            services: profile.service_tags(),
            incall_rates: profile.incall_rates.clone(),
            outcall_rates: profile.outcall_rates.clone(),
            verified: profile.verification_status,
            premium: band == TierBand::Premium,
            photos,
            video_url: if band == TierBand::Premium {
                profile.video_url.clone()
            } else {
                None
            },
            phone: if entitlements.show_contact_buttons {
                Some(profile.phone.clone())
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub results: Vec<PublicProfileView>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    /// Echo this back to keep later pages in the same order
    pub seed: u64,
}

/// GET /api/listings
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;

    let candidates = Profile::listing_candidates(
        &mut conn,
        query.county.as_deref(),
        query.tier.as_deref(),
    )
    .await?;

    let seed = query.seed.unwrap_or_else(ranking::mint_seed);
    let now = Utc::now();
    let ranked = ranking::rank_listing(candidates, |p| TierBand::effective(p, now), seed);

    let page = query.page.unwrap_or(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let total = ranked.len();

    let results = ranking::page_slice(&ranked, page, per_page)
        .iter()
        .map(PublicProfileView::build)
        .collect();

    Ok(ApiResponse::ok(
        ListingPage {
            results,
            total,
            page: page.max(1),
            per_page,
            seed,
        },
        "OK",
    ))
}

/// GET /api/listings/{id}
/// Hidden profiles 404 on the public route regardless of who asks.
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;

    let profile = match Profile::find_by_id(&mut conn, profile_id).await {
        Ok(profile) if !profile.is_hidden => profile,
        Ok(_) | Err(ProfileError::NotFound) => return Err(ApiError::NotFound("Profile")),
        Err(e) => return Err(e.into()),
    };

    // Public reads are where lapsed premium windows actually get downgraded
    let profile = premium::refresh_if_lapsed(&mut conn, profile).await?;

    Ok(ApiResponse::ok(PublicProfileView::build(&profile), "OK"))
}

#[derive(Debug, Deserialize)]
pub struct StatEventRequest {
    pub event_type: StatEventType,
}

/// POST /api/listings/{id}/events
/// Fire-and-forget counters from the public profile page.
pub async fn record_stat_event(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<StatEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;

    let profile = match Profile::find_by_id(&mut conn, profile_id).await {
        Ok(profile) if !profile.is_hidden => profile,
        Ok(_) | Err(ProfileError::NotFound) => return Err(ApiError::NotFound("Profile")),
        Err(e) => return Err(e.into()),
    };

    stats::record_event(&mut conn, profile.id, request.event_type).await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Recorded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::UserType;
    use chrono::{Duration, NaiveDate};

    fn premium_profile(expires_at: chrono::DateTime<Utc>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1995, 6, 1).unwrap(),
            phone: "0712345678".to_string(),
            county: "Cluj".to_string(),
            city: "Cluj-Napoca".to_string(),
            address: None,
            description: None,
            services: serde_json::json!([]),
            incall_rates: serde_json::json!({}),
            outcall_rates: serde_json::json!({}),
            user_type: UserType::Premium.as_str().to_string(),
            verification_status: false,
            verification_photo: None,
            verification_submitted_at: None,
            is_hidden: false,
            photos: serde_json::json!((0..12)
                .map(|i| format!("/media/photos/p/{i}.jpg"))
                .collect::<Vec<_>>()),
            video_url: Some("/media/videos/p/intro.mp4".to_string()),
            premium_period: Some("12_months".to_string()),
            premium_started_at: Some(Utc::now() - Duration::days(30)),
            premium_expires_at: Some(expires_at),
            referral_code: "AAAA1111".to_string(),
            referral_count: 0,
            earned_premium_reward: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_premium_card_shows_full_surface() {
        let profile = premium_profile(Utc::now() + Duration::days(30));
        let view = PublicProfileView::build(&profile);

        assert!(view.premium);
        assert_eq!(view.photos.len(), 12);
        assert!(view.video_url.is_some());
        assert!(view.phone.is_some());
    }

    #[test]
    fn test_lapsed_premium_card_is_consistent_with_its_band() {
        // Not yet downgraded in the database, but the window is over: the
        // card must not keep premium-only surface while ranking standard
        let profile = premium_profile(Utc::now() - Duration::hours(1));
        let view = PublicProfileView::build(&profile);

        assert!(!view.premium);
        assert_eq!(view.photos.len(), 4);
        assert!(view.video_url.is_none());
        assert!(view.phone.is_none());
    }
}
