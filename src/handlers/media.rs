// Profile media handlers
// Uploads are multipart with a single file field. Quotas come from the
// entitlement row, limits from the media policy; both run before any byte
// is written to storage.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::{profiles::load_own_profile, ApiResponse},
    middleware::auth::AuthenticatedUser,
    models::profile::{Profile, ProfileUpdate},
    services::{
        entitlements::Entitlements,
        media::{self, MediaKind},
    },
    storage::buckets,
    utils::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct DeletePhotoRequest {
    pub url: String,
}

/// Pull the single file field out of a multipart body
pub(crate) async fn read_upload_field(
    multipart: &mut Multipart,
) -> Result<(String, Bytes), ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::Validation("No file in request".to_string()))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| ApiError::Validation("File has no content type".to_string()))?
        .to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }

    Ok((content_type, bytes))
}

fn entitlements_for(profile: &Profile) -> Entitlements {
    Entitlements::for_account(profile.user_type_enum(), profile.verification_status)
}

/// POST /api/profile/photos
pub async fn upload_photo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;
    let entitlements = entitlements_for(&profile);

    let mut photos = profile.photo_urls();
    if photos.len() >= entitlements.max_photos {
        return Err(ApiError::Precondition {
            code: "PHOTO_LIMIT_REACHED",
            message: format!(
                "Photo limit of {} reached for this account",
                entitlements.max_photos
            ),
        });
    }

    let (content_type, bytes) = read_upload_field(&mut multipart).await?;
    let kind = media::classify(&content_type)?;
    if kind != MediaKind::Photo {
        return Err(ApiError::Validation(
            "Expected a photo upload".to_string(),
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
        .upload(buckets::PHOTOS, &object_path, &bytes)
        .await?;

    photos.push(url);
    let updated = match Profile::update(
        &mut conn,
        profile.id,
        ProfileUpdate {
            photos: Some(serde_json::json!(photos)),
            ..ProfileUpdate::default()
        },
    )
    .await
    {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(buckets::PHOTOS, &object_path).await {
                tracing::warn!(%object_path, error = %cleanup, "Orphaned photo object left behind");
            }
            return Err(e.into());
        },
    };

    tracing::info!(profile_id = %profile.id, count = photos.len(), "Photo uploaded");

    Ok(ApiResponse::ok(updated.photo_urls(), "Photo uploaded"))
}

/// DELETE /api/profile/photos
pub async fn delete_photo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<DeletePhotoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    let mut photos = profile.photo_urls();
    let before = photos.len();
    photos.retain(|url| url != &request.url);

    if photos.len() == before {
        return Err(ApiError::NotFound("Photo"));
    }

    let updated = Profile::update(
        &mut conn,
        profile.id,
        ProfileUpdate {
            photos: Some(serde_json::json!(photos)),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    Ok(ApiResponse::ok(updated.photo_urls(), "Photo removed"))
}

/// POST /api/profile/video
pub async fn upload_video(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;
    let entitlements = entitlements_for(&profile);

    if !entitlements.allows_video() {
        return Err(ApiError::Precondition {
            code: "VIDEO_PREMIUM_ONLY",
            message: "Profile video requires a premium account".to_string(),
        });
    }

    let (content_type, bytes) = read_upload_field(&mut multipart).await?;
    let kind = media::classify(&content_type)?;
    if kind != MediaKind::Video {
        return Err(ApiError::Validation(
            "Expected a video upload".to_string(),
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
        .upload(buckets::VIDEOS, &object_path, &bytes)
        .await?;

    let updated = match Profile::update(
        &mut conn,
        profile.id,
        ProfileUpdate {
            video_url: Some(Some(url)),
            ..ProfileUpdate::default()
        },
    )
    .await
    {
        Ok(updated) => updated,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(buckets::VIDEOS, &object_path).await {
                tracing::warn!(%object_path, error = %cleanup, "Orphaned video object left behind");
            }
            return Err(e.into());
        },
    };

    tracing::info!(profile_id = %profile.id, "Profile video uploaded");

    Ok(ApiResponse::ok(updated.video_url, "Video uploaded"))
}

/// DELETE /api/profile/video
pub async fn delete_video(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    if profile.video_url.is_none() {
        return Err(ApiError::NotFound("Video"));
    }

    Profile::update(
        &mut conn,
        profile.id,
        ProfileUpdate {
            video_url: Some(None),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Video removed"))
}
