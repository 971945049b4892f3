// Story handlers
// 24-hour ephemeral media for premium accounts. Views are idempotent per
// viewer, reactions replace on re-react.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::{media::read_upload_field, profiles::load_own_profile, ApiResponse},
    middleware::auth::AuthenticatedUser,
    models::{
        profile::Profile,
        story::{Story, StoryReaction, StoryView},
    },
    services::{media, story},
    storage::buckets,
    utils::ApiError,
};

const MAX_REACTION_CHARS: usize = 16;

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub reaction: String,
}

/// POST /api/stories
pub async fn create_story(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = load_own_profile(&mut conn, &auth).await?;

    let (content_type, bytes) = read_upload_field(&mut multipart).await?;
    let kind = media::classify(&content_type)?;
    media::validate(kind, &content_type, bytes.len() as u64)?;

    let object_path = format!(
        "{}/{}.{}",
        profile.id,
        Uuid::new_v4(),
        media::extension_for(&content_type)
    );
    let url = state
        .storage
        .upload(buckets::STORIES, &object_path, &bytes)
        .await?;

    let created = match story::create_story(&mut conn, &profile, url, content_type).await {
        Ok(created) => created,
        Err(e) => {
            // The object is orphaned without its row; remove it before failing
            if let Err(cleanup) = state.storage.delete(buckets::STORIES, &object_path).await {
                tracing::warn!(%object_path, error = %cleanup, "Orphaned story object left behind");
            }
            return Err(e.into());
        },
    };

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created, "Story posted"),
    ))
}

/// GET /api/stories
pub async fn list_stories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let stories = story::active_stories(&mut conn).await?;

    Ok(ApiResponse::ok(stories, "OK"))
}

/// GET /api/stories/{id}
/// Story with its engagement counters and reactions.
pub async fn get_story(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let found = find_visible_story(&mut conn, story_id).await?;

    let views = StoryView::count_for_story(&mut conn, found.id)
        .await
        .map_err(story::StoryServiceError::from)?;
    let reactions = StoryReaction::list_for_story(&mut conn, found.id)
        .await
        .map_err(story::StoryServiceError::from)?;

    Ok(ApiResponse::ok(
        serde_json::json!({
            "story": found,
            "views": views,
            "reactions": reactions,
        }),
        "OK",
    ))
}

/// DELETE /api/stories/{id}
pub async fn delete_story(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let profile = Profile::find_by_user_id(&mut conn, auth.uuid()?).await?;

    story::delete_own_story(&mut conn, story_id, profile.id).await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Story deleted"))
}

/// Expired stories are indistinguishable from deleted ones
async fn find_visible_story(
    conn: &mut diesel_async::AsyncPgConnection,
    story_id: Uuid,
) -> Result<Story, ApiError> {
    let found = Story::find_by_id(conn, story_id)
        .await
        .map_err(story::StoryServiceError::from)?;

    if !story::is_visible(Utc::now(), found.expires_at) {
        return Err(ApiError::NotFound("Story"));
    }

    Ok(found)
}

/// POST /api/stories/{id}/view
pub async fn record_view(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.diesel_pool.get().await?;
    let found = find_visible_story(&mut conn, story_id).await?;

    story::record_view(&mut conn, found.id, auth.uuid()?).await?;

    Ok(ApiResponse::ok(serde_json::json!({}), "Recorded"))
}

/// PUT /api/stories/{id}/reaction
pub async fn react(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<ReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reaction = request.reaction.trim().to_string();
    if reaction.is_empty() || reaction.chars().count() > MAX_REACTION_CHARS {
        return Err(ApiError::Validation("Invalid reaction".to_string()));
    }

    let mut conn = state.diesel_pool.get().await?;
    let found = find_visible_story(&mut conn, story_id).await?;

    let saved = story::react(&mut conn, found.id, auth.uuid()?, reaction).await?;

    Ok(ApiResponse::ok(saved, "Reaction saved"))
}
