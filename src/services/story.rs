// Story service
// Premium-only ephemeral posts with a fixed 24-hour lifetime.

use chrono::{DateTime, Duration, Utc};
use diesel_async::AsyncPgConnection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::Profile;
use crate::models::story::{
    NewStory, NewStoryReaction, NewStoryView, Story, StoryError, StoryReaction, StoryView,
};
use crate::services::entitlements::Entitlements;

/// Fixed lifetime of a story
pub const STORY_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum StoryServiceError {
    #[error("Only premium accounts can post stories")]
    NotEntitled,

    #[error("Story not found")]
    NotFound,

    #[error("Story does not belong to this account")]
    NotOwner,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl From<StoryError> for StoryServiceError {
    fn from(e: StoryError) -> Self {
        match e {
            StoryError::NotFound => StoryServiceError::NotFound,
            StoryError::Database(e) => StoryServiceError::Database(e),
        }
    }
}

/// Expiry timestamp for a story created at `created_at`
pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(STORY_LIFETIME_HOURS)
}

/// Whether a story is still visible at `now`
pub fn is_visible(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> bool {
    now < expires_at
}

/// Post a story for a profile. The entitlement gate is the tier policy,
/// not a hardcoded tier check.
pub async fn create_story(
    conn: &mut AsyncPgConnection,
    profile: &Profile,
    media_url: String,
    media_type: String,
) -> Result<Story, StoryServiceError> {
    let entitlements =
        Entitlements::for_account(profile.user_type_enum(), profile.verification_status);
    if !entitlements.can_post_stories {
        return Err(StoryServiceError::NotEntitled);
    }

    let story = Story::create(
        conn,
        NewStory {
            profile_id: profile.id,
            media_url,
            media_type,
            expires_at: expiry_for(Utc::now()),
        },
    )
    .await?;

    tracing::info!(profile_id = %profile.id, story_id = %story.id, "Story posted");

    Ok(story)
}

/// All currently unexpired stories
pub async fn active_stories(conn: &mut AsyncPgConnection) -> Result<Vec<Story>, StoryServiceError> {
    Ok(Story::list_active(conn, Utc::now()).await?)
}

/// Early deletion by the owner
pub async fn delete_own_story(
    conn: &mut AsyncPgConnection,
    story_id: Uuid,
    owner_profile_id: Uuid,
) -> Result<(), StoryServiceError> {
    let story = Story::find_by_id(conn, story_id).await?;

    if story.profile_id != owner_profile_id {
        return Err(StoryServiceError::NotOwner);
    }

    Story::delete(conn, story_id).await?;
    Ok(())
}

/// Record a view; repeat views by the same account are no-ops
pub async fn record_view(
    conn: &mut AsyncPgConnection,
    story_id: Uuid,
    viewer_id: Uuid,
) -> Result<(), StoryServiceError> {
    StoryView::record(conn, NewStoryView { story_id, viewer_id }).await?;
    Ok(())
}

/// React to a story; re-reacting replaces the previous reaction
pub async fn react(
    conn: &mut AsyncPgConnection,
    story_id: Uuid,
    user_id: Uuid,
    reaction: String,
) -> Result<StoryReaction, StoryServiceError> {
    Ok(StoryReaction::upsert(
        conn,
        NewStoryReaction {
            story_id,
            user_id,
            reaction,
        },
    )
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_24_hours() {
        let created = Utc::now();
        let expires = expiry_for(created);
        assert_eq!(expires - created, Duration::hours(24));
    }

    #[test]
    fn test_visibility_boundary() {
        let now = Utc::now();

        // Expired one second ago: excluded
        assert!(!is_visible(now, now - Duration::seconds(1)));
        // Expires one second from now: included
        assert!(is_visible(now, now + Duration::seconds(1)));
        // Exact expiry instant: excluded
        assert!(!is_visible(now, now));
    }
}
