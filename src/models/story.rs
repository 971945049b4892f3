// Story database model
// Ephemeral media posts with a fixed 24-hour lifetime. Expired rows are
// excluded at query time; a periodic cleanup can reap them independently.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{stories, story_reactions, story_views};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Story {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub media_url: String,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stories)]
pub struct NewStory {
    pub profile_id: Uuid,
    pub media_url: String,
    pub media_type: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = story_views)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryView {
    pub id: Uuid,
    pub story_id: Uuid,
    pub viewer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = story_views)]
pub struct NewStoryView {
    pub story_id: Uuid,
    pub viewer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = story_reactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryReaction {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub reaction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = story_reactions)]
pub struct NewStoryReaction {
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub reaction: String,
}

#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Story not found")]
    NotFound,
}

fn map_not_found(e: diesel::result::Error) -> StoryError {
    match e {
        diesel::result::Error::NotFound => StoryError::NotFound,
        _ => StoryError::Database(e),
    }
}

impl Story {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_story: NewStory,
    ) -> Result<Self, StoryError> {
        use crate::schema::stories::dsl::*;

        diesel::insert_into(stories)
            .values(&new_story)
            .get_result::<Story>(conn)
            .await
            .map_err(StoryError::Database)
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        story_id: Uuid,
    ) -> Result<Self, StoryError> {
        use crate::schema::stories::dsl::*;

        stories
            .filter(id.eq(story_id))
            .first::<Story>(conn)
            .await
            .map_err(map_not_found)
    }

    /// All unexpired stories, newest first
    pub async fn list_active(
        conn: &mut AsyncPgConnection,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, StoryError> {
        use crate::schema::stories::dsl::*;

        stories
            .filter(expires_at.gt(now))
            .order(created_at.desc())
            .load::<Story>(conn)
            .await
            .map_err(StoryError::Database)
    }

    pub async fn delete(conn: &mut AsyncPgConnection, story_id: Uuid) -> Result<(), StoryError> {
        use crate::schema::stories::dsl::*;

        let deleted = diesel::delete(stories.filter(id.eq(story_id)))
            .execute(conn)
            .await
            .map_err(StoryError::Database)?;

        if deleted == 0 {
            return Err(StoryError::NotFound);
        }

        Ok(())
    }
}

impl StoryView {
    /// Idempotent: a second view by the same account is a no-op
    pub async fn record(
        conn: &mut AsyncPgConnection,
        view: NewStoryView,
    ) -> Result<(), StoryError> {
        use crate::schema::story_views::dsl::*;

        diesel::insert_into(story_views)
            .values(&view)
            .on_conflict((story_id, viewer_id))
            .do_nothing()
            .execute(conn)
            .await
            .map_err(StoryError::Database)?;

        Ok(())
    }

    pub async fn count_for_story(
        conn: &mut AsyncPgConnection,
        story: Uuid,
    ) -> Result<i64, StoryError> {
        use crate::schema::story_views::dsl::*;

        story_views
            .filter(story_id.eq(story))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(StoryError::Database)
    }
}

impl StoryReaction {
    /// Upsert: a user holds at most one reaction per story,
    /// re-reacting replaces it
    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        new_reaction: NewStoryReaction,
    ) -> Result<Self, StoryError> {
        use crate::schema::story_reactions::dsl::*;

        diesel::insert_into(story_reactions)
            .values(&new_reaction)
            .on_conflict((story_id, user_id))
            .do_update()
            .set((
                reaction.eq(&new_reaction.reaction),
                created_at.eq(Utc::now()),
            ))
            .get_result::<StoryReaction>(conn)
            .await
            .map_err(StoryError::Database)
    }

    pub async fn list_for_story(
        conn: &mut AsyncPgConnection,
        story: Uuid,
    ) -> Result<Vec<Self>, StoryError> {
        use crate::schema::story_reactions::dsl::*;

        story_reactions
            .filter(story_id.eq(story))
            .load::<StoryReaction>(conn)
            .await
            .map_err(StoryError::Database)
    }
}
