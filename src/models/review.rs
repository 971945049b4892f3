// Review database model
// Client reviews left on a profile. Every review enters the moderation
// queue as pending; admins approve or reject, owners can flag a pending
// review they consider abusive.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::reviews;

/// Moderation state of a review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, diesel::expression::AsExpression)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Flagged => "flagged",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            "flagged" => Ok(ReviewStatus::Flagged),
            _ => Err(format!("Invalid review status: {}", s)),
        }
    }
}

impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for ReviewStatus
where
    DB: diesel::backend::Backend,
    String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Self::from_str(&value).map_err(|e| e.into())
    }
}

impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for ReviewStatus
where
    DB: diesel::backend::Backend,
    str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        self.as_str().to_sql(out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub profile_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Review not found")]
    NotFound,

    #[error("Only pending reviews can be flagged")]
    NotFlaggable,
}

fn map_not_found(e: diesel::result::Error) -> ReviewError {
    match e {
        diesel::result::Error::NotFound => ReviewError::NotFound,
        _ => ReviewError::Database(e),
    }
}

impl Review {
    pub fn status_enum(&self) -> ReviewStatus {
        ReviewStatus::from_str(&self.status).unwrap_or(ReviewStatus::Pending)
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_review: NewReview,
    ) -> Result<Self, ReviewError> {
        use crate::schema::reviews::dsl::*;

        diesel::insert_into(reviews)
            .values(&new_review)
            .get_result::<Review>(conn)
            .await
            .map_err(ReviewError::Database)
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        review_id: Uuid,
    ) -> Result<Self, ReviewError> {
        use crate::schema::reviews::dsl::*;

        reviews
            .filter(id.eq(review_id))
            .first::<Review>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Every review a profile has received, newest first (owner view)
    pub async fn list_for_profile(
        conn: &mut AsyncPgConnection,
        owner_profile_id: Uuid,
    ) -> Result<Vec<Self>, ReviewError> {
        use crate::schema::reviews::dsl::*;

        reviews
            .filter(profile_id.eq(owner_profile_id))
            .order(created_at.desc())
            .load::<Review>(conn)
            .await
            .map_err(ReviewError::Database)
    }

    /// Approved reviews only, for the public profile page
    pub async fn list_approved_for_profile(
        conn: &mut AsyncPgConnection,
        target_profile_id: Uuid,
    ) -> Result<Vec<Self>, ReviewError> {
        use crate::schema::reviews::dsl::*;

        reviews
            .filter(profile_id.eq(target_profile_id))
            .filter(status.eq(ReviewStatus::Approved.as_str()))
            .order(created_at.desc())
            .load::<Review>(conn)
            .await
            .map_err(ReviewError::Database)
    }

    /// Moderation queue: all reviews in one status, oldest first
    pub async fn list_by_status(
        conn: &mut AsyncPgConnection,
        queue_status: ReviewStatus,
    ) -> Result<Vec<Self>, ReviewError> {
        use crate::schema::reviews::dsl::*;

        reviews
            .filter(status.eq(queue_status.as_str()))
            .order(created_at.asc())
            .load::<Review>(conn)
            .await
            .map_err(ReviewError::Database)
    }

    /// Admin moderation verdict, optionally with a note shown to the owner
    pub async fn set_status(
        conn: &mut AsyncPgConnection,
        review_id: Uuid,
        new_status: ReviewStatus,
        note: Option<String>,
    ) -> Result<Self, ReviewError> {
        use crate::schema::reviews::dsl::*;

        diesel::update(reviews.filter(id.eq(review_id)))
            .set((
                status.eq(new_status.as_str()),
                admin_note.eq(note),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Review>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Owner flags a review on their own profile for moderation.
    /// Only pending reviews are flaggable; a verdict already given stands.
    pub async fn flag(
        conn: &mut AsyncPgConnection,
        review_id: Uuid,
        owner_profile_id: Uuid,
    ) -> Result<Self, ReviewError> {
        use crate::schema::reviews::dsl::*;

        let review = reviews
            .filter(id.eq(review_id))
            .filter(profile_id.eq(owner_profile_id))
            .first::<Review>(conn)
            .await
            .map_err(map_not_found)?;

        if review.status_enum() != ReviewStatus::Pending {
            return Err(ReviewError::NotFlaggable);
        }

        diesel::update(reviews.filter(id.eq(review.id)))
            .set((
                status.eq(ReviewStatus::Flagged.as_str()),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Review>(conn)
            .await
            .map_err(ReviewError::Database)
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        review_id: Uuid,
    ) -> Result<(), ReviewError> {
        use crate::schema::reviews::dsl::*;

        let deleted = diesel::delete(reviews.filter(id.eq(review_id)))
            .execute(conn)
            .await
            .map_err(ReviewError::Database)?;

        if deleted == 0 {
            return Err(ReviewError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_mapping_roundtrip() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
            ReviewStatus::Flagged,
        ] {
            assert_eq!(ReviewStatus::from_str(status.as_str()), Ok(status));
        }

        assert!(ReviewStatus::from_str("deleted").is_err());
    }

    #[test]
    fn test_unrecognized_stored_status_reads_as_pending() {
        let review = Review {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            reviewer_name: "Client".to_string(),
            rating: 4,
            comment: "Recomand".to_string(),
            status: "garbage".to_string(),
            admin_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(review.status_enum(), ReviewStatus::Pending);
    }
}
