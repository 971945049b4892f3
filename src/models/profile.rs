// Profile database model
// One-to-one with users, created lazily on first profile save. Carries the
// tier, verification, media, premium and referral state that the
// entitlement rules derive from.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::profiles;

/// Account tier enumeration: the coarse entitlement level of a profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, diesel::expression::AsExpression)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Standard,
    Verified,
    Premium,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Standard => "standard",
            UserType::Verified => "verified",
            UserType::Premium => "premium",
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(UserType::Standard),
            "verified" => Ok(UserType::Verified),
            "premium" => Ok(UserType::Premium),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for UserType
where
    DB: diesel::backend::Backend,
    String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Self::from_str(&value).map_err(|e| e.into())
    }
}

impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for UserType
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

/// Premium subscription period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PremiumPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl PremiumPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumPeriod::OneMonth => "1_month",
            PremiumPeriod::ThreeMonths => "3_months",
            PremiumPeriod::SixMonths => "6_months",
            PremiumPeriod::TwelveMonths => "12_months",
        }
    }

    /// Calendar months granted by this period
    pub fn months(&self) -> u32 {
        match self {
            PremiumPeriod::OneMonth => 1,
            PremiumPeriod::ThreeMonths => 3,
            PremiumPeriod::SixMonths => 6,
            PremiumPeriod::TwelveMonths => 12,
        }
    }
}

impl FromStr for PremiumPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1_month" => Ok(PremiumPeriod::OneMonth),
            "3_months" => Ok(PremiumPeriod::ThreeMonths),
            "6_months" => Ok(PremiumPeriod::SixMonths),
            "12_months" => Ok(PremiumPeriod::TwelveMonths),
            _ => Err(format!("Invalid premium period: {}", s)),
        }
    }
}

/// Profile database model - queryable from database
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub county: String,
    pub city: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub services: serde_json::Value,
    pub incall_rates: serde_json::Value,
    pub outcall_rates: serde_json::Value,
    pub user_type: String,
    pub verification_status: bool,
    pub verification_photo: Option<String>,
    pub verification_submitted_at: Option<DateTime<Utc>>,
    pub is_hidden: bool,
    pub photos: serde_json::Value,
    pub video_url: Option<String>,
    pub premium_period: Option<String>,
    pub premium_started_at: Option<DateTime<Utc>>,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub referral_code: String,
    pub referral_count: i32,
    pub earned_premium_reward: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New profile for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub county: String,
    pub city: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub services: serde_json::Value,
    pub incall_rates: serde_json::Value,
    pub outcall_rates: serde_json::Value,
    pub referral_code: String,
}

/// Profile update struct for the owner-editable fields
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub address: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub services: Option<serde_json::Value>,
    pub incall_rates: Option<serde_json::Value>,
    pub outcall_rates: Option<serde_json::Value>,
    pub is_hidden: Option<bool>,
    pub photos: Option<serde_json::Value>,
    pub video_url: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Errors for profile operations
#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Profile not found")]
    NotFound,
}

fn map_not_found(e: diesel::result::Error) -> ProfileError {
    match e {
        diesel::result::Error::NotFound => ProfileError::NotFound,
        _ => ProfileError::Database(e),
    }
}

impl Profile {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        profiles
            .filter(id.eq(profile_id))
            .first::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        owner_id: Uuid,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        profiles
            .filter(user_id.eq(owner_id))
            .first::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Look up the owner of a referral code (used at sign-up)
    pub async fn find_by_referral_code(
        conn: &mut AsyncPgConnection,
        code: &str,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        profiles
            .filter(referral_code.eq(code))
            .first::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_profile: NewProfile,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        diesel::insert_into(profiles)
            .values(&new_profile)
            .get_result::<Profile>(conn)
            .await
            .map_err(ProfileError::Database)
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
        mut changes: ProfileUpdate,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        changes.updated_at = Some(Utc::now());

        diesel::update(profiles.filter(id.eq(profile_id)))
            .set(&changes)
            .get_result::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
    ) -> Result<(), ProfileError> {
        use crate::schema::profiles::dsl::*;

        let deleted = diesel::delete(profiles.filter(id.eq(profile_id)))
            .execute(conn)
            .await
            .map_err(ProfileError::Database)?;

        if deleted == 0 {
            return Err(ProfileError::NotFound);
        }

        Ok(())
    }

    /// Fetch the visible listing candidates, optionally scoped by county
    /// and by tier filter ("premium" or "verified")
    pub async fn listing_candidates(
        conn: &mut AsyncPgConnection,
        county_filter: Option<&str>,
        type_filter: Option<&str>,
    ) -> Result<Vec<Self>, ProfileError> {
        use crate::schema::profiles::dsl::*;

        let mut query = profiles.filter(is_hidden.eq(false)).into_boxed();

        if let Some(c) = county_filter {
            query = query.filter(county.eq(c.to_string()));
        }

        match type_filter {
            Some("premium") => {
                query = query.filter(user_type.eq("premium"));
            },
            Some("verified") => {
                query = query.filter(verification_status.eq(true));
            },
            _ => {},
        }

        query
            .load::<Profile>(conn)
            .await
            .map_err(ProfileError::Database)
    }

    /// Store a submitted verification photo and stamp the submission time
    pub async fn submit_verification(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
        photo_url: &str,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        diesel::update(profiles.filter(id.eq(profile_id)))
            .set((
                verification_photo.eq(Some(photo_url)),
                verification_submitted_at.eq(Some(Utc::now())),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Admin approval: the verification flag is set and a standard account
    /// moves up to the verified tier. Premium accounts keep their tier.
    pub async fn approve_verification(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        let profile = Self::find_by_id(conn, profile_id).await?;
        let new_tier = match profile.user_type_enum() {
            UserType::Standard => UserType::Verified,
            other => other,
        };

        diesel::update(profiles.filter(id.eq(profile_id)))
            .set((
                verification_status.eq(true),
                user_type.eq(new_tier.as_str()),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Admin rejection clears the pending submission so the owner can retry
    pub async fn reject_verification(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        diesel::update(profiles.filter(id.eq(profile_id)))
            .set((
                verification_photo.eq(None::<String>),
                verification_submitted_at.eq(None::<DateTime<Utc>>),
                updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Moderation toggle for listing visibility
    pub async fn set_hidden(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
        hidden: bool,
    ) -> Result<Self, ProfileError> {
        use crate::schema::profiles::dsl::*;

        diesel::update(profiles.filter(id.eq(profile_id)))
            .set((is_hidden.eq(hidden), updated_at.eq(Utc::now())))
            .get_result::<Profile>(conn)
            .await
            .map_err(map_not_found)
    }

    /// Profiles with a submitted verification photo awaiting admin review
    pub async fn pending_verifications(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, ProfileError> {
        use crate::schema::profiles::dsl::*;

        profiles
            .filter(verification_photo.is_not_null())
            .filter(verification_status.eq(false))
            .order(verification_submitted_at.asc())
            .load::<Profile>(conn)
            .await
            .map_err(ProfileError::Database)
    }

    /// Parsed account tier, defaulting to standard for unknown stored values
    pub fn user_type_enum(&self) -> UserType {
        UserType::from_str(&self.user_type).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid user type '{}' for profile {}, defaulting to standard: {}",
                self.user_type,
                self.id,
                e
            );
            UserType::Standard
        })
    }

    /// Parsed premium period, if any
    pub fn premium_period_enum(&self) -> Option<PremiumPeriod> {
        self.premium_period
            .as_deref()
            .and_then(|p| PremiumPeriod::from_str(p).ok())
    }

    /// Ordered photo URL list decoded from the jsonb column
    pub fn photo_urls(&self) -> Vec<String> {
        serde_json::from_value(self.photos.clone()).unwrap_or_default()
    }

    /// Selected service tags decoded from the jsonb column
    pub fn service_tags(&self) -> Vec<String> {
        serde_json::from_value(self.services.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_conversion() {
        assert_eq!(UserType::Standard.as_str(), "standard");
        assert_eq!(UserType::Verified.as_str(), "verified");
        assert_eq!(UserType::Premium.as_str(), "premium");

        assert_eq!(UserType::from_str("premium"), Ok(UserType::Premium));
        assert!(UserType::from_str("gold").is_err());
    }

    #[test]
    fn test_premium_period_conversion() {
        assert_eq!(PremiumPeriod::OneMonth.as_str(), "1_month");
        assert_eq!(PremiumPeriod::from_str("3_months"), Ok(PremiumPeriod::ThreeMonths));
        assert_eq!(PremiumPeriod::from_str("12_months"), Ok(PremiumPeriod::TwelveMonths));
        assert!(PremiumPeriod::from_str("2_weeks").is_err());

        assert_eq!(PremiumPeriod::OneMonth.months(), 1);
        assert_eq!(PremiumPeriod::ThreeMonths.months(), 3);
        assert_eq!(PremiumPeriod::SixMonths.months(), 6);
        assert_eq!(PremiumPeriod::TwelveMonths.months(), 12);
    }
}
