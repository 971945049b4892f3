// Referral edge model
// One immutable row per sponsored sign-up, written in the same transaction
// as the referrer's counter increment (services::referral).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::referrals;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = referrals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Referral {
    pub id: Uuid,
    pub referrer_user_id: Uuid,
    pub referred_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = referrals)]
pub struct NewReferral {
    pub referrer_user_id: Uuid,
    pub referred_user_id: Uuid,
}

impl Referral {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_referral: NewReferral,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::referrals::dsl::*;

        diesel::insert_into(referrals)
            .values(&new_referral)
            .get_result::<Referral>(conn)
            .await
    }

    /// All sign-ups sponsored by a user, newest first
    pub async fn list_for_referrer(
        conn: &mut AsyncPgConnection,
        referrer: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::referrals::dsl::*;

        referrals
            .filter(referrer_user_id.eq(referrer))
            .order(created_at.desc())
            .load::<Referral>(conn)
            .await
    }
}
