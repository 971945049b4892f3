// Promo code database model
// Codes are uppercase-normalized on creation and on lookup. The redemption
// path locks the row inside a transaction; see services::promo.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::promo_codes;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = promo_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromoCode {
    pub id: Uuid,
    pub code: String,
    pub premium_period: String,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = promo_codes)]
pub struct NewPromoCode {
    pub code: String,
    pub premium_period: String,
    pub max_uses: Option<i32>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
}

#[derive(thiserror::Error, Debug)]
pub enum PromoCodeError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Promo code not found")]
    NotFound,

    #[error("Promo code already exists")]
    DuplicateCode,
}

impl PromoCode {
    /// Lock the code row for the duration of the surrounding transaction.
    /// Serializes concurrent redeemers of the same code.
    pub async fn find_by_code_for_update(
        conn: &mut AsyncPgConnection,
        code_str: &str,
    ) -> Result<Self, PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        promo_codes
            .filter(code.eq(code_str))
            .for_update()
            .first::<PromoCode>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PromoCodeError::NotFound,
                _ => PromoCodeError::Database(e),
            })
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_code: NewPromoCode,
    ) -> Result<Self, PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        diesel::insert_into(promo_codes)
            .values(&new_code)
            .get_result::<PromoCode>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => PromoCodeError::DuplicateCode,
                _ => PromoCodeError::Database(e),
            })
    }

    pub async fn list_all(conn: &mut AsyncPgConnection) -> Result<Vec<Self>, PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        promo_codes
            .order(created_at.desc())
            .load::<PromoCode>(conn)
            .await
            .map_err(PromoCodeError::Database)
    }

    /// Deactivation is terminal; there is no reactivation path
    pub async fn deactivate(
        conn: &mut AsyncPgConnection,
        code_id: Uuid,
    ) -> Result<Self, PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        diesel::update(promo_codes.filter(id.eq(code_id)))
            .set(is_active.eq(false))
            .get_result::<PromoCode>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => PromoCodeError::NotFound,
                _ => PromoCodeError::Database(e),
            })
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        code_id: Uuid,
    ) -> Result<(), PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        let deleted = diesel::delete(promo_codes.filter(id.eq(code_id)))
            .execute(conn)
            .await
            .map_err(PromoCodeError::Database)?;

        if deleted == 0 {
            return Err(PromoCodeError::NotFound);
        }

        Ok(())
    }

    /// Increment usage inside the redemption transaction
    pub async fn increment_uses(
        conn: &mut AsyncPgConnection,
        code_id: Uuid,
    ) -> Result<(), PromoCodeError> {
        use crate::schema::promo_codes::dsl::*;

        diesel::update(promo_codes.filter(id.eq(code_id)))
            .set(current_uses.eq(current_uses + 1))
            .execute(conn)
            .await
            .map_err(PromoCodeError::Database)?;

        Ok(())
    }
}
