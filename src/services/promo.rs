// Promo code redemption
// The whole redeem path is one database transaction: the code row is locked
// with SELECT ... FOR UPDATE, preconditions are checked in order, and the
// usage increment plus premium grant commit together. Two concurrent
// redeemers of a code with one use left cannot both succeed.

use chrono::{DateTime, Utc};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::PremiumPeriod;
use crate::models::promo_code::{NewPromoCode, PromoCode, PromoCodeError};
use crate::services::premium::{self, PremiumError};
use std::str::FromStr;

#[derive(Debug, Error)]
pub enum PromoError {
    #[error("Promo code not found")]
    NotFound,

    #[error("Promo code is no longer active")]
    Inactive,

    #[error("Promo code has expired")]
    Expired,

    #[error("Promo code has reached its usage limit")]
    Exhausted,

    #[error("Promo code carries an invalid premium period: {0}")]
    InvalidPeriod(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Premium activation failed: {0}")]
    Premium(#[from] PremiumError),
}

impl From<PromoCodeError> for PromoError {
    fn from(e: PromoCodeError) -> Self {
        match e {
            PromoCodeError::NotFound => PromoError::NotFound,
            PromoCodeError::DuplicateCode => PromoError::Inactive,
            PromoCodeError::Database(e) => PromoError::Database(e),
        }
    }
}

/// Successful redemption result, returned for display
#[derive(Debug, Clone, Serialize)]
pub struct Redemption {
    pub period: PremiumPeriod,
    pub expires_at: DateTime<Utc>,
}

/// Codes are stored uppercase; lookups normalize the same way so that
/// "premium2025" and "PREMIUM2025" refer to the same code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Precondition checks in contract order: active flag, expiry, usage cap.
/// Pure over the locked row; mutates nothing.
fn check_redeemable(code: &PromoCode, now: DateTime<Utc>) -> Result<(), PromoError> {
    if !code.is_active {
        return Err(PromoError::Inactive);
    }

    if let Some(expires_at) = code.expires_at {
        if now >= expires_at {
            return Err(PromoError::Expired);
        }
    }

    if let Some(max_uses) = code.max_uses {
        if code.current_uses >= max_uses {
            return Err(PromoError::Exhausted);
        }
    }

    Ok(())
}

/// Redeem a code for a profile. Atomic: on any failure nothing is written.
pub async fn redeem(
    conn: &mut AsyncPgConnection,
    raw_code: &str,
    profile_id: Uuid,
) -> Result<Redemption, PromoError> {
    let code_str = normalize_code(raw_code);
    let now = Utc::now();

    let redemption = conn
        .transaction::<_, PromoError, _>(|tx| {
            Box::pin(async move {
                let code = PromoCode::find_by_code_for_update(tx, &code_str).await?;

                check_redeemable(&code, now)?;

                let period = PremiumPeriod::from_str(&code.premium_period)
                    .map_err(|_| PromoError::InvalidPeriod(code.premium_period.clone()))?;

                PromoCode::increment_uses(tx, code.id).await?;
                let expires_at = premium::grant(tx, profile_id, period, now).await?;

                Ok(Redemption { period, expires_at })
            })
        })
        .await?;

    tracing::info!(
        profile_id = %profile_id,
        period = redemption.period.as_str(),
        "Promo code redeemed"
    );

    Ok(redemption)
}

/// Create a new promo code (admin), uppercase-normalized
pub async fn create_code(
    conn: &mut AsyncPgConnection,
    raw_code: &str,
    period: PremiumPeriod,
    max_uses: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    created_by: Uuid,
) -> Result<PromoCode, PromoCodeError> {
    PromoCode::create(
        conn,
        NewPromoCode {
            code: normalize_code(raw_code),
            premium_period: period.as_str().to_string(),
            max_uses,
            is_active: true,
            expires_at,
            created_by,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_code(
        max_uses: Option<i32>,
        current_uses: i32,
        is_active: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> PromoCode {
        PromoCode {
            id: Uuid::new_v4(),
            code: "PREMIUM2025".to_string(),
            premium_period: "1_month".to_string(),
            max_uses,
            current_uses,
            is_active,
            expires_at,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("premium2025"), "PREMIUM2025");
        assert_eq!(normalize_code("  Premium2025  "), "PREMIUM2025");
    }

    #[test]
    fn test_redeemable_active_code() {
        let code = sample_code(Some(5), 0, true, None);
        assert!(check_redeemable(&code, Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_code_rejected() {
        let code = sample_code(Some(5), 0, false, None);
        assert!(matches!(
            check_redeemable(&code, Utc::now()),
            Err(PromoError::Inactive)
        ));
    }

    #[test]
    fn test_expired_code_rejected() {
        let now = Utc::now();
        let code = sample_code(None, 0, true, Some(now - Duration::seconds(1)));
        assert!(matches!(
            check_redeemable(&code, now),
            Err(PromoError::Expired)
        ));

        // Future expiry still redeemable
        let code = sample_code(None, 0, true, Some(now + Duration::seconds(1)));
        assert!(check_redeemable(&code, now).is_ok());
    }

    #[test]
    fn test_exhausted_code_rejected() {
        let code = sample_code(Some(5), 5, true, None);
        assert!(matches!(
            check_redeemable(&code, Utc::now()),
            Err(PromoError::Exhausted)
        ));

        // Unlimited codes never exhaust
        let code = sample_code(None, 1_000_000, true, None);
        assert!(check_redeemable(&code, Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_takes_precedence_over_expired() {
        // Precondition order: active flag is checked before expiry
        let now = Utc::now();
        let code = sample_code(Some(1), 1, false, Some(now - Duration::days(1)));
        assert!(matches!(
            check_redeemable(&code, now),
            Err(PromoError::Inactive)
        ));
    }
}
