// Referral counter & reward
// Each sponsored sign-up writes the edge, bumps the referrer's counter and
// evaluates the reward threshold inside one transaction, so the edge and
// the counter can never diverge.

use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::PremiumPeriod;
use crate::models::referral::{NewReferral, Referral};
use crate::services::premium::{self, PremiumError};

/// Every tenth sponsored sign-up earns one month of premium
const REWARD_THRESHOLD: i32 = 10;

const CODE_LENGTH: usize = 8;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("Referrer profile not found")]
    ReferrerNotFound,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Premium grant failed: {0}")]
    Premium(#[from] PremiumError),
}

/// Outcome of recording one sponsored sign-up
#[derive(Debug, Clone, Serialize)]
pub struct SignupRecorded {
    pub referral_count: i32,
    pub reward_granted: bool,
}

/// Progress toward the next reward, for the dashboard
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RewardProgress {
    pub referral_count: i32,
    /// Sign-ups still needed; None when a reward is currently available
    pub remaining: Option<i32>,
    pub reward_available: bool,
}

/// Generate a fresh 8-character referral token
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Whether a counter value that was just incremented crosses a reward
/// threshold (10, 20, 30, ...)
fn crosses_threshold(count_after_increment: i32) -> bool {
    count_after_increment > 0 && count_after_increment % REWARD_THRESHOLD == 0
}

/// Progress display rule: multiples of ten show "reward available" instead
/// of "10 remaining"
pub fn reward_progress(referral_count: i32) -> RewardProgress {
    if crosses_threshold(referral_count) {
        RewardProgress {
            referral_count,
            remaining: None,
            reward_available: true,
        }
    } else {
        RewardProgress {
            referral_count,
            remaining: Some(REWARD_THRESHOLD - referral_count.rem_euclid(REWARD_THRESHOLD)),
            reward_available: false,
        }
    }
}

/// Record a sponsored sign-up: edge insert, counter increment and reward
/// evaluation commit together or not at all.
pub async fn record_signup(
    conn: &mut AsyncPgConnection,
    referrer_user_id: Uuid,
    referred_user_id: Uuid,
) -> Result<SignupRecorded, ReferralError> {
    let outcome = conn
        .transaction::<_, ReferralError, _>(|tx| {
            Box::pin(async move {
                use crate::schema::profiles::dsl::*;

                Referral::create(
                    tx,
                    NewReferral {
                        referrer_user_id,
                        referred_user_id,
                    },
                )
                .await?;

                // Atomic increment returning the new count and profile id
                let (referrer_profile_id, new_count): (Uuid, i32) =
                    diesel::update(profiles.filter(user_id.eq(referrer_user_id)))
                        .set(referral_count.eq(referral_count + 1))
                        .returning((id, referral_count))
                        .get_result::<(Uuid, i32)>(tx)
                        .await
                        .map_err(|e| match e {
                            diesel::result::Error::NotFound => ReferralError::ReferrerNotFound,
                            _ => ReferralError::Database(e),
                        })?;

                let reward_granted = crosses_threshold(new_count);
                if reward_granted {
                    diesel::update(profiles.filter(id.eq(referrer_profile_id)))
                        .set(earned_premium_reward.eq(true))
                        .execute(tx)
                        .await?;

                    premium::grant(
                        tx,
                        referrer_profile_id,
                        PremiumPeriod::OneMonth,
                        chrono::Utc::now(),
                    )
                    .await?;
                }

                Ok(SignupRecorded {
                    referral_count: new_count,
                    reward_granted,
                })
            })
        })
        .await?;

    if outcome.reward_granted {
        tracing::info!(
            referrer = %referrer_user_id,
            count = outcome.referral_count,
            "Referral reward granted"
        );
    }

    Ok(outcome)
}

/// Owner acknowledgement clears the pending-reward flag; until then the
/// claim prompt re-triggers on every profile load.
pub async fn acknowledge_reward(
    conn: &mut AsyncPgConnection,
    profile_id: Uuid,
) -> Result<(), ReferralError> {
    use crate::schema::profiles::dsl::*;

    diesel::update(profiles.filter(id.eq(profile_id)))
        .set(earned_premium_reward.eq(false))
        .execute(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        // Vanishingly unlikely to collide across a handful of draws
        let other = generate_referral_code();
        assert_ne!(code, other);
    }

    #[test]
    fn test_threshold_crossings() {
        assert!(!crosses_threshold(0));
        assert!(!crosses_threshold(9));
        assert!(crosses_threshold(10));
        assert!(!crosses_threshold(11));
        assert!(!crosses_threshold(19));
        assert!(crosses_threshold(20));
    }

    #[test]
    fn test_progress_counts_down() {
        assert_eq!(
            reward_progress(0),
            RewardProgress {
                referral_count: 0,
                remaining: Some(10),
                reward_available: false
            }
        );
        assert_eq!(reward_progress(3).remaining, Some(7));
        assert_eq!(reward_progress(9).remaining, Some(1));
        assert_eq!(reward_progress(11).remaining, Some(9));
    }

    #[test]
    fn test_progress_at_multiple_of_ten() {
        let p = reward_progress(10);
        assert!(p.reward_available);
        assert_eq!(p.remaining, None);

        let p = reward_progress(20);
        assert!(p.reward_available);
    }
}
