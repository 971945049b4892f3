// Premium lifecycle
// Calendar-month window arithmetic plus the single-UPDATE activation and
// deactivation writes. Partial writes (tier without expiry) are never
// possible because all premium fields change in one statement.

use chrono::{DateTime, Months, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::{PremiumPeriod, Profile, UserType};

#[derive(Debug, Error)]
pub enum PremiumError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Premium window overflows the calendar")]
    WindowOverflow,
}

/// Compute the expiry for a period starting at `started_at`.
/// Calendar-month arithmetic with end-of-month clamping:
/// 2024-01-31 + 1 month = 2024-02-29.
pub fn expiry_for(period: PremiumPeriod, started_at: DateTime<Utc>) -> Result<DateTime<Utc>, PremiumError> {
    started_at
        .checked_add_months(Months::new(period.months()))
        .ok_or(PremiumError::WindowOverflow)
}

/// Whether a premium window is still active at `now`
pub fn is_active(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> bool {
    now < expires_at
}

/// Activate premium for a profile: tier, period, start and expiry are
/// written in one UPDATE. Returns the computed expiry.
pub async fn activate(
    conn: &mut AsyncPgConnection,
    profile_id: Uuid,
    period: PremiumPeriod,
    started_at: DateTime<Utc>,
) -> Result<DateTime<Utc>, PremiumError> {
    use crate::schema::profiles::dsl::*;

    let expires = expiry_for(period, started_at)?;

    diesel::update(profiles.filter(id.eq(profile_id)))
        .set((
            user_type.eq(UserType::Premium.as_str()),
            premium_period.eq(Some(period.as_str())),
            premium_started_at.eq(Some(started_at)),
            premium_expires_at.eq(Some(expires)),
            updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await?;

    tracing::info!(
        profile_id = %profile_id,
        period = period.as_str(),
        expires_at = %expires,
        "Premium activated"
    );

    Ok(expires)
}

/// Base instant for a new premium grant. A profile inside an active window
/// keeps what it already has: the granted period starts where the current
/// window ends, so a reward can never shorten a paid subscription.
pub fn grant_base(
    now: DateTime<Utc>,
    currently_premium: bool,
    current_expiry: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    match current_expiry {
        Some(expires) if currently_premium && is_active(now, expires) => expires,
        _ => now,
    }
}

/// Grant a period on top of whatever window the profile already holds.
/// Promo redemptions and referral rewards go through here so stacking
/// extends rather than overwrites.
pub async fn grant(
    conn: &mut AsyncPgConnection,
    profile_id: Uuid,
    period: PremiumPeriod,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, PremiumError> {
    use crate::schema::profiles::dsl::*;

    let (tier, expires): (String, Option<DateTime<Utc>>) = profiles
        .filter(id.eq(profile_id))
        .select((user_type, premium_expires_at))
        .first(conn)
        .await?;

    let base = grant_base(now, tier == UserType::Premium.as_str(), expires);
    activate(conn, profile_id, period, base).await
}

/// Lazy downgrade on read: a premium profile whose window has lapsed is
/// deactivated and reloaded. Anything else passes through untouched.
pub async fn refresh_if_lapsed(
    conn: &mut AsyncPgConnection,
    profile: Profile,
) -> Result<Profile, PremiumError> {
    if profile.user_type_enum() != UserType::Premium {
        return Ok(profile);
    }

    match profile.premium_expires_at {
        Some(expires) if !is_active(Utc::now(), expires) => {
            deactivate(conn, &profile).await?;
            use crate::schema::profiles::dsl::*;
            profiles
                .filter(id.eq(profile.id))
                .first::<Profile>(conn)
                .await
                .map_err(PremiumError::Database)
        },
        _ => Ok(profile),
    }
}

/// Clear the premium window and reset the tier. Verified accounts fall back
/// to their verification level, everyone else to standard.
pub async fn deactivate(
    conn: &mut AsyncPgConnection,
    profile: &Profile,
) -> Result<(), PremiumError> {
    use crate::schema::profiles::dsl::*;

    let fallback_tier = if profile.verification_status {
        UserType::Verified
    } else {
        UserType::Standard
    };

    diesel::update(profiles.filter(id.eq(profile.id)))
        .set((
            user_type.eq(fallback_tier.as_str()),
            premium_period.eq(None::<String>),
            premium_started_at.eq(None::<DateTime<Utc>>),
            premium_expires_at.eq(None::<DateTime<Utc>>),
            updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await?;

    tracing::info!(profile_id = %profile.id, tier = fallback_tier.as_str(), "Premium deactivated");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_simple_month_add() {
        let start = utc(2024, 3, 15);
        assert_eq!(
            expiry_for(PremiumPeriod::OneMonth, start).unwrap(),
            utc(2024, 4, 15)
        );
        assert_eq!(
            expiry_for(PremiumPeriod::ThreeMonths, start).unwrap(),
            utc(2024, 6, 15)
        );
        assert_eq!(
            expiry_for(PremiumPeriod::TwelveMonths, start).unwrap(),
            utc(2025, 3, 15)
        );
    }

    #[test]
    fn test_expiry_clamps_at_month_end() {
        // Jan 31 + 1 month lands on Feb 29 in a leap year
        let start = utc(2024, 1, 31);
        assert_eq!(
            expiry_for(PremiumPeriod::OneMonth, start).unwrap(),
            utc(2024, 2, 29)
        );

        // and Feb 28 in a common year
        let start = utc(2025, 1, 31);
        assert_eq!(
            expiry_for(PremiumPeriod::OneMonth, start).unwrap(),
            utc(2025, 2, 28)
        );
    }

    #[test]
    fn test_expiry_six_months_across_year_end() {
        let start = utc(2024, 8, 31);
        // Aug 31 + 6 months clamps to Feb 28 (2025 is not a leap year)
        assert_eq!(
            expiry_for(PremiumPeriod::SixMonths, start).unwrap(),
            utc(2025, 2, 28)
        );
    }

    #[test]
    fn test_grant_base_extends_active_window() {
        let now = utc(2024, 6, 1);
        let expires = utc(2025, 5, 1);

        // A 12-month subscriber claiming a reward stacks onto the tail end
        assert_eq!(grant_base(now, true, Some(expires)), expires);

        // Lapsed or absent windows start fresh from now
        assert_eq!(grant_base(now, true, Some(utc(2024, 5, 1))), now);
        assert_eq!(grant_base(now, true, None), now);
        assert_eq!(grant_base(now, false, Some(expires)), now);
    }

    #[test]
    fn test_grant_on_active_window_never_shortens() {
        let now = utc(2024, 6, 1);
        let expires = utc(2025, 5, 1);

        let base = grant_base(now, true, Some(expires));
        let stacked = expiry_for(PremiumPeriod::OneMonth, base).unwrap();
        assert_eq!(stacked, utc(2025, 6, 1));
        assert!(stacked > expires);
    }

    #[test]
    fn test_is_active_boundary() {
        let expires = utc(2024, 6, 1);
        assert!(is_active(expires - chrono::Duration::seconds(1), expires));
        // Expiry instant itself is no longer active
        assert!(!is_active(expires, expires));
        assert!(!is_active(expires + chrono::Duration::seconds(1), expires));
    }
}
