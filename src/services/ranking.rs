// Listing ranking
// Partition candidates by tier, shuffle each partition independently and
// concatenate premium → verified → standard. The shuffle is seeded so that
// page 2 of a query session sees the same ordering as page 1; the seed is
// minted on the first request and echoed back to the client.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::profile::{Profile, UserType};

/// Tier band a listing candidate falls into. Exhaustive: every candidate
/// lands in exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierBand {
    Premium,
    Verified,
    Standard,
}

impl TierBand {
    pub fn for_profile(profile: &Profile) -> Self {
        Self::from_flags(profile.user_type_enum(), profile.verification_status)
    }

    pub fn from_flags(tier: UserType, verified: bool) -> Self {
        if tier == UserType::Premium {
            TierBand::Premium
        } else if verified || tier == UserType::Verified {
            TierBand::Verified
        } else {
            TierBand::Standard
        }
    }

    /// Band at a given instant. A premium profile whose window has lapsed
    /// but has not been downgraded yet must not rank in the premium band.
    pub fn effective(profile: &Profile, now: chrono::DateTime<chrono::Utc>) -> Self {
        let band = Self::for_profile(profile);
        if band != TierBand::Premium {
            return band;
        }

        match profile.premium_expires_at {
            Some(expires) if now < expires => TierBand::Premium,
            // No expiry on record counts as lapsed too
            _ => {
                if profile.verification_status {
                    TierBand::Verified
                } else {
                    TierBand::Standard
                }
            },
        }
    }

    /// The tier this band corresponds to, for deriving entitlements that
    /// agree with how the profile currently ranks
    pub fn as_user_type(self) -> UserType {
        match self {
            TierBand::Premium => UserType::Premium,
            TierBand::Verified => UserType::Verified,
            TierBand::Standard => UserType::Standard,
        }
    }
}

/// Mint a shuffle seed for a new query session
pub fn mint_seed() -> u64 {
    rand::thread_rng().gen()
}

/// Rank a candidate set: stable tier order, random order within each tier.
/// The same (input multiset, seed) pair always yields the same output.
pub fn rank_listing<T>(items: Vec<T>, band: impl Fn(&T) -> TierBand, seed: u64) -> Vec<T> {
    let mut premium = Vec::new();
    let mut verified = Vec::new();
    let mut standard = Vec::new();

    for item in items {
        match band(&item) {
            TierBand::Premium => premium.push(item),
            TierBand::Verified => verified.push(item),
            TierBand::Standard => standard.push(item),
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    premium.shuffle(&mut rng);
    verified.shuffle(&mut rng);
    standard.shuffle(&mut rng);

    let mut ranked = premium;
    ranked.append(&mut verified);
    ranked.append(&mut standard);
    ranked
}

/// Slice one page out of a ranked list. Pages are 1-based; out-of-range
/// pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Candidate {
        id: u32,
        band: TierBand,
    }

    fn candidates(premium: u32, verified: u32, standard: u32) -> Vec<Candidate> {
        let mut items = Vec::new();
        let mut next_id = 0;
        for (count, band) in [
            (premium, TierBand::Premium),
            (verified, TierBand::Verified),
            (standard, TierBand::Standard),
        ] {
            for _ in 0..count {
                items.push(Candidate { id: next_id, band });
                next_id += 1;
            }
        }
        items
    }

    #[test]
    fn test_band_assignment() {
        assert_eq!(
            TierBand::from_flags(UserType::Premium, false),
            TierBand::Premium
        );
        // Verification flag does not demote premium
        assert_eq!(
            TierBand::from_flags(UserType::Premium, true),
            TierBand::Premium
        );
        assert_eq!(
            TierBand::from_flags(UserType::Standard, true),
            TierBand::Verified
        );
        assert_eq!(
            TierBand::from_flags(UserType::Verified, false),
            TierBand::Verified
        );
        assert_eq!(
            TierBand::from_flags(UserType::Standard, false),
            TierBand::Standard
        );
    }

    #[test]
    fn test_effective_band_demotes_lapsed_premium() {
        use chrono::{Duration, Utc};

        let now = Utc::now();
        let mut profile = sample_profile(UserType::Premium, false);

        profile.premium_expires_at = Some(now + Duration::hours(1));
        assert_eq!(TierBand::effective(&profile, now), TierBand::Premium);

        profile.premium_expires_at = Some(now - Duration::hours(1));
        assert_eq!(TierBand::effective(&profile, now), TierBand::Standard);

        profile.verification_status = true;
        assert_eq!(TierBand::effective(&profile, now), TierBand::Verified);

        // Premium tier with no expiry on record is treated as lapsed
        profile.premium_expires_at = None;
        assert_eq!(TierBand::effective(&profile, now), TierBand::Verified);
    }

    fn sample_profile(tier: UserType, verified: bool) -> Profile {
        use chrono::{NaiveDate, Utc};
        use uuid::Uuid;

        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1995, 6, 1).unwrap(),
            phone: "0712345678".to_string(),
            county: "Cluj".to_string(),
            city: "Cluj-Napoca".to_string(),
            address: None,
            description: None,
            services: serde_json::json!([]),
            incall_rates: serde_json::json!({}),
            outcall_rates: serde_json::json!({}),
            user_type: tier.as_str().to_string(),
            verification_status: verified,
            verification_photo: None,
            verification_submitted_at: None,
            is_hidden: false,
            photos: serde_json::json!([]),
            video_url: None,
            premium_period: None,
            premium_started_at: None,
            premium_expires_at: None,
            referral_code: "AAAA1111".to_string(),
            referral_count: 0,
            earned_premium_reward: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_every_candidate_appears_once() {
        let input = candidates(4, 5, 6);
        let ranked = rank_listing(input.clone(), |c| c.band, 7);

        assert_eq!(ranked.len(), 15);
        let mut ids: Vec<u32> = ranked.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_tier_order_is_preserved() {
        let ranked = rank_listing(candidates(3, 4, 5), |c| c.band, 99);

        let bands: Vec<TierBand> = ranked.iter().map(|c| c.band).collect();
        assert!(bands[0..3].iter().all(|b| *b == TierBand::Premium));
        assert!(bands[3..7].iter().all(|b| *b == TierBand::Verified));
        assert!(bands[7..12].iter().all(|b| *b == TierBand::Standard));
    }

    #[test]
    fn test_same_seed_same_order() {
        let input = candidates(5, 5, 5);
        let a = rank_listing(input.clone(), |c| c.band, 1234);
        let b = rank_listing(input, |c| c.band, 1234);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_reorder_within_tier() {
        let input = candidates(20, 0, 0);
        let a = rank_listing(input.clone(), |c| c.band, 1);
        let b = rank_listing(input, |c| c.band, 2);

        // Same multiset either way
        let mut ids_a: Vec<u32> = a.iter().map(|c| c.id).collect();
        let mut ids_b: Vec<u32> = b.iter().map(|c| c.id).collect();
        ids_a.sort_unstable();
        ids_b.sort_unstable();
        assert_eq!(ids_a, ids_b);

        // 20 elements under two seeds colliding on the same permutation is
        // effectively impossible
        assert_ne!(a, b);
    }

    #[test]
    fn test_page_slice() {
        let items: Vec<u32> = (0..20).collect();

        assert_eq!(page_slice(&items, 1, 6), &items[0..6]);
        assert_eq!(page_slice(&items, 2, 6), &items[6..12]);
        assert_eq!(page_slice(&items, 4, 6), &items[18..20]);
        assert!(page_slice(&items, 5, 6).is_empty());

        assert_eq!(page_slice(&items, 1, 15), &items[0..15]);
        assert_eq!(page_slice(&items, 2, 15), &items[15..20]);

        // Page 0 is treated as page 1
        assert_eq!(page_slice(&items, 0, 6), &items[0..6]);
    }
}
