// Services module for the vitrina backend
// Business logic layer: entitlement rules, premium lifecycle, promo
// redemption, referral rewards, listing ranking, stories, statistics.

pub mod entitlements;
pub mod jwt;
pub mod media;
pub mod premium;
pub mod promo;
pub mod ranking;
pub mod referral;
pub mod stats;
pub mod story;

pub use entitlements::Entitlements;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use media::{MediaKind, MediaPolicyError};
pub use premium::PremiumError;
pub use promo::{PromoError, Redemption};
pub use ranking::TierBand;
pub use referral::{ReferralError, RewardProgress, SignupRecorded};
pub use stats::{DailyStats, ProfileStats};
pub use story::StoryServiceError;
