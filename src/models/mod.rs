pub mod auth;
pub mod login_history;
pub mod profile;
pub mod profile_stat;
pub mod promo_code;
pub mod referral;
pub mod review;
pub mod story;
pub mod user;

pub use auth::AccessTokenClaims;
pub use login_history::{LoginHistoryEntry, NewLoginHistoryEntry};
pub use profile::{NewProfile, PremiumPeriod, Profile, ProfileError, ProfileUpdate, UserType};
pub use profile_stat::{NewProfileStatEvent, ProfileStatEvent, StatEventType};
pub use promo_code::{NewPromoCode, PromoCode, PromoCodeError};
pub use referral::{NewReferral, Referral};
pub use review::{NewReview, Review, ReviewError, ReviewStatus};
pub use story::{
    NewStory, NewStoryReaction, NewStoryView, Story, StoryError, StoryReaction, StoryView,
};
pub use user::{NewUser, User, UserError};
