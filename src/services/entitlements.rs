// Account tier policy
// Derives feature entitlements from an account's tier and verification flag.
// Pure and total: every (tier, verified) pair maps to exactly one row.

use serde::{Deserialize, Serialize};

use crate::models::profile::UserType;

/// Photo quota and video limits per tier
const STANDARD_MAX_PHOTOS: usize = 4;
const VERIFIED_MAX_PHOTOS: usize = 8;
const PREMIUM_MAX_PHOTOS: usize = 12;
const PREMIUM_MAX_VIDEO_BYTES: u64 = 350 * 1024 * 1024;

/// Feature entitlements derived from tier and verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entitlements {
    /// Maximum number of profile photos
    pub max_photos: usize,

    /// Maximum profile video size in bytes; zero disallows video entirely
    pub max_video_bytes: u64,

    /// Whether phone/WhatsApp/Telegram buttons render on the public profile
    pub show_contact_buttons: bool,

    /// Whether the account can post stories
    pub can_post_stories: bool,

    /// Whether the account can open the statistics dashboard
    pub can_view_statistics: bool,

    /// Search ranking weight (1 = highest)
    pub search_priority: u8,
}

impl Entitlements {
    /// Entitlement row for an account. Premium ignores the verification
    /// flag; a verified standard account gets the middle row.
    pub fn for_account(tier: UserType, verified: bool) -> Self {
        match (tier, verified) {
            (UserType::Premium, _) => Self {
                max_photos: PREMIUM_MAX_PHOTOS,
                max_video_bytes: PREMIUM_MAX_VIDEO_BYTES,
                show_contact_buttons: true,
                can_post_stories: true,
                can_view_statistics: true,
                search_priority: 1,
            },
            (UserType::Verified, _) | (UserType::Standard, true) => Self {
                max_photos: VERIFIED_MAX_PHOTOS,
                max_video_bytes: 0,
                show_contact_buttons: true,
                can_post_stories: false,
                can_view_statistics: true,
                search_priority: 2,
            },
            (UserType::Standard, false) => Self {
                max_photos: STANDARD_MAX_PHOTOS,
                max_video_bytes: 0,
                show_contact_buttons: false,
                can_post_stories: false,
                can_view_statistics: false,
                search_priority: 3,
            },
        }
    }

    pub fn allows_video(&self) -> bool {
        self.max_video_bytes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_unverified_row() {
        let e = Entitlements::for_account(UserType::Standard, false);
        assert_eq!(e.max_photos, 4);
        assert_eq!(e.max_video_bytes, 0);
        assert!(!e.show_contact_buttons);
        assert!(!e.can_post_stories);
        assert!(!e.can_view_statistics);
        assert_eq!(e.search_priority, 3);
    }

    #[test]
    fn test_verified_row() {
        // The UI's "verified" state: standard tier + verification flag
        let e = Entitlements::for_account(UserType::Standard, true);
        assert_eq!(e.max_photos, 8);
        assert_eq!(e.max_video_bytes, 0);
        assert!(e.show_contact_buttons);
        assert!(!e.can_post_stories);
        assert!(e.can_view_statistics);
        assert_eq!(e.search_priority, 2);

        // The explicit verified tier maps to the same row
        assert_eq!(e, Entitlements::for_account(UserType::Verified, true));
        assert_eq!(e, Entitlements::for_account(UserType::Verified, false));
    }

    #[test]
    fn test_premium_ignores_verification_flag() {
        let verified = Entitlements::for_account(UserType::Premium, true);
        let unverified = Entitlements::for_account(UserType::Premium, false);
        assert_eq!(verified, unverified);

        assert_eq!(verified.max_photos, 12);
        assert_eq!(verified.max_video_bytes, 350 * 1024 * 1024);
        assert!(verified.show_contact_buttons);
        assert!(verified.can_post_stories);
        assert!(verified.can_view_statistics);
        assert_eq!(verified.search_priority, 1);
    }

    #[test]
    fn test_total_over_all_pairs() {
        // Every combination yields a row without panicking
        for tier in [UserType::Standard, UserType::Verified, UserType::Premium] {
            for verified in [false, true] {
                let e = Entitlements::for_account(tier, verified);
                assert!(e.max_photos >= 4);
                assert!((1..=3).contains(&e.search_priority));
            }
        }
    }
}
