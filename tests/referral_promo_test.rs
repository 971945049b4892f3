// Referral reward counter rules and promo code normalization

use vitrina_backend::services::{promo, referral};

#[test]
fn referral_codes_are_eight_uppercase_alphanumerics() {
    for _ in 0..50 {
        let code = referral::generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}

#[test]
fn reward_fires_on_every_tenth_signup() {
    for count in [10, 20, 30, 100] {
        let progress = referral::reward_progress(count);
        assert!(progress.reward_available, "count {}", count);
        assert_eq!(progress.remaining, None);
    }

    for count in [0, 1, 9, 11, 19, 99] {
        let progress = referral::reward_progress(count);
        assert!(!progress.reward_available, "count {}", count);
    }
}

#[test]
fn remaining_counts_down_toward_next_reward() {
    assert_eq!(referral::reward_progress(0).remaining, Some(10));
    assert_eq!(referral::reward_progress(4).remaining, Some(6));
    assert_eq!(referral::reward_progress(9).remaining, Some(1));
    // After a reward the countdown restarts
    assert_eq!(referral::reward_progress(11).remaining, Some(9));
    assert_eq!(referral::reward_progress(19).remaining, Some(1));
}

#[test]
fn promo_lookup_is_case_insensitive() {
    assert_eq!(promo::normalize_code("summer2025"), "SUMMER2025");
    assert_eq!(promo::normalize_code("Summer2025"), "SUMMER2025");
    assert_eq!(promo::normalize_code("  SUMMER2025\n"), "SUMMER2025");
}
