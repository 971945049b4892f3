// Database-backed tests. They need a reachable PostgreSQL instance; when
// DATABASE_URL is not set (or the server is down) every test skips instead
// of failing, so the pure-logic suites stay runnable anywhere.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use tokio::sync::Barrier;
use uuid::Uuid;

use vitrina_backend::db::{create_diesel_pool, DieselDatabaseConfig, DieselPool, MIGRATIONS};
use vitrina_backend::handlers::auth::attribute_referral;
use vitrina_backend::models::profile::{NewProfile, PremiumPeriod, Profile};
use vitrina_backend::models::story::{NewStory, Story};
use vitrina_backend::models::user::{NewUser, User};
use vitrina_backend::services::{premium, promo, referral};
use vitrina_backend::PromoError;

async fn test_pool() -> Option<DieselPool> {
    dotenv::from_filename(".env.test").ok();
    dotenv::dotenv().ok();

    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        },
    };

    let migration_url = url.clone();
    let migrated = tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&migration_url).ok()?;
        conn.run_pending_migrations(MIGRATIONS).ok()?;
        Some(())
    })
    .await
    .ok()
    .flatten();

    if migrated.is_none() {
        eprintln!("Could not reach PostgreSQL, skipping database test");
        return None;
    }

    let config = DieselDatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(60),
        max_lifetime: Duration::from_secs(300),
        test_on_checkout: true,
    };

    create_diesel_pool(config).await.ok()
}

async fn seed_account(
    conn: &mut diesel_async::AsyncPgConnection,
    label: &str,
) -> (User, Profile) {
    let user = User::create(
        conn,
        NewUser {
            email: format!("{}-{}@test.local", label, Uuid::new_v4().simple()),
            password_hash: "not-a-real-hash".to_string(),
            is_admin: false,
        },
    )
    .await
    .expect("seed user");

    let profile = Profile::create(
        conn,
        NewProfile {
            user_id: user.id,
            name: label.to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1995, 6, 1).unwrap(),
            phone: "0712345678".to_string(),
            county: "Cluj".to_string(),
            city: "Cluj-Napoca".to_string(),
            address: None,
            description: None,
            services: serde_json::json!([]),
            incall_rates: serde_json::json!({}),
            outcall_rates: serde_json::json!({}),
            referral_code: referral::generate_referral_code(),
        },
    )
    .await
    .expect("seed profile");

    (user, profile)
}

async fn seed_admin(conn: &mut diesel_async::AsyncPgConnection) -> User {
    User::create(
        conn,
        NewUser {
            email: format!("admin-{}@test.local", Uuid::new_v4().simple()),
            password_hash: "not-a-real-hash".to_string(),
            is_admin: true,
        },
    )
    .await
    .expect("seed admin")
}

fn unique_code(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_single_use_code_survives_concurrent_redeemers() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let admin = seed_admin(&mut conn).await;
    let (_, first) = seed_account(&mut conn, "racer-one").await;
    let (_, second) = seed_account(&mut conn, "racer-two").await;

    let raw_code = unique_code("RACE");
    promo::create_code(
        &mut conn,
        &raw_code,
        PremiumPeriod::OneMonth,
        Some(1),
        None,
        admin.id,
    )
    .await
    .expect("create code");
    drop(conn);

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();

    for profile_id in [first.id, second.id] {
        let pool = pool.clone();
        let raw_code = raw_code.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            let mut conn = pool.get().await.expect("conn");
            barrier.wait().await;
            promo::redeem(&mut conn, &raw_code, profile_id).await
        }));
    }

    let mut successes = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) => successes += 1,
            Err(PromoError::Exhausted) => exhausted += 1,
            Err(e) => panic!("unexpected redemption error: {:?}", e),
        }
    }

    assert_eq!(successes, 1, "exactly one redeemer may win the last use");
    assert_eq!(exhausted, 1);

    // The counter must agree with the single success
    let mut conn = pool.get().await.expect("conn");
    let uses: i32 = {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use vitrina_backend::schema::promo_codes::dsl::*;

        promo_codes
            .filter(code.eq(promo::normalize_code(&raw_code)))
            .select(current_uses)
            .first(&mut conn)
            .await
            .expect("code row")
    };
    assert_eq!(uses, 1);
}

#[tokio::test]
async fn test_code_with_five_uses_rejects_the_sixth_attempt() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let admin = seed_admin(&mut conn).await;
    let (_, profile) = seed_account(&mut conn, "redeemer").await;

    let code = unique_code("PREMIUM");
    promo::create_code(
        &mut conn,
        &code,
        PremiumPeriod::ThreeMonths,
        Some(5),
        None,
        admin.id,
    )
    .await
    .expect("create code");

    for _ in 0..5 {
        promo::redeem(&mut conn, &code, profile.id)
            .await
            .expect("redemption within the cap");
    }

    let sixth = promo::redeem(&mut conn, &code, profile.id).await;
    assert!(matches!(sixth, Err(PromoError::Exhausted)));
}

#[tokio::test]
async fn test_story_rows_accept_full_mime_types() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let (_, profile) = seed_account(&mut conn, "storyteller").await;

    // Longer than the short image/video types; the column must hold it
    let story = Story::create(
        &mut conn,
        NewStory {
            profile_id: profile.id,
            media_url: "/media/stories/t/clip.svg".to_string(),
            media_type: "image/svg+xml".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(24),
        },
    )
    .await
    .expect("story insert");

    assert_eq!(story.media_type, "image/svg+xml");
}

#[tokio::test]
async fn test_referral_attribution_never_fails_registration() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let (referrer_user, referrer_profile) = seed_account(&mut conn, "referrer").await;
    let (joiner, _) = seed_account(&mut conn, "joiner").await;

    // Unknown code: swallowed, nothing recorded
    attribute_referral(&mut conn, "NOSUCHCODE", joiner.id).await;
    let untouched = Profile::find_by_id(&mut conn, referrer_profile.id)
        .await
        .expect("profile");
    assert_eq!(untouched.referral_count, 0);

    // Valid code, case-insensitive: the counter moves
    attribute_referral(
        &mut conn,
        &referrer_profile.referral_code.to_lowercase(),
        joiner.id,
    )
    .await;
    let credited = Profile::find_by_id(&mut conn, referrer_profile.id)
        .await
        .expect("profile");
    assert_eq!(credited.referral_count, 1);

    // Self-referral is silently ignored
    attribute_referral(&mut conn, &referrer_profile.referral_code, referrer_user.id).await;
    let unchanged = Profile::find_by_id(&mut conn, referrer_profile.id)
        .await
        .expect("profile");
    assert_eq!(unchanged.referral_count, 1);
}

#[tokio::test]
async fn test_stacked_grant_extends_the_active_window() {
    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let (_, profile) = seed_account(&mut conn, "subscriber").await;

    let now = Utc::now();
    let first_expiry = premium::activate(&mut conn, profile.id, PremiumPeriod::TwelveMonths, now)
        .await
        .expect("activate");

    let stacked_expiry = premium::grant(&mut conn, profile.id, PremiumPeriod::OneMonth, now)
        .await
        .expect("grant");

    assert!(
        stacked_expiry > first_expiry,
        "a reward on top of an active subscription must extend it"
    );
}

#[tokio::test]
async fn test_review_moderation_lifecycle() {
    use vitrina_backend::models::review::{NewReview, Review, ReviewError, ReviewStatus};

    let Some(pool) = test_pool().await else { return };

    let mut conn = pool.get().await.expect("conn");
    let (_, profile) = seed_account(&mut conn, "reviewed").await;

    let review = Review::create(
        &mut conn,
        NewReview {
            profile_id: profile.id,
            reviewer_name: "Client".to_string(),
            rating: 5,
            comment: "Recomand cu incredere".to_string(),
        },
    )
    .await
    .expect("create review");
    assert_eq!(review.status_enum(), ReviewStatus::Pending);

    // Pending reviews are invisible publicly
    let public = Review::list_approved_for_profile(&mut conn, profile.id)
        .await
        .expect("public list");
    assert!(public.is_empty());

    // Owner flags it, then an admin rules
    let flagged = Review::flag(&mut conn, review.id, profile.id)
        .await
        .expect("flag");
    assert_eq!(flagged.status_enum(), ReviewStatus::Flagged);

    // A verdict already given cannot be re-flagged
    let again = Review::flag(&mut conn, review.id, profile.id).await;
    assert!(matches!(again, Err(ReviewError::NotFlaggable)));

    let approved = Review::set_status(
        &mut conn,
        review.id,
        ReviewStatus::Approved,
        Some("Verified with the client".to_string()),
    )
    .await
    .expect("approve");
    assert_eq!(approved.status_enum(), ReviewStatus::Approved);
    assert_eq!(approved.admin_note.as_deref(), Some("Verified with the client"));

    let public = Review::list_approved_for_profile(&mut conn, profile.id)
        .await
        .expect("public list");
    assert_eq!(public.len(), 1);
}
