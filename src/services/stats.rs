// Profile statistics
// Append-only counter events aggregated into daily buckets for the owner
// dashboard. Aggregation happens on read; no rollup tables.

use chrono::{Duration, NaiveDate, Utc};
use diesel_async::AsyncPgConnection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::profile_stat::{ProfileStatEvent, StatEventType};

/// Default window shown on the dashboard
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub views: u32,
    pub phone_clicks: u32,
    pub whatsapp_clicks: u32,
    pub telegram_clicks: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProfileStats {
    pub total_views: u32,
    pub total_phone_clicks: u32,
    pub total_whatsapp_clicks: u32,
    pub total_telegram_clicks: u32,
    pub daily_stats: Vec<DailyStats>,
}

/// Fold raw events into per-day buckets plus totals. Days without events
/// produce no bucket; buckets come out in ascending date order.
pub fn aggregate(events: &[ProfileStatEvent]) -> ProfileStats {
    let mut days: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
    let mut stats = ProfileStats::default();

    for event in events {
        let kind = match StatEventType::from_str(&event.event_type) {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(
                    event_id = %event.id,
                    event_type = event.event_type,
                    "Skipping stat event with unknown type"
                );
                continue;
            },
        };

        let date = event.created_at.date_naive();
        let bucket = days.entry(date).or_insert_with(|| DailyStats {
            date,
            ..DailyStats::default()
        });

        match kind {
            StatEventType::View => {
                bucket.views += 1;
                stats.total_views += 1;
            },
            StatEventType::PhoneClick => {
                bucket.phone_clicks += 1;
                stats.total_phone_clicks += 1;
            },
            StatEventType::WhatsappClick => {
                bucket.whatsapp_clicks += 1;
                stats.total_whatsapp_clicks += 1;
            },
            StatEventType::TelegramClick => {
                bucket.telegram_clicks += 1;
                stats.total_telegram_clicks += 1;
            },
        }
    }

    stats.daily_stats = days.into_values().collect();
    stats
}

/// Load and aggregate the last `window_days` of events for a profile
pub async fn stats_for_profile(
    conn: &mut AsyncPgConnection,
    profile_id: Uuid,
    window_days: i64,
) -> Result<ProfileStats, diesel::result::Error> {
    let since = Utc::now() - Duration::days(window_days);
    let events = ProfileStatEvent::list_since(conn, profile_id, since).await?;
    Ok(aggregate(&events))
}

/// Record one counter event (fire-and-forget from the public profile page)
pub async fn record_event(
    conn: &mut AsyncPgConnection,
    profile_id: Uuid,
    kind: StatEventType,
) -> Result<(), diesel::result::Error> {
    ProfileStatEvent::append(conn, profile_id, kind).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn event(kind: &str, at: DateTime<Utc>) -> ProfileStatEvent {
        ProfileStatEvent {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            event_type: kind.to_string(),
            created_at: at,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate(&[]);
        assert_eq!(stats, ProfileStats::default());
    }

    #[test]
    fn test_aggregate_buckets_by_day() {
        let day1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let day1_later = Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2025, 3, 2, 0, 1, 0).unwrap();

        let events = vec![
            event("view", day1),
            event("view", day1_later),
            event("phone_click", day1),
            event("view", day2),
            event("whatsapp_click", day2),
            event("telegram_click", day2),
        ];

        let stats = aggregate(&events);
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.total_phone_clicks, 1);
        assert_eq!(stats.total_whatsapp_clicks, 1);
        assert_eq!(stats.total_telegram_clicks, 1);

        assert_eq!(stats.daily_stats.len(), 2);
        assert_eq!(stats.daily_stats[0].date, day1.date_naive());
        assert_eq!(stats.daily_stats[0].views, 2);
        assert_eq!(stats.daily_stats[0].phone_clicks, 1);
        assert_eq!(stats.daily_stats[1].views, 1);
    }

    #[test]
    fn test_aggregate_skips_unknown_event_types() {
        let now = Utc::now();
        let events = vec![event("view", now), event("share_click", now)];

        let stats = aggregate(&events);
        assert_eq!(stats.total_views, 1);
        assert_eq!(stats.daily_stats.len(), 1);
        assert_eq!(stats.daily_stats[0].views, 1);
    }
}
