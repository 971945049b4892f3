// Profile statistics event model
// Append-only counter events; aggregation into daily buckets happens in
// services::stats on read.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::profile_stat_events;

/// Counter event kinds recorded against a profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatEventType {
    View,
    PhoneClick,
    WhatsappClick,
    TelegramClick,
}

impl StatEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatEventType::View => "view",
            StatEventType::PhoneClick => "phone_click",
            StatEventType::WhatsappClick => "whatsapp_click",
            StatEventType::TelegramClick => "telegram_click",
        }
    }
}

impl FromStr for StatEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(StatEventType::View),
            "phone_click" => Ok(StatEventType::PhoneClick),
            "whatsapp_click" => Ok(StatEventType::WhatsappClick),
            "telegram_click" => Ok(StatEventType::TelegramClick),
            _ => Err(format!("Invalid stat event type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = profile_stat_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileStatEvent {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profile_stat_events)]
pub struct NewProfileStatEvent {
    pub profile_id: Uuid,
    pub event_type: String,
}

impl ProfileStatEvent {
    pub async fn append(
        conn: &mut AsyncPgConnection,
        target: Uuid,
        kind: StatEventType,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::profile_stat_events::dsl::*;

        diesel::insert_into(profile_stat_events)
            .values(&NewProfileStatEvent {
                profile_id: target,
                event_type: kind.as_str().to_string(),
            })
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Events for a profile since a cutoff, oldest first
    pub async fn list_since(
        conn: &mut AsyncPgConnection,
        target: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::profile_stat_events::dsl::*;

        profile_stat_events
            .filter(profile_id.eq(target))
            .filter(created_at.ge(since))
            .order(created_at.asc())
            .load::<ProfileStatEvent>(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_conversion() {
        assert_eq!(StatEventType::View.as_str(), "view");
        assert_eq!(
            StatEventType::from_str("whatsapp_click"),
            Ok(StatEventType::WhatsappClick)
        );
        assert!(StatEventType::from_str("share_click").is_err());
    }
}
