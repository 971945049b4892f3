// Login history model
// Append-only audit rows, one per authentication attempt. Never mutated or
// deleted through the API.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::login_history;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = login_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LoginHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = login_history)]
pub struct NewLoginHistoryEntry {
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
}

impl LoginHistoryEntry {
    pub async fn append(
        conn: &mut AsyncPgConnection,
        entry: NewLoginHistoryEntry,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::login_history::dsl::*;

        diesel::insert_into(login_history)
            .values(&entry)
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::login_history::dsl::*;

        login_history
            .filter(user_id.eq(owner))
            .order(created_at.desc())
            .limit(limit)
            .load::<LoginHistoryEntry>(conn)
            .await
    }
}
