//! Activity feed repository contract and SQLite implementation.
//!
//! # Invariants
//! - Feed order is `timestamp ASC, id ASC`.
//! - `invoice_id` must reference an existing invoice (foreign key).

use crate::model::activity::{Activity, ActivityId, ActivityType, NewActivity};
use crate::model::invoice::InvoiceId;
use crate::repo::{ensure_connection_ready, parse_timestamp, store_precision, timestamp_to_db};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    type,
    description,
    user_name,
    timestamp,
    amount,
    details,
    invoice_id
FROM activities";

/// Repository interface for the activity feed.
pub trait ActivityRepository {
    fn record_activity(&self, activity: &NewActivity) -> RepoResult<ActivityId>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    fn list_activities(&self) -> RepoResult<Vec<Activity>>;
    /// Activities linked to `invoice_id` through the foreign key.
    fn list_activities_for_invoice(&self, invoice_id: InvoiceId) -> RepoResult<Vec<Activity>>;
}

/// SQLite-backed activity repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_activities(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn record_activity(&self, activity: &NewActivity) -> RepoResult<ActivityId> {
        self.conn.execute(
            "INSERT INTO activities (
                type,
                description,
                user_name,
                timestamp,
                amount,
                details,
                invoice_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                activity_type_to_db(activity.kind),
                activity.description.as_str(),
                activity.user.as_str(),
                timestamp_to_db(&store_precision(activity.timestamp)),
                activity.amount,
                activity.details.as_deref(),
                activity.invoice_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut found = self.query_activities(
            &format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"),
            [id],
        )?;
        Ok(found.pop())
    }

    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        self.query_activities(
            &format!("{ACTIVITY_SELECT_SQL} ORDER BY timestamp ASC, id ASC;"),
            [],
        )
    }

    fn list_activities_for_invoice(&self, invoice_id: InvoiceId) -> RepoResult<Vec<Activity>> {
        self.query_activities(
            &format!(
                "{ACTIVITY_SELECT_SQL}
                 WHERE invoice_id = ?1
                 ORDER BY timestamp ASC, id ASC;"
            ),
            [invoice_id],
        )
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let type_text: String = row.get("type")?;
    let kind = parse_activity_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid activity type `{type_text}` in activities.type"))
    })?;
    let timestamp: String = row.get("timestamp")?;

    Ok(Activity {
        id: row.get("id")?,
        kind,
        description: row.get("description")?,
        user: row.get("user_name")?,
        timestamp: parse_timestamp(&timestamp, "activities.timestamp")?,
        amount: row.get("amount")?,
        details: row.get("details")?,
        invoice_id: row.get("invoice_id")?,
    })
}

fn activity_type_to_db(kind: ActivityType) -> &'static str {
    match kind {
        ActivityType::Created => "created",
        ActivityType::Sent => "sent",
        ActivityType::PaymentConfirmed => "payment_confirmed",
        ActivityType::StatusChanged => "status_changed",
    }
}

fn parse_activity_type(value: &str) -> Option<ActivityType> {
    match value {
        "created" => Some(ActivityType::Created),
        "sent" => Some(ActivityType::Sent),
        "payment_confirmed" => Some(ActivityType::PaymentConfirmed),
        "status_changed" => Some(ActivityType::StatusChanged),
        _ => None,
    }
}
