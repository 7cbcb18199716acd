//! Repository for the `notification_log` table.

use sqlx::PgPool;
use turno_core::types::DbId;

use crate::models::notification_log::{CreateNotificationLog, NotificationLogEntry};

/// Column list for `notification_log` queries.
const COLUMNS: &str = "id, business_id, appointment_id, user_id, event_type, channel, status, \
     error_code, error_message, created_at";

/// Provides append and lookup operations for the delivery audit log.
///
/// The table is append-only: rows are never updated or deleted, so a
/// `(event_type, appointment_id, channel)` triple that was once recorded as
/// `sent` stays visible to duplicate checks forever.
pub struct NotificationLogRepo;

impl NotificationLogRepo {
    /// Append a delivery outcome, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateNotificationLog,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notification_log \
                 (business_id, appointment_id, user_id, event_type, channel, status, \
                  error_code, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(entry.business_id)
        .bind(entry.appointment_id)
        .bind(entry.user_id)
        .bind(&entry.event_type)
        .bind(&entry.channel)
        .bind(&entry.status)
        .bind(&entry.error_code)
        .bind(&entry.error_message)
        .fetch_one(pool)
        .await
    }

    /// Whether a `sent` row already exists for this event, appointment, and
    /// channel. This is the duplicate-suppression lookup.
    pub async fn exists_sent(
        pool: &PgPool,
        event_type: &str,
        appointment_id: DbId,
        channel: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM notification_log \
             WHERE event_type = $1 AND appointment_id = $2 AND channel = $3 \
               AND status = 'sent' \
             LIMIT 1",
        )
        .bind(event_type)
        .bind(appointment_id)
        .bind(channel)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// List recent log rows for a business, newest first.
    pub async fn list_for_business(
        pool: &PgPool,
        business_id: DbId,
        limit: i64,
    ) -> Result<Vec<NotificationLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_log \
             WHERE business_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationLogEntry>(&query)
            .bind(business_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
