//! Repository for the `notifications` table.

use sqlx::PgPool;
use turno_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, business_id, event_type, title, message, \
     reference_type, reference_id, is_read, read_at, created_at";

/// Retention window for read feed entries, in days.
pub const DEFAULT_CLEANUP_DAYS: i64 = 30;

/// Provides CRUD operations for in-app feed entries.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a feed entry, returning the generated ID.
    pub async fn create(pool: &PgPool, entry: &CreateNotification) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications \
                 (user_id, business_id, event_type, title, message, reference_type, reference_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(entry.user_id)
        .bind(entry.business_id)
        .bind(&entry.event_type)
        .bind(&entry.title)
        .bind(&entry.message)
        .bind(&entry.reference_type)
        .bind(&entry.reference_id)
        .fetch_one(pool)
        .await
    }

    /// List feed entries for a user, newest first.
    ///
    /// When `unread_only` is `true`, only entries with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single feed entry as read.
    ///
    /// Returns `true` if the entry was found for the given user and updated,
    /// `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread feed entries as read for a user.
    ///
    /// Returns the number of entries that were marked read.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread feed entries for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Delete read feed entries older than `days_old` days.
    ///
    /// Returns the number of entries removed. Unread entries are kept
    /// regardless of age.
    pub async fn cleanup_old(pool: &PgPool, days_old: i64) -> Result<u64, sqlx::Error> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(days_old);
        let result = sqlx::query(
            "DELETE FROM notifications WHERE is_read = true AND created_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
