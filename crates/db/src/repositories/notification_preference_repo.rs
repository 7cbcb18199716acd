//! Repository for the `notification_preferences` table.

use sqlx::PgPool;
use turno_core::types::DbId;

use crate::models::preference::NotificationPreference;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, business_id, channel, email_address, created_at, updated_at";

/// Provides lookup and upsert operations for per-business preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Fetch the preference row for a business, if one exists.
    pub async fn get_for_business(
        pool: &PgPool,
        business_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_preferences WHERE business_id = $1"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(business_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the preference row for a business.
    pub async fn upsert(
        pool: &PgPool,
        business_id: DbId,
        channel: Option<&str>,
        email_address: Option<&str>,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences (business_id, channel, email_address) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (business_id) DO UPDATE \
             SET channel = EXCLUDED.channel, \
                 email_address = EXCLUDED.email_address, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(business_id)
            .bind(channel)
            .bind(email_address)
            .fetch_one(pool)
            .await
    }
}
