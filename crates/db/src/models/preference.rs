//! Per-business delivery preference models.

use serde::Serialize;
use sqlx::FromRow;
use turno_core::types::{DbId, Timestamp};

/// A row from the `notification_preferences` table, at most one per business.
///
/// `channel` is `"app"`, `"email"`, or `"both"`; `NULL` means the business
/// has never expressed a preference and gets the permissive default.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub business_id: DbId,
    pub channel: Option<String>,
    pub email_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
