//! Delivery audit log models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turno_core::types::{DbId, Timestamp};

/// A row from the `notification_log` table: the terminal outcome of one
/// channel delivery attempt. Immutable once created (no `updated_at`).
///
/// `error_message` only ever holds sanitizer output; raw provider text with
/// recipient contact details must not reach this table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationLogEntry {
    pub id: DbId,
    pub business_id: DbId,
    pub appointment_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a delivery outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationLog {
    pub business_id: DbId,
    pub appointment_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}
