//! In-app notification feed models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turno_core::types::{DbId, Timestamp};

/// A row from the `notifications` table: one entry in the in-app feed.
///
/// A `NULL` `user_id` marks a business-wide entry visible to the whole
/// business rather than a single user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub business_id: DbId,
    pub event_type: String,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a feed entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub user_id: Option<DbId>,
    pub business_id: DbId,
    pub event_type: String,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
}
