//! Web push device registration models.

use serde::Serialize;
use sqlx::FromRow;
use turno_core::types::{DbId, Timestamp};

/// A row from the `push_subscriptions` table: one registered browser or
/// device endpoint with its encryption keys.
///
/// `failed_count` counts consecutive delivery failures; it is reset on the
/// next success and drives automatic deactivation of dead endpoints.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PushSubscription {
    pub id: DbId,
    pub user_id: DbId,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub failed_count: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
