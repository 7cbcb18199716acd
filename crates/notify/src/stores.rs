//! Collaborator contracts for the dispatcher, plus their PostgreSQL-backed
//! implementations.
//!
//! The dispatcher only ever talks to these traits, so tests can inject
//! scripted fakes and production wiring can swap transports without touching
//! the fan-out logic. Every method normalizes its transport error into
//! [`SendError`] at this seam.

use async_trait::async_trait;
use turno_core::types::DbId;
use turno_core::{Channel, DeliveryStatus, NotificationEvent, SendError};
use turno_db::models::notification::CreateNotification;
use turno_db::models::notification_log::CreateNotificationLog;
use turno_db::repositories::{NotificationLogRepo, NotificationPreferenceRepo, NotificationRepo};
use turno_db::DbPool;

use crate::context::PushPayload;

// ---------------------------------------------------------------------------
// Records exchanged across the seams
// ---------------------------------------------------------------------------

/// Fields for a new in-app feed entry.
#[derive(Debug, Clone)]
pub struct NewInAppNotification {
    pub user_id: Option<DbId>,
    pub business_id: DbId,
    pub event: NotificationEvent,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
}

/// Per-device delivery counts reported by a push sender.
///
/// `sent == 0 && failed == 0` means the user has no registered devices.
/// When `failed > 0`, `last_error` carries the final device failure so the
/// dispatcher can classify an all-devices-failed outcome.
#[derive(Debug, Clone, Default)]
pub struct PushOutcome {
    pub sent: u32,
    pub failed: u32,
    pub last_error: Option<SendError>,
}

/// Terminal audit record for one channel delivery attempt.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub business_id: DbId,
    pub appointment_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub event: NotificationEvent,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Creates in-app feed entries.
#[async_trait]
pub trait InAppStore: Send + Sync {
    async fn create(&self, entry: &NewInAppNotification) -> Result<DbId, SendError>;
}

/// Delivers a push payload to every active device of a user.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Must report "no registered devices" as `Ok` with zero counts, not as
    /// an error; `Err` is reserved for transport trouble.
    async fn send_to_user(&self, user_id: DbId, payload: &PushPayload)
        -> Result<PushOutcome, SendError>;
}

/// Sends an HTML email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), SendError>;
}

/// Looks up a business's delivery channel preference.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// The preference value (`"app"`, `"email"`, `"both"`), or `None` when
    /// the business has never expressed one.
    async fn email_preference(&self, business_id: DbId) -> Result<Option<String>, SendError>;
}

/// Appends terminal delivery outcomes to the audit log.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &NewLogEntry) -> Result<(), SendError>;
}

/// Answers whether an identical notification was already delivered.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn exists_sent(
        &self,
        event: NotificationEvent,
        appointment_id: DbId,
        channel: Channel,
    ) -> Result<bool, SendError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL implementations
// ---------------------------------------------------------------------------

fn store_error(err: sqlx::Error) -> SendError {
    SendError::Other(err.to_string())
}

/// [`InAppStore`] backed by the `notifications` table.
pub struct PgInAppStore {
    pool: DbPool,
}

impl PgInAppStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InAppStore for PgInAppStore {
    async fn create(&self, entry: &NewInAppNotification) -> Result<DbId, SendError> {
        let row = CreateNotification {
            user_id: entry.user_id,
            business_id: entry.business_id,
            event_type: entry.event.as_str().to_string(),
            title: entry.title.clone(),
            message: entry.message.clone(),
            reference_type: entry.reference_type.clone(),
            reference_id: entry.reference_id.clone(),
        };
        NotificationRepo::create(&self.pool, &row)
            .await
            .map_err(store_error)
    }
}

/// [`PreferenceStore`] backed by the `notification_preferences` table.
pub struct PgPreferenceStore {
    pool: DbPool,
}

impl PgPreferenceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn email_preference(&self, business_id: DbId) -> Result<Option<String>, SendError> {
        let preference = NotificationPreferenceRepo::get_for_business(&self.pool, business_id)
            .await
            .map_err(store_error)?;
        // A row with a NULL channel is the same as no row: no preference.
        Ok(preference.and_then(|p| p.channel))
    }
}

/// [`AuditStore`] and [`DedupStore`] backed by the `notification_log` table.
///
/// One type implements both because dedup reads exactly what audit writes.
pub struct PgAuditStore {
    pool: DbPool,
}

impl PgAuditStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, entry: &NewLogEntry) -> Result<(), SendError> {
        let row = CreateNotificationLog {
            business_id: entry.business_id,
            appointment_id: entry.appointment_id,
            user_id: entry.user_id,
            event_type: entry.event.as_str().to_string(),
            channel: entry.channel.as_str().to_string(),
            status: entry.status.as_str().to_string(),
            error_code: entry.error_code.clone(),
            error_message: entry.error_message.clone(),
        };
        NotificationLogRepo::insert(&self.pool, &row)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}

#[async_trait]
impl DedupStore for PgAuditStore {
    async fn exists_sent(
        &self,
        event: NotificationEvent,
        appointment_id: DbId,
        channel: Channel,
    ) -> Result<bool, SendError> {
        let event_type = event.as_str();
        NotificationLogRepo::exists_sent(&self.pool, event_type, appointment_id, channel.as_str())
            .await
            .map_err(store_error)
    }
}
