//! Notification delivery orchestration for Turno.
//!
//! One business event (a new appointment, an expiring trial, a payment
//! outcome) fans out to up to four channels: the in-app feed, web push,
//! email, and a WhatsApp deep link. [`Orchestrator::notify`] owns that
//! fan-out end to end: duplicate suppression, preference gating, failure
//! classification with a single bounded retry, and a sanitized audit row per
//! attempt. It never returns an error; delivery trouble is reported inside
//! the returned [`NotificationResult`] so a caller on the request path can
//! fire and forget.
//!
//! - [`context`]: the per-dispatch context, payloads, and result types.
//! - [`stores`]: collaborator traits and their PostgreSQL-backed impls.
//! - [`dedup`]: fail-open duplicate suppression.
//! - [`prefs`]: the business-level email preference gate.
//! - [`audit`]: terminal-status audit writes with PII scrubbing.
//! - [`retry`]: timeout and retry policy constants.
//! - [`delivery`]: SMTP and HTTP push transports.
//! - [`orchestrator`]: the channel fan-out dispatcher itself.

pub mod audit;
pub mod context;
pub mod dedup;
pub mod delivery;
pub mod orchestrator;
pub mod prefs;
pub mod retry;
pub mod stores;

pub use context::{
    ChannelResult, EmailPayload, InAppPayload, NotificationResult, NotifyContext, NotifyOptions,
    PushPayload,
};
pub use orchestrator::Orchestrator;
pub use stores::{
    AuditStore, DedupStore, EmailSender, InAppStore, NewInAppNotification, NewLogEntry,
    PreferenceStore, PushOutcome, PushSender,
};
