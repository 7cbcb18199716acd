//! Pure domain logic for the Turno notification subsystem.
//!
//! This crate has zero internal dependencies and performs no I/O, so it can
//! be used by the persistence layer, the orchestrator, and any future worker
//! or CLI tooling:
//!
//! - [`event`]: the closed catalog of business events that trigger
//!   notifications.
//! - [`channel`]: delivery channel and delivery status vocabularies.
//! - [`failure`]: the typed send-failure taxonomy and transient/permanent
//!   classification.
//! - [`sanitize`]: PII scrubbing for error text bound for persistence.
//! - [`whatsapp`]: deterministic `wa.me` deep-link construction.

pub mod channel;
pub mod event;
pub mod failure;
pub mod sanitize;
pub mod types;
pub mod whatsapp;

pub use channel::{Channel, DeliveryStatus};
pub use event::NotificationEvent;
pub use failure::{classify, FailureKind, SendError};
