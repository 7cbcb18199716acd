//! Terminal-status audit writes with PII scrubbing.

use std::sync::Arc;

use turno_core::sanitize::sanitize_error_message;

use crate::stores::{AuditStore, NewLogEntry};

/// Writes one audit row per channel delivery attempt.
///
/// Two invariants live here: raw error text never reaches the store (the
/// message is scrubbed on the way in), and an audit write failure never
/// surfaces to the dispatch (it is logged and swallowed, because losing a
/// log row must not fail a delivery that already happened).
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record one delivery outcome.
    pub async fn record(&self, mut entry: NewLogEntry) {
        if let Some(message) = entry.error_message.take() {
            entry.error_message = Some(sanitize_error_message(&message));
        }
        if let Err(e) = self.store.append(&entry).await {
            tracing::error!(
                error = %e,
                event = %entry.event,
                channel = %entry.channel,
                status = %entry.status,
                "Failed to write notification audit row"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
