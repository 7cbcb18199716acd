//! Fail-open duplicate suppression.
//!
//! A notification is a duplicate when the audit log already holds a `sent`
//! row for the same `(event, appointment, channel)` triple. Two caveats are
//! deliberate:
//!
//! - Dispatches without an appointment ID are never deduplicated; there is
//!   no stable key to match on.
//! - The check runs before the send without any locking, so two concurrent
//!   dispatches for the same appointment can both pass it. The cost of a
//!   rare double notification is lower than the cost of serializing every
//!   dispatch through the log table.
//!
//! A failing lookup reports "not a duplicate": losing the audit database
//! must degrade to the occasional repeat, never to silence.

use turno_core::types::DbId;
use turno_core::{Channel, NotificationEvent};

use crate::stores::DedupStore;

/// Whether this `(event, appointment, channel)` was already delivered.
pub async fn is_duplicate(
    store: &dyn DedupStore,
    event: NotificationEvent,
    appointment_id: Option<DbId>,
    channel: Channel,
) -> bool {
    let Some(appointment_id) = appointment_id else {
        return false;
    };
    match store.exists_sent(event, appointment_id, channel).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                error = %e,
                event = %event,
                channel = %channel,
                "Duplicate check failed, assuming not duplicate"
            );
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use turno_core::SendError;

    use super::*;

    struct ScriptedDedup {
        answer: Result<bool, ()>,
        calls: AtomicUsize,
    }

    impl ScriptedDedup {
        fn answering(answer: Result<bool, ()>) -> Self {
            Self { answer, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl DedupStore for ScriptedDedup {
        async fn exists_sent(
            &self,
            _event: NotificationEvent,
            _appointment_id: DbId,
            _channel: Channel,
        ) -> Result<bool, SendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map_err(|_| SendError::Other("log unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn matching_sent_row_is_a_duplicate() {
        let store = ScriptedDedup::answering(Ok(true));
        let dup = is_duplicate(
            &store,
            NotificationEvent::NewAppointment,
            Some(DbId::new_v4()),
            Channel::Push,
        )
        .await;
        assert!(dup);
    }

    #[tokio::test]
    async fn missing_appointment_id_skips_the_lookup() {
        let store = ScriptedDedup::answering(Ok(true));
        let dup =
            is_duplicate(&store, NotificationEvent::NewAppointment, None, Channel::Push).await;
        assert!(!dup);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_error_fails_open() {
        let store = ScriptedDedup::answering(Err(()));
        let dup = is_duplicate(
            &store,
            NotificationEvent::AppointmentReminder,
            Some(DbId::new_v4()),
            Channel::Email,
        )
        .await;
        assert!(!dup);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
