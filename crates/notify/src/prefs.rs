//! Business-level email preference gate.
//!
//! A business can declare how it wants to be notified: `"app"` (in-app
//! only), `"email"`, or `"both"`. Only the `"app"` value suppresses email,
//! and only for events that honor the preference at all; account-critical
//! lifecycle events are always mailed. Missing rows, unknown values, and
//! lookup failures all default to permitted, so a broken preference store
//! can delay a business's opt-out but never silence its notifications.

use turno_core::types::DbId;
use turno_core::NotificationEvent;

use crate::stores::PreferenceStore;

/// Preference value meaning "in-app only, no email".
const PREF_IN_APP_ONLY: &str = "app";

/// Whether the email channel is permitted for this event and business.
pub async fn email_permitted(
    store: &dyn PreferenceStore,
    event: NotificationEvent,
    business_id: DbId,
) -> bool {
    if !event.supports_email_preference() {
        return true;
    }
    match store.email_preference(business_id).await {
        Ok(Some(channel)) => channel != PREF_IN_APP_ONLY,
        Ok(None) => true,
        Err(e) => {
            tracing::warn!(
                error = %e,
                business_id = %business_id,
                "Preference lookup failed, allowing email"
            );
            true
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

    struct ScriptedPrefs {
        channel: Option<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl ScriptedPrefs {
        fn with_channel(channel: Option<&'static str>) -> Self {
            Self { channel, fail: false, calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { channel: None, fail: true, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl PreferenceStore for ScriptedPrefs {
        async fn email_preference(&self, _business_id: DbId) -> Result<Option<String>, SendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SendError::Other("preferences unavailable".to_string()));
            }
            Ok(self.channel.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn app_preference_blocks_email() {
        let store = ScriptedPrefs::with_channel(Some("app"));
        let permitted =
            email_permitted(&store, NotificationEvent::NewAppointment, DbId::new_v4()).await;
        assert!(!permitted);
    }

    #[tokio::test]
    async fn both_and_email_preferences_allow_email() {
        for value in ["both", "email"] {
            let store = ScriptedPrefs::with_channel(Some(value));
            let permitted =
                email_permitted(&store, NotificationEvent::NewAppointment, DbId::new_v4()).await;
            assert!(permitted, "channel {value:?} should permit email");
        }
    }

    #[tokio::test]
    async fn missing_preference_defaults_to_permitted() {
        let store = ScriptedPrefs::with_channel(None);
        let permitted =
            email_permitted(&store, NotificationEvent::PaymentRejected, DbId::new_v4()).await;
        assert!(permitted);
    }

    #[tokio::test]
    async fn ungated_event_never_consults_the_store() {
        let store = ScriptedPrefs::with_channel(Some("app"));
        let permitted =
            email_permitted(&store, NotificationEvent::TrialExpired, DbId::new_v4()).await;
        assert!(permitted);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_failure_fails_open() {
        let store = ScriptedPrefs::failing();
        let permitted =
            email_permitted(&store, NotificationEvent::NewAppointment, DbId::new_v4()).await;
        assert!(permitted);
    }
}
