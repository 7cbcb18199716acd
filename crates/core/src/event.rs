//! The closed set of business events that produce notifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// A business event that can trigger a notification fan-out.
///
/// The snake_case form from [`NotificationEvent::as_str`] is stored in the
/// `event_type` columns of both the in-app feed and the delivery log, and is
/// the dedup key component, so the strings are append-only: variants may be
/// added but existing names must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    TrialExpiring,
    TrialExpired,
    SubscriptionExpiring,
    SubscriptionExpired,
    PaymentApproved,
    PaymentRejected,
    NewAppointment,
    AppointmentReminder,
    AppointmentCancelled,
    NewBusiness,
    PaymentPending,
    TrialsExpiringBulk,
    SystemAlert,
}

impl NotificationEvent {
    /// Every event, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::TrialExpiring,
        Self::TrialExpired,
        Self::SubscriptionExpiring,
        Self::SubscriptionExpired,
        Self::PaymentApproved,
        Self::PaymentRejected,
        Self::NewAppointment,
        Self::AppointmentReminder,
        Self::AppointmentCancelled,
        Self::NewBusiness,
        Self::PaymentPending,
        Self::TrialsExpiringBulk,
        Self::SystemAlert,
    ];

    /// Stable snake_case form used in database rows and dedup keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrialExpiring => "trial_expiring",
            Self::TrialExpired => "trial_expired",
            Self::SubscriptionExpiring => "subscription_expiring",
            Self::SubscriptionExpired => "subscription_expired",
            Self::PaymentApproved => "payment_approved",
            Self::PaymentRejected => "payment_rejected",
            Self::NewAppointment => "new_appointment",
            Self::AppointmentReminder => "appointment_reminder",
            Self::AppointmentCancelled => "appointment_cancelled",
            Self::NewBusiness => "new_business",
            Self::PaymentPending => "payment_pending",
            Self::TrialsExpiringBulk => "trials_expiring_bulk",
            Self::SystemAlert => "system_alert",
        }
    }

    /// Whether a business can opt this event out of email delivery.
    ///
    /// Events outside this set ignore the preference row entirely: lifecycle
    /// notices like expirations and system alerts are always eligible for
    /// email because suppressing them would hide account-critical state.
    pub fn supports_email_preference(&self) -> bool {
        matches!(
            self,
            Self::TrialExpiring
                | Self::SubscriptionExpiring
                | Self::PaymentApproved
                | Self::PaymentRejected
                | Self::NewAppointment
                | Self::AppointmentReminder
                | Self::AppointmentCancelled
                | Self::NewBusiness
                | Self::PaymentPending
        )
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown notification event: {0}")]
pub struct ParseEventError(pub String);

impl FromStr for NotificationEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| ParseEventError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
