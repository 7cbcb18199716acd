//! Delivery channel and delivery status vocabularies.
//!
//! The string forms produced by [`Channel::as_str`] and
//! [`DeliveryStatus::as_str`] are the values stored in the
//! `notification_log.channel` and `notification_log.status` columns and must
//! never change for existing rows to stay queryable.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One of the four delivery mechanisms a notification can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Feed entry in the in-app notification bell.
    InApp,
    /// Web push to the user's registered device subscriptions.
    Push,
    /// HTML email via SMTP.
    Email,
    /// `wa.me` deep link handed back to the caller; nothing is transmitted.
    Whatsapp,
}

impl Channel {
    /// All channels, in dispatch order.
    pub const ALL: [Self; 4] = [Self::InApp, Self::Push, Self::Email, Self::Whatsapp];

    /// Stable snake_case form used in log rows and dedup queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Push => "push",
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeliveryStatus
// ---------------------------------------------------------------------------

/// Terminal outcome of one channel delivery attempt.
///
/// Exactly one status is recorded per attempt. `Retried` means the first
/// attempt failed transiently and the single retry delivered; it is kept
/// distinct from `Sent` so audit consumers can tell recovered success from
/// first-attempt success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Delivered on the first attempt.
    Sent,
    /// Not delivered; carries an error code and sanitized message.
    Failed,
    /// Delivered on the single retry after a transient failure.
    Retried,
    /// Suppressed because an identical notification was already sent.
    Deduped,
    /// Declined mid-pipeline (preference-gated, missing payload, no devices).
    Skipped,
}

impl DeliveryStatus {
    /// Stable snake_case form used in log rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Retried => "retried",
            Self::Deduped => "deduped",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_string_forms_are_stable() {
        assert_eq!(Channel::InApp.as_str(), "in_app");
        assert_eq!(Channel::Push.as_str(), "push");
        assert_eq!(Channel::Email.as_str(), "email");
        assert_eq!(Channel::Whatsapp.as_str(), "whatsapp");
    }

    #[test]
    fn status_string_forms_are_stable() {
        assert_eq!(DeliveryStatus::Sent.as_str(), "sent");
        assert_eq!(DeliveryStatus::Failed.as_str(), "failed");
        assert_eq!(DeliveryStatus::Retried.as_str(), "retried");
        assert_eq!(DeliveryStatus::Deduped.as_str(), "deduped");
        assert_eq!(DeliveryStatus::Skipped.as_str(), "skipped");
    }

    #[test]
    fn serde_form_matches_as_str() {
        for channel in Channel::ALL {
            let value = serde_json::to_value(channel).expect("serializable");
            assert_eq!(value, channel.as_str());
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Channel::InApp.to_string(), "in_app");
        assert_eq!(DeliveryStatus::Deduped.to_string(), "deduped");
    }
}
