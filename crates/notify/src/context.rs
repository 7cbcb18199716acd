//! Dispatch context, channel payloads, and result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use turno_core::types::DbId;
use turno_core::{Channel, DeliveryStatus, NotificationEvent};

/// Key under which the generated WhatsApp deep link is written back into
/// [`NotifyContext::data`]. Underscore-prefixed to keep it out of the
/// caller's own key space.
pub const WHATSAPP_LINK_KEY: &str = "_whatsapp_link";

// ---------------------------------------------------------------------------
// NotifyContext
// ---------------------------------------------------------------------------

/// Everything the dispatcher needs to know about who a notification is for.
///
/// `business_id` is the only required field. The optional fields gate
/// channels: push needs `user_id`, email needs `recipient_email`, WhatsApp
/// needs `recipient_phone`, and `appointment_id` keys duplicate suppression
/// (without it, dedup is bypassed entirely).
#[derive(Debug, Clone)]
pub struct NotifyContext {
    pub business_id: DbId,
    pub appointment_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    /// Free-form event data. `push_title`, `push_body`, and `push_url` seed
    /// the default push payload; the dispatcher writes the WhatsApp link
    /// back under [`WHATSAPP_LINK_KEY`].
    pub data: Map<String, Value>,
}

impl NotifyContext {
    /// Create a context for a business with no recipient details.
    pub fn new(business_id: DbId) -> Self {
        Self {
            business_id,
            appointment_id: None,
            user_id: None,
            recipient_email: None,
            recipient_phone: None,
            data: Map::new(),
        }
    }

    /// Attach the appointment this notification is about.
    pub fn with_appointment(mut self, appointment_id: DbId) -> Self {
        self.appointment_id = Some(appointment_id);
        self
    }

    /// Attach the receiving user.
    pub fn with_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attach the recipient's email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.recipient_email = Some(email.into());
        self
    }

    /// Attach the recipient's phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.recipient_phone = Some(phone.into());
        self
    }

    /// Attach a free-form data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Channel payloads
// ---------------------------------------------------------------------------

/// Content for an in-app feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InAppPayload {
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
}

impl InAppPayload {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            reference_type: None,
            reference_id: None,
        }
    }

    /// Link the entry to the record it is about, e.g. `("appointment", id)`.
    pub fn with_reference(
        mut self,
        reference_type: impl Into<String>,
        reference_id: impl Into<String>,
    ) -> Self {
        self.reference_type = Some(reference_type.into());
        self.reference_id = Some(reference_id.into());
        self
    }
}

/// Content for a web push message. This struct is the wire body POSTed to
/// the push gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    /// Collapse key: pushes with the same tag replace each other on the
    /// device instead of stacking.
    pub tag: Option<String>,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), url: None, tag: None }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Content for an HTML email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPayload {
    pub subject: String,
    pub html: String,
}

impl EmailPayload {
    pub fn new(subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self { subject: subject.into(), html: html.into() }
    }
}

// ---------------------------------------------------------------------------
// NotifyOptions
// ---------------------------------------------------------------------------

/// Per-channel payloads for one dispatch.
///
/// A channel with no payload here is simply not attempted, with one
/// exception: push synthesizes a default payload from the context's
/// `push_title`/`push_body`/`push_url` data when none is given.
#[derive(Debug, Clone, Default)]
pub struct NotifyOptions {
    pub in_app: Option<InAppPayload>,
    pub push: Option<PushPayload>,
    pub email: Option<EmailPayload>,
    /// Prefilled message text for the WhatsApp deep link.
    pub whatsapp_text: Option<String>,
    /// Channels to suppress for this dispatch even when otherwise eligible.
    pub skip_channels: Vec<Channel>,
}

impl NotifyOptions {
    pub fn with_in_app(mut self, payload: InAppPayload) -> Self {
        self.in_app = Some(payload);
        self
    }

    pub fn with_push(mut self, payload: PushPayload) -> Self {
        self.push = Some(payload);
        self
    }

    pub fn with_email(mut self, payload: EmailPayload) -> Self {
        self.email = Some(payload);
        self
    }

    pub fn with_whatsapp_text(mut self, text: impl Into<String>) -> Self {
        self.whatsapp_text = Some(text.into());
        self
    }

    pub fn skipping(mut self, channel: Channel) -> Self {
        self.skip_channels.push(channel);
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of one channel's delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelResult {
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl ChannelResult {
    /// A result with no error details (sent, retried, deduped).
    pub fn new(channel: Channel, status: DeliveryStatus) -> Self {
        Self { channel, status, error_code: None, error_message: None }
    }

    /// A skip, with the code explaining what gated the channel.
    pub fn skipped(channel: Channel, error_code: &str) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Skipped,
            error_code: Some(error_code.to_string()),
            error_message: None,
        }
    }

    /// A terminal failure. `error_message` must already be sanitized.
    pub fn failed(channel: Channel, error_code: String, error_message: String) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Failed,
            error_code: Some(error_code),
            error_message: Some(error_message),
        }
    }
}

/// Aggregate outcome of one dispatch across all attempted channels.
///
/// `channels` holds one entry per attempted channel in dispatch order
/// (in-app, push, email, WhatsApp); channels that were not applicable do not
/// appear at all.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationResult {
    pub event: NotificationEvent,
    pub channels: Vec<ChannelResult>,
    /// True when at least one channel reached `Sent` or `Retried`.
    pub success: bool,
}

impl NotificationResult {
    pub fn new(event: NotificationEvent, channels: Vec<ChannelResult>) -> Self {
        let success = channels
            .iter()
            .any(|r| matches!(r.status, DeliveryStatus::Sent | DeliveryStatus::Retried));
        Self { event, channels, success }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
