//! The channel fan-out dispatcher.
//!
//! [`Orchestrator::notify`] takes one business event and attempts every
//! applicable channel concurrently. It upholds three contracts:
//!
//! - It never returns an error or panics; every channel outcome, including
//!   total failure, is reported inside the [`NotificationResult`].
//! - Channels are independent: one channel's failure never prevents
//!   another's delivery.
//! - Every attempted channel produces exactly one terminal audit row.

use std::sync::Arc;

use serde_json::Value;
use turno_core::sanitize::sanitize_error_message;
use turno_core::types::DbId;
use turno_core::{
    classify, whatsapp, Channel, DeliveryStatus, FailureKind, NotificationEvent, SendError,
};
use turno_db::DbPool;

use crate::audit::AuditLogger;
use crate::context::{
    ChannelResult, EmailPayload, InAppPayload, NotificationResult, NotifyContext, NotifyOptions,
    PushPayload, WHATSAPP_LINK_KEY,
};
use crate::dedup;
use crate::delivery::{EmailConfig, HttpPushSender, PushConfig, SmtpEmailSender};
use crate::prefs;
use crate::retry::{self, RETRY_DELAY};
use crate::stores::{
    AuditStore, DedupStore, EmailSender, InAppStore, NewInAppNotification, NewLogEntry,
    PgAuditStore, PgInAppStore, PgPreferenceStore, PreferenceStore, PushSender,
};

/// Error code for email attempts suppressed by business preferences.
const CODE_EMAIL_DISABLED: &str = "email_disabled_by_prefs";

/// Error code for email attempts that had no payload to send.
const CODE_NO_EMAIL_PAYLOAD: &str = "no_email_payload";

/// Error code for push attempts with no registered device.
const CODE_NO_SUBSCRIPTIONS: &str = "no_subscriptions";

/// Push title when the caller provides neither a payload nor `push_title`.
const DEFAULT_PUSH_TITLE: &str = "Notification";

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Fans one notification out to the in-app, push, email, and WhatsApp
/// channels.
///
/// The in-app feed, preferences, and audit log are always wired; the push
/// and email senders are optional and their channels are simply never
/// attempted while unset.
pub struct Orchestrator {
    in_app: Arc<dyn InAppStore>,
    prefs: Arc<dyn PreferenceStore>,
    dedup: Arc<dyn DedupStore>,
    audit: AuditLogger,
    push: Option<Arc<dyn PushSender>>,
    email: Option<Arc<dyn EmailSender>>,
}

impl Orchestrator {
    pub fn new(
        in_app: Arc<dyn InAppStore>,
        prefs: Arc<dyn PreferenceStore>,
        audit: Arc<dyn AuditStore>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        Self {
            in_app,
            prefs,
            dedup,
            audit: AuditLogger::new(audit),
            push: None,
            email: None,
        }
    }

    /// Enable the push channel.
    pub fn with_push(mut self, sender: Arc<dyn PushSender>) -> Self {
        self.push = Some(sender);
        self
    }

    /// Enable the email channel.
    pub fn with_email(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email = Some(sender);
        self
    }

    /// Wire the dispatcher against PostgreSQL stores, enabling push and
    /// email when their transports are configured in the environment.
    pub fn from_env(pool: DbPool) -> Self {
        let audit_store = Arc::new(PgAuditStore::new(pool.clone()));
        let mut orchestrator = Self::new(
            Arc::new(PgInAppStore::new(pool.clone())),
            Arc::new(PgPreferenceStore::new(pool.clone())),
            audit_store.clone(),
            audit_store,
        );

        if let Some(config) = PushConfig::from_env() {
            orchestrator =
                orchestrator.with_push(Arc::new(HttpPushSender::new(config, pool.clone())));
        }
        if let Some(config) = EmailConfig::from_env() {
            match SmtpEmailSender::new(&config) {
                Ok(sender) => orchestrator = orchestrator.with_email(Arc::new(sender)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "SMTP transport setup failed, email channel disabled"
                    );
                }
            }
        }
        orchestrator
    }

    /// Dispatch one notification across all applicable channels.
    ///
    /// A channel is attempted when its payload and recipient details are
    /// present, its sender is configured, and it is not in
    /// `options.skip_channels`. Results arrive in dispatch order: in-app,
    /// push, email, WhatsApp. The generated WhatsApp link, if any, is
    /// written into `ctx.data` under [`WHATSAPP_LINK_KEY`].
    ///
    /// This method never fails; callers on a request path may spawn it and
    /// drop the handle.
    pub async fn notify(
        &self,
        event: NotificationEvent,
        ctx: &mut NotifyContext,
        options: &NotifyOptions,
    ) -> NotificationResult {
        tracing::debug!(
            event = %event,
            business_id = %ctx.business_id,
            "Dispatching notification"
        );
        let shared_ctx: &NotifyContext = &*ctx;
        let excluded = |channel: Channel| options.skip_channels.contains(&channel);

        let in_app_attempt = async {
            let payload = options.in_app.as_ref()?;
            if excluded(Channel::InApp) {
                return None;
            }
            Some(self.send_in_app(event, shared_ctx, payload).await)
        };

        let push_attempt = async {
            let sender = self.push.as_deref()?;
            let user_id = shared_ctx.user_id?;
            if excluded(Channel::Push) {
                return None;
            }
            Some(
                self.send_push(event, shared_ctx, sender, user_id, options.push.as_ref())
                    .await,
            )
        };

        let email_attempt = async {
            let sender = self.email.as_deref()?;
            let to = shared_ctx.recipient_email.as_deref()?;
            if excluded(Channel::Email) {
                return None;
            }
            Some(
                self.send_email(event, shared_ctx, sender, to, options.email.as_ref())
                    .await,
            )
        };

        let whatsapp_attempt = async {
            let phone = shared_ctx.recipient_phone.as_deref()?;
            let text = options.whatsapp_text.as_deref()?;
            if excluded(Channel::Whatsapp) {
                return None;
            }
            Some(self.generate_whatsapp(event, shared_ctx, phone, text).await)
        };

        let (in_app_res, push_res, email_res, whatsapp_res) =
            tokio::join!(in_app_attempt, push_attempt, email_attempt, whatsapp_attempt);

        let mut channels = Vec::new();
        channels.extend(in_app_res);
        channels.extend(push_res);
        channels.extend(email_res);
        if let Some((result, link)) = whatsapp_res {
            if let Some(link) = link {
                ctx.data.insert(WHATSAPP_LINK_KEY.to_string(), Value::String(link));
            }
            channels.push(result);
        }

        let result = NotificationResult::new(event, channels);
        if !result.channels.is_empty() && !result.success {
            tracing::warn!(
                event = %event,
                business_id = %ctx.business_id,
                "Notification failed on every attempted channel"
            );
        }
        result
    }

    // -----------------------------------------------------------------------
    // Per-channel pipelines
    // -----------------------------------------------------------------------

    /// In-app pipeline: dedup, create the feed entry, audit.
    async fn send_in_app(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        payload: &InAppPayload,
    ) -> ChannelResult {
        let channel = Channel::InApp;
        if self.deduped(event, ctx, channel).await {
            return ChannelResult::new(channel, DeliveryStatus::Deduped);
        }

        let entry = NewInAppNotification {
            user_id: ctx.user_id,
            business_id: ctx.business_id,
            event,
            title: payload.title.clone(),
            message: payload.message.clone(),
            reference_type: payload.reference_type.clone(),
            reference_id: payload.reference_id.clone(),
        };

        match retry::with_timeout(self.in_app.create(&entry)).await {
            Ok(_id) => self.sent(event, ctx, channel).await,
            Err(err) => self.handle_failure(event, ctx, channel, err, None).await,
        }
    }

    /// Push pipeline: dedup, resolve the payload, fan out to devices.
    async fn send_push(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        sender: &dyn PushSender,
        user_id: DbId,
        payload: Option<&PushPayload>,
    ) -> ChannelResult {
        let channel = Channel::Push;
        if self.deduped(event, ctx, channel).await {
            return ChannelResult::new(channel, DeliveryStatus::Deduped);
        }

        let payload = match payload {
            Some(p) => p.clone(),
            None => default_push_payload(event, ctx),
        };

        match retry::with_timeout(sender.send_to_user(user_id, &payload)).await {
            Ok(outcome) if outcome.sent > 0 => self.sent(event, ctx, channel).await,
            Ok(outcome) if outcome.failed == 0 => {
                self.skip(event, ctx, channel, CODE_NO_SUBSCRIPTIONS).await
            }
            Ok(outcome) => {
                // Every device failed; classify by the last device error.
                let err = outcome.last_error.unwrap_or_else(|| {
                    SendError::Other(format!("Push failed on {} subscription(s)", outcome.failed))
                });
                self.handle_failure(event, ctx, channel, err, Some((sender, user_id, &payload)))
                    .await
            }
            Err(err) => {
                self.handle_failure(event, ctx, channel, err, Some((sender, user_id, &payload)))
                    .await
            }
        }
    }

    /// Email pipeline: dedup, preference gate, payload check, send.
    async fn send_email(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        sender: &dyn EmailSender,
        to: &str,
        payload: Option<&EmailPayload>,
    ) -> ChannelResult {
        let channel = Channel::Email;
        if self.deduped(event, ctx, channel).await {
            return ChannelResult::new(channel, DeliveryStatus::Deduped);
        }

        if !prefs::email_permitted(self.prefs.as_ref(), event, ctx.business_id).await {
            return self.skip(event, ctx, channel, CODE_EMAIL_DISABLED).await;
        }

        let Some(payload) = payload else {
            return self.skip(event, ctx, channel, CODE_NO_EMAIL_PAYLOAD).await;
        };

        match retry::with_timeout(sender.send(to, &payload.subject, &payload.html)).await {
            Ok(()) => self.sent(event, ctx, channel).await,
            Err(err) => self.handle_failure(event, ctx, channel, err, None).await,
        }
    }

    /// WhatsApp pipeline: dedup, build the deterministic deep link. No
    /// network send happens; producing the link is the delivery.
    async fn generate_whatsapp(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        phone: &str,
        text: &str,
    ) -> (ChannelResult, Option<String>) {
        let channel = Channel::Whatsapp;
        if self.deduped(event, ctx, channel).await {
            return (ChannelResult::new(channel, DeliveryStatus::Deduped), None);
        }

        let link = whatsapp::build_link(phone, text);
        let result = self.sent(event, ctx, channel).await;
        (result, Some(link))
    }

    // -----------------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------------

    /// Dedup check plus its audit row.
    async fn deduped(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        channel: Channel,
    ) -> bool {
        if !dedup::is_duplicate(self.dedup.as_ref(), event, ctx.appointment_id, channel).await {
            return false;
        }
        tracing::debug!(event = %event, channel = %channel, "Duplicate notification suppressed");
        self.record(event, ctx, channel, DeliveryStatus::Deduped, None, None)
            .await;
        true
    }

    /// Audit a successful delivery and build its result.
    async fn sent(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        channel: Channel,
    ) -> ChannelResult {
        self.record(event, ctx, channel, DeliveryStatus::Sent, None, None).await;
        ChannelResult::new(channel, DeliveryStatus::Sent)
    }

    /// Audit a mid-pipeline skip and build its result.
    async fn skip(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        channel: Channel,
        code: &str,
    ) -> ChannelResult {
        self.record(
            event,
            ctx,
            channel,
            DeliveryStatus::Skipped,
            Some(code.to_string()),
            None,
        )
        .await;
        ChannelResult::skipped(channel, code)
    }

    /// Classify a failed send, retry it once when policy allows, and audit
    /// the terminal status.
    ///
    /// The audit row always carries the first attempt's error code and
    /// sanitized message, even when the retry also fails with something
    /// else.
    async fn handle_failure(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        channel: Channel,
        err: SendError,
        retry_send: Option<(&dyn PushSender, DbId, &PushPayload)>,
    ) -> ChannelResult {
        tracing::error!(
            error = %err,
            event = %event,
            channel = %channel,
            business_id = %ctx.business_id,
            "Channel delivery failed"
        );

        let error_code = err.error_code();
        let error_message = sanitize_error_message(&err.to_string());

        if classify(&err) == FailureKind::Transient && retry::supports_retry(channel) {
            if let Some((sender, user_id, payload)) = retry_send {
                tokio::time::sleep(RETRY_DELAY).await;
                match retry::with_timeout(sender.send_to_user(user_id, payload)).await {
                    Ok(outcome) if outcome.sent > 0 => {
                        tracing::info!(event = %event, channel = %channel, "Retry delivered");
                        self.record(event, ctx, channel, DeliveryStatus::Retried, None, None)
                            .await;
                        return ChannelResult::new(channel, DeliveryStatus::Retried);
                    }
                    Ok(_) => {
                        tracing::warn!(
                            event = %event,
                            channel = %channel,
                            "Retry reached no device"
                        );
                    }
                    Err(retry_err) => {
                        tracing::error!(
                            error = %retry_err,
                            event = %event,
                            channel = %channel,
                            "Retry attempt failed"
                        );
                    }
                }
            }
        }

        self.record(
            event,
            ctx,
            channel,
            DeliveryStatus::Failed,
            Some(error_code.clone()),
            Some(error_message.clone()),
        )
        .await;
        ChannelResult::failed(channel, error_code, error_message)
    }

    /// Append one terminal audit row.
    async fn record(
        &self,
        event: NotificationEvent,
        ctx: &NotifyContext,
        channel: Channel,
        status: DeliveryStatus,
        error_code: Option<String>,
        error_message: Option<String>,
    ) {
        self.audit
            .record(NewLogEntry {
                business_id: ctx.business_id,
                appointment_id: ctx.appointment_id,
                user_id: ctx.user_id,
                event,
                channel,
                status,
                error_code,
                error_message,
            })
            .await;
    }
}

/// Build a push payload from context data when the caller supplies none.
fn default_push_payload(event: NotificationEvent, ctx: &NotifyContext) -> PushPayload {
    let title = ctx
        .data
        .get("push_title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PUSH_TITLE);
    let body = ctx.data.get("push_body").and_then(Value::as_str).unwrap_or_default();
    let url = ctx.data.get("push_url").and_then(Value::as_str).map(str::to_string);
    // Same event + appointment collapse into one device banner.
    let tag = ctx.appointment_id.map(|id| format!("{event}-{id}"));

    PushPayload {
        title: title.to_string(),
        body: body.to_string(),
        url,
        tag,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
