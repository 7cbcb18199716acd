//! Web push delivery through an HTTP gateway.
//!
//! [`HttpPushSender`] POSTs the push payload to a gateway service once per
//! active device subscription, concurrently, and keeps per-subscription
//! delivery health: a success resets the failure counter, a `404`/`410`
//! deactivates the endpoint immediately (the browser revoked it), and
//! repeated failures of any other kind deactivate it after five strikes.
//! Health bookkeeping is best-effort; a failing update is logged, never
//! surfaced.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use turno_core::types::DbId;
use turno_core::SendError;
use turno_db::models::push_subscription::PushSubscription;
use turno_db::repositories::PushSubscriptionRepo;
use turno_db::DbPool;

use crate::context::PushPayload;
use crate::stores::{PushOutcome, PushSender};

/// HTTP request timeout for a single gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// PushConfig
// ---------------------------------------------------------------------------

/// Configuration for the push gateway transport.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Gateway endpoint that performs the actual web push protocol.
    pub gateway_url: String,
    /// Optional bearer token for the gateway.
    pub gateway_key: Option<String>,
}

impl PushConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `PUSH_GATEWAY_URL` is not set, signalling that push
    /// delivery is not configured and the channel should be skipped.
    ///
    /// | Variable           | Required | Default |
    /// |--------------------|----------|---------|
    /// | `PUSH_GATEWAY_URL` | yes      | -       |
    /// | `PUSH_GATEWAY_KEY` | no       | -       |
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("PUSH_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url,
            gateway_key: std::env::var("PUSH_GATEWAY_KEY").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// HttpPushSender
// ---------------------------------------------------------------------------

/// JSON body POSTed to the gateway for one device subscription.
#[derive(Serialize)]
struct GatewayPush<'a> {
    endpoint: &'a str,
    keys: GatewayKeys<'a>,
    payload: &'a PushPayload,
}

#[derive(Serialize)]
struct GatewayKeys<'a> {
    p256dh: &'a str,
    auth: &'a str,
}

/// Delivers push payloads to every active subscription of a user.
pub struct HttpPushSender {
    client: reqwest::Client,
    config: PushConfig,
    pool: DbPool,
}

impl HttpPushSender {
    /// Create a sender with a pre-configured HTTP client.
    pub fn new(config: PushConfig, pool: DbPool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config, pool }
    }

    /// Execute a single gateway POST for one subscription.
    async fn deliver_once(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<(), SendError> {
        let body = GatewayPush {
            endpoint: &subscription.endpoint,
            keys: GatewayKeys {
                p256dh: &subscription.p256dh,
                auth: &subscription.auth,
            },
            payload,
        };

        let mut request = self.client.post(&self.config.gateway_url).json(&body);
        if let Some(key) = &self.config.gateway_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SendError::Other(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SendError::Http { status: status.as_u16(), message });
        }
        Ok(())
    }

    /// Update subscription health after one delivery attempt.
    async fn note_outcome(&self, subscription: &PushSubscription, result: &Result<(), SendError>) {
        match result {
            Ok(()) => {
                if subscription.failed_count > 0 {
                    if let Err(e) =
                        PushSubscriptionRepo::record_success(&self.pool, subscription.id).await
                    {
                        tracing::warn!(
                            error = %e,
                            subscription_id = %subscription.id,
                            "Failed to reset push subscription failure count"
                        );
                    }
                }
            }
            // 404/410 mean the browser revoked the endpoint.
            Err(SendError::Http { status: 404 | 410, .. }) => {
                match PushSubscriptionRepo::deactivate(&self.pool, subscription.id).await {
                    Ok(()) => tracing::info!(
                        subscription_id = %subscription.id,
                        "Push subscription expired, deactivated"
                    ),
                    Err(e) => tracing::warn!(
                        error = %e,
                        subscription_id = %subscription.id,
                        "Failed to deactivate expired push subscription"
                    ),
                }
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    subscription_id = %subscription.id,
                    "Push delivery to subscription failed"
                );
                match PushSubscriptionRepo::record_failure(
                    &self.pool,
                    subscription.id,
                    subscription.failed_count,
                )
                .await
                {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!(
                        subscription_id = %subscription.id,
                        "Push subscription deactivated after repeated failures"
                    ),
                    Err(e) => tracing::warn!(
                        error = %e,
                        subscription_id = %subscription.id,
                        "Failed to record push subscription failure"
                    ),
                }
            }
        }
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send_to_user(
        &self,
        user_id: DbId,
        payload: &PushPayload,
    ) -> Result<PushOutcome, SendError> {
        let subscriptions = PushSubscriptionRepo::list_active_for_user(&self.pool, user_id)
            .await
            .map_err(|e| SendError::Other(e.to_string()))?;

        if subscriptions.is_empty() {
            return Ok(PushOutcome::default());
        }

        let sends = subscriptions
            .iter()
            .map(|subscription| self.deliver_once(subscription, payload));
        let results = futures::future::join_all(sends).await;

        let mut outcome = PushOutcome::default();
        for (subscription, result) in subscriptions.iter().zip(&results) {
            self.note_outcome(subscription, result).await;
        }
        for result in results {
            match result {
                Ok(()) => outcome.sent += 1,
                Err(err) => {
                    outcome.failed += 1;
                    outcome.last_error = Some(err);
                }
            }
        }

        tracing::debug!(
            user_id = %user_id,
            sent = outcome.sent,
            failed = outcome.failed,
            "Push fan-out complete"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_gateway_url() {
        // Ensure PUSH_GATEWAY_URL is not set in the test environment.
        std::env::remove_var("PUSH_GATEWAY_URL");
        assert!(PushConfig::from_env().is_none());
    }

    #[test]
    fn gateway_body_carries_subscription_keys_and_payload() {
        let payload = PushPayload::new("Title", "Body")
            .with_url("/appointments/7")
            .with_tag("new_appointment-7");
        let body = GatewayPush {
            endpoint: "https://push.example.org/send/abc",
            keys: GatewayKeys { p256dh: "pk", auth: "secret" },
            payload: &payload,
        };

        let value = serde_json::to_value(&body).expect("serializable");
        assert_eq!(value["endpoint"], "https://push.example.org/send/abc");
        assert_eq!(value["keys"]["p256dh"], "pk");
        assert_eq!(value["keys"]["auth"], "secret");
        assert_eq!(value["payload"]["title"], "Title");
        assert_eq!(value["payload"]["tag"], "new_appointment-7");
    }

    #[test]
    fn empty_outcome_means_no_subscriptions() {
        let outcome = PushOutcome::default();
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.last_error.is_none());
    }
}
