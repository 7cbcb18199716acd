//! Timeout and retry policy for channel sends.

use std::future::Future;
use std::time::Duration;

use turno_core::{Channel, SendError};

/// Upper bound on any single collaborator send call. Keeps one stuck
/// transport from pinning a dispatch open indefinitely.
pub const CHANNEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay before the single retry of a transient failure.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Whether a channel participates in transient-failure retry.
///
/// Push is the only retried channel. Email delegates retrying to the SMTP
/// relay's own queue, the in-app write shares fate with the database the
/// retry would also need, and WhatsApp performs no send at all.
pub fn supports_retry(channel: Channel) -> bool {
    matches!(channel, Channel::Push)
}

/// Bound a collaborator call to [`CHANNEL_TIMEOUT`], mapping an elapsed
/// deadline to [`SendError::Timeout`].
pub async fn with_timeout<T, F>(fut: F) -> Result<T, SendError>
where
    F: Future<Output = Result<T, SendError>>,
{
    match tokio::time::timeout(CHANNEL_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(SendError::Timeout),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn only_push_supports_retry() {
        assert!(supports_retry(Channel::Push));
        assert!(!supports_retry(Channel::InApp));
        assert!(!supports_retry(Channel::Email));
        assert!(!supports_retry(Channel::Whatsapp));
    }

    #[tokio::test]
    async fn completed_calls_pass_through() {
        let result = with_timeout(async { Ok::<_, SendError>(7) }).await;
        assert_matches!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_calls_become_timeout_errors() {
        let result = with_timeout(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, SendError>(())
        })
        .await;
        assert_matches!(result, Err(SendError::Timeout));
    }
}
