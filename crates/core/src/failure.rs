//! Send failure taxonomy: error codes for the audit trail and the
//! transient/permanent split that drives the retry policy.

// ---------------------------------------------------------------------------
// SendError
// ---------------------------------------------------------------------------

/// Why a channel delivery attempt failed.
///
/// Collaborators normalize their transport errors into this enum so the
/// dispatcher can classify and audit failures without knowing whether the
/// underlying trouble came from SQL, SMTP, or HTTP.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SendError {
    /// The provider rejected the send with a machine-readable code.
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    /// The transport answered with an HTTP error status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The call did not complete within the channel timeout.
    #[error("Send timed out")]
    Timeout,

    /// Any other failure, described only by its message.
    #[error("{0}")]
    Other(String),
}

impl SendError {
    /// Machine-readable code recorded in `notification_log.error_code`.
    ///
    /// Provider codes pass through as-is, HTTP statuses become `HTTP_<n>`,
    /// timeouts become `TIMEOUT`, and everything else is `UNKNOWN`.
    pub fn error_code(&self) -> String {
        match self {
            Self::Provider { code, .. } => code.clone(),
            Self::Http { status, .. } => format!("HTTP_{status}"),
            Self::Timeout => "TIMEOUT".to_string(),
            Self::Other(_) => "UNKNOWN".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether a failed send is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Infrastructure hiccup; a prompt retry may deliver.
    Transient,
    /// Deterministic rejection; retrying would fail again.
    Permanent,
}

/// Message substrings that identify an infrastructure hiccup.
const TRANSIENT_MARKERS: &[&str] = &[
    "timeout",
    "econnrefused",
    "connection refused",
    "econnreset",
    "connection reset",
    "socket hang up",
    "502",
    "503",
    "504",
];

/// Classify a send failure as transient or permanent.
///
/// Timeouts and gateway-trouble HTTP statuses (502, 503, 504) are transient
/// outright; anything else is transient only when its lowercased message
/// contains one of the known infrastructure markers. Unrecognized errors
/// default to permanent so a broken provider is not hammered with retries.
pub fn classify(err: &SendError) -> FailureKind {
    match err {
        SendError::Timeout => FailureKind::Transient,
        SendError::Http { status: 502 | 503 | 504, .. } => FailureKind::Transient,
        other => {
            let message = other.to_string().to_lowercase();
            if TRANSIENT_MARKERS.iter().any(|marker| message.contains(marker)) {
                FailureKind::Transient
            } else {
                FailureKind::Permanent
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- classification ---

    #[test]
    fn timeout_is_transient() {
        assert_eq!(classify(&SendError::Timeout), FailureKind::Transient);
    }

    #[test]
    fn gateway_statuses_are_transient() {
        for status in [502, 503, 504] {
            let err = SendError::Http { status, message: "upstream".to_string() };
            assert_eq!(classify(&err), FailureKind::Transient);
        }
    }

    #[test]
    fn client_error_status_is_permanent() {
        let err = SendError::Http { status: 400, message: "bad payload".to_string() };
        assert_eq!(classify(&err), FailureKind::Permanent);
    }

    #[test]
    fn marker_in_message_is_transient() {
        let err = SendError::Other("socket hang up".to_string());
        assert_eq!(classify(&err), FailureKind::Transient);
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let err = SendError::Other("connect ECONNREFUSED 10.0.0.1:443".to_string());
        assert_eq!(classify(&err), FailureKind::Transient);
    }

    #[test]
    fn unrecognized_message_is_permanent() {
        let err = SendError::Other("invalid API key".to_string());
        assert_eq!(classify(&err), FailureKind::Permanent);
    }

    #[test]
    fn provider_message_is_classified_by_markers() {
        let err = SendError::Provider {
            code: "smtp_451".to_string(),
            message: "connection reset by peer".to_string(),
        };
        assert_eq!(classify(&err), FailureKind::Transient);
    }

    // --- error codes ---

    #[test]
    fn provider_code_passes_through() {
        let err = SendError::Provider {
            code: "invalid_recipient".to_string(),
            message: "no such mailbox".to_string(),
        };
        assert_eq!(err.error_code(), "invalid_recipient");
    }

    #[test]
    fn http_status_becomes_prefixed_code() {
        let err = SendError::Http { status: 503, message: String::new() };
        assert_eq!(err.error_code(), "HTTP_503");
    }

    #[test]
    fn timeout_and_unknown_codes() {
        assert_eq!(SendError::Timeout.error_code(), "TIMEOUT");
        assert_eq!(SendError::Other("boom".to_string()).error_code(), "UNKNOWN");
    }
}
