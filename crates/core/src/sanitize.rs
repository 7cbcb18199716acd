//! PII scrubbing for persisted error messages.
//!
//! Provider errors routinely echo the recipient back ("550 no mailbox for
//! alice@example.com"), and the delivery log outlives the data-retention
//! window for contact details. Every error message is therefore scrubbed
//! before it reaches a log row or a caller-visible result.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length, in characters, of a persisted error message.
pub const MAX_ERROR_MESSAGE_LEN: usize = 500;

const EMAIL_TOKEN: &str = "[EMAIL]";
const PHONE_TOKEN: &str = "[PHONE]";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid regex"));

// A digit, then at least seven digits/spaces/hyphens, then a digit. Loose on
// purpose: better to scrub a stray order number than to persist a phone.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s-]{7,}\d").expect("valid regex"));

/// Scrub email addresses and phone numbers from an error message and cap its
/// length. Idempotent: running it twice yields the same output.
pub fn sanitize_error_message(message: &str) -> String {
    let scrubbed = EMAIL_RE.replace_all(message, EMAIL_TOKEN);
    let scrubbed = PHONE_RE.replace_all(&scrubbed, PHONE_TOKEN);
    if scrubbed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        scrubbed.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
    } else {
        scrubbed.into_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_addresses_are_replaced() {
        let out = sanitize_error_message("550 mailbox alice@example.com unavailable");
        assert_eq!(out, "550 mailbox [EMAIL] unavailable");
    }

    #[test]
    fn phone_numbers_are_replaced() {
        let out = sanitize_error_message("undeliverable to +506 8888-7777, giving up");
        assert_eq!(out, "undeliverable to [PHONE], giving up");
    }

    #[test]
    fn mixed_pii_is_fully_scrubbed() {
        let out = sanitize_error_message("reach bob.smith@mail.example.org or 555-123-4567");
        assert!(!out.contains('@'));
        assert!(!out.contains("4567"));
        assert_eq!(out, "reach [EMAIL] or [PHONE]");
    }

    #[test]
    fn long_messages_are_truncated_to_limit() {
        let input = "x".repeat(600);
        let out = sanitize_error_message(&input);
        assert_eq!(out.chars().count(), MAX_ERROR_MESSAGE_LEN);
    }

    #[test]
    fn short_clean_messages_pass_through() {
        let out = sanitize_error_message("connection refused");
        assert_eq!(out, "connection refused");
    }

    #[test]
    fn short_digit_runs_are_kept() {
        // Seven digits total: below the scrub threshold.
        let out = sanitize_error_message("HTTP 502 from host 10.0.42.1");
        assert_eq!(out, "HTTP 502 from host 10.0.42.1");
    }

    #[test]
    fn scrubbing_is_idempotent() {
        let once = sanitize_error_message("bounce for carol@example.net via +1 555 123 4567");
        let twice = sanitize_error_message(&once);
        assert_eq!(once, twice);
    }
}
