//! Deterministic `wa.me` deep-link construction.
//!
//! WhatsApp delivery never touches a network service: the caller receives a
//! click-to-chat link with the message text prefilled and hands it to the
//! user. The same phone and text always produce the same link.

const WA_BASE_URL: &str = "https://wa.me";

/// Characters emitted verbatim by [`encode_uri_component`], besides ASCII
/// alphanumerics (the RFC 2396 unreserved marks).
const UNRESERVED_MARKS: &str = "-_.!~*'()";

/// Build a click-to-chat link for a phone number and prefilled message.
///
/// The phone is reduced to its digits, so formatted input like
/// `+506 8888-7777` and bare input like `50688887777` yield the same link.
pub fn build_link(phone: &str, text: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{WA_BASE_URL}/{digits}?text={}", encode_uri_component(text))
}

/// Percent-encode a query component, leaving ASCII alphanumerics and the
/// RFC 2396 unreserved marks intact. Non-ASCII input is encoded per UTF-8
/// byte with uppercase hex digits.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        let c = byte as char;
        if c.is_ascii_alphanumeric() || UNRESERVED_MARKS.contains(c) {
            out.push(c);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_phone_is_reduced_to_digits() {
        let link = build_link("+506 8888-7777", "Hola");
        assert_eq!(link, "https://wa.me/50688887777?text=Hola");
    }

    #[test]
    fn bare_and_formatted_phones_agree() {
        assert_eq!(build_link("50688887777", "Hi"), build_link("+506 8888-7777", "Hi"));
    }

    #[test]
    fn spaces_and_accents_are_percent_encoded() {
        let link = build_link("50688887777", "Hola María");
        assert_eq!(link, "https://wa.me/50688887777?text=Hola%20Mar%C3%ADa");
    }

    #[test]
    fn unreserved_marks_stay_verbatim() {
        assert_eq!(encode_uri_component("ok-_.!~*'()"), "ok-_.!~*'()");
    }

    #[test]
    fn reserved_query_characters_are_encoded() {
        assert_eq!(encode_uri_component("a&b=c?d"), "a%26b%3Dc%3Fd");
        assert_eq!(encode_uri_component("50% off"), "50%25%20off");
    }

    #[test]
    fn same_input_same_link() {
        let first = build_link("50688887777", "Su cita es mañana a las 10:00");
        let second = build_link("50688887777", "Su cita es mañana a las 10:00");
        assert_eq!(first, second);
    }
}
