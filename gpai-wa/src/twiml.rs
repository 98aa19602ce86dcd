//! Minimal TwiML messaging responses
//!
//! The webhook answers inbound messages inline with a TwiML document;
//! one `<Message>` element per outbound message, in order.

/// Render an ordered list of messages as a TwiML messaging response.
pub fn messaging_response(messages: &[String]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
    for message in messages {
        xml.push_str("<Message>");
        xml.push_str(&escape_xml(message));
        xml.push_str("</Message>");
    }
    xml.push_str("</Response>");
    xml
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_messages_in_order() {
        let xml = messaging_response(&["first".to_string(), "second".to_string()]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>first</Message><Message>second</Message></Response>"
        );
    }

    #[test]
    fn empty_reply_is_valid_response() {
        assert_eq!(
            messaging_response(&[]),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>"
        );
    }

    #[test]
    fn escapes_markup() {
        let xml = messaging_response(&["a < b & \"c\"".to_string()]);
        assert!(xml.contains("a &lt; b &amp; &quot;c&quot;"));
    }
}
