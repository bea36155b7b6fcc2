//! Decoding of fetched messages: header normalization, content and
//! attachment extraction, raw-file backup.
//!
//! All MIME heavy lifting is delegated to `mail-parser`; these modules only
//! walk its output into plain structures.

pub mod content;
pub mod headers;
pub mod persist;

use mail_parser::{Message, MessageParser};

use crate::error::{Error, Result};

/// Parse raw RFC-822 bytes into an owned message structure.
pub fn parse(raw: &[u8]) -> Result<Message<'static>> {
    MessageParser::default()
        .parse(raw)
        .map(Message::into_owned)
        .ok_or_else(|| Error::Parse("raw bytes are not a parseable message".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_raw_bytes() {
        let raw = b"Subject: hi\r\nFrom: a@example.com\r\n\r\nbody\r\n";
        let msg = parse(raw).unwrap();
        assert_eq!(msg.subject(), Some("hi"));
        assert_eq!(msg.raw_message.as_ref(), raw);
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(parse(b"").is_err());
    }
}
