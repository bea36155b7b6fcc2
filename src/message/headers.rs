//! Header and address normalization.
//!
//! RFC 2047 encoded-words are resolved through the parsing library's own
//! decoder; decoding never fails — undecodable byte sequences come back as
//! replacement characters instead of errors.

use mail_parser::{Address, Message, MessageParser};

use crate::error::{Error, Result};

/// One entry of an address-list header: decoded display name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressEntry {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// The address-list headers a message can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    From,
    To,
    Cc,
    Bcc,
    ReplyTo,
    Sender,
}

impl AddressField {
    fn name(self) -> &'static str {
        match self {
            AddressField::From => "from",
            AddressField::To => "to",
            AddressField::Cc => "cc",
            AddressField::Bcc => "bcc",
            AddressField::ReplyTo => "reply-to",
            AddressField::Sender => "sender",
        }
    }
}

/// Decoded subject, date and key address fields of one message.
#[derive(Debug, Clone)]
pub struct HeaderSummary {
    pub subject: Option<String>,
    /// Wall-clock date as written in the header, offset discarded.
    pub date: Option<chrono::NaiveDateTime>,
    /// `date` rendered with the caller's format string, when one was given.
    pub date_text: Option<String>,
    /// First entry of the From header.
    pub from: AddressEntry,
    /// Full To sequence; `None` when the header is absent.
    pub to: Option<Vec<AddressEntry>>,
}

/// Resolve every RFC 2047 encoded-word in a raw header value.
///
/// Values without an encoded-word marker pass through unchanged. The result
/// never contains `=?…?=` markers; segments in an unknown charset degrade
/// to replacement characters.
pub fn decode_header_value(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.to_string();
    }
    // Wrap the value in a synthetic header so the parser's RFC 2047
    // decoder can be reused as-is.
    let synthetic = format!("Subject: {}\r\n\r\n", raw);
    MessageParser::default()
        .parse(synthetic.as_bytes())
        .and_then(|m| m.subject().map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

/// Parse an address-list header into decoded (name, address) entries.
///
/// Returns `None` when the header is absent from the message — distinct
/// from `Some(vec![])`, a header that is present but names nobody.
pub fn parse_address_field(msg: &Message<'_>, field: AddressField) -> Option<Vec<AddressEntry>> {
    let header: &Address<'_> = match field {
        AddressField::From => msg.from()?,
        AddressField::To => msg.to()?,
        AddressField::Cc => msg.cc()?,
        AddressField::Bcc => msg.bcc()?,
        AddressField::ReplyTo => msg.reply_to()?,
        AddressField::Sender => msg.sender()?,
    };
    Some(
        header
            .iter()
            .map(|addr| AddressEntry {
                name: addr.name().map(str::to_string),
                address: addr.address().map(str::to_string),
            })
            .collect(),
    )
}

/// Decode subject, date, the first From entry and the To sequence.
///
/// An absent (or empty) From header is an explicit [`Error::MissingHeader`],
/// never an out-of-bounds access.
pub fn parse_header_summary(
    msg: &Message<'_>,
    date_format: Option<&str>,
) -> Result<HeaderSummary> {
    let from = parse_address_field(msg, AddressField::From)
        .and_then(|entries| entries.into_iter().next())
        .ok_or_else(|| Error::MissingHeader(AddressField::From.name().to_string()))?;

    let date = msg.date().and_then(|d| {
        chrono::NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
            .and_then(|nd| {
                nd.and_hms_opt(u32::from(d.hour), u32::from(d.minute), u32::from(d.second))
            })
    });
    let date_text = match (date, date_format) {
        (Some(d), Some(fmt)) => Some(d.format(fmt).to_string()),
        _ => None,
    };

    Ok(HeaderSummary {
        subject: msg.subject().map(str::to_string),
        date,
        date_text,
        from,
        to: parse_address_field(msg, AddressField::To),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::parse;

    fn sample(raw: &[u8]) -> Message<'static> {
        parse(raw).unwrap()
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(decode_header_value("hello world"), "hello world");
    }

    #[test]
    fn encoded_words_are_resolved() {
        let decoded = decode_header_value("=?utf-8?B?SMOpbGxv?= there");
        assert_eq!(decoded, "Héllo there");
        assert!(!decoded.contains("=?"));
    }

    #[test]
    fn multi_segment_encoded_words_concatenate() {
        let decoded = decode_header_value("=?iso-8859-1?Q?Andr=E9?= =?iso-8859-1?Q?_Pirard?=");
        assert!(!decoded.contains("=?"));
        assert!(decoded.starts_with("André"));
    }

    #[test]
    fn absent_field_is_none_not_empty() {
        let msg = sample(b"From: a@example.com\r\nSubject: x\r\n\r\nbody\r\n");
        assert!(parse_address_field(&msg, AddressField::Cc).is_none());
    }

    #[test]
    fn address_entries_carry_decoded_names() {
        let msg = sample(
            b"From: =?utf-8?B?SsO8cmdlbg==?= <j@example.com>\r\nTo: b@example.com\r\n\r\nx\r\n",
        );
        let from = parse_address_field(&msg, AddressField::From).unwrap();
        assert_eq!(from.len(), 1);
        assert_eq!(from[0].name.as_deref(), Some("Jürgen"));
        assert_eq!(from[0].address.as_deref(), Some("j@example.com"));
    }

    #[test]
    fn summary_collects_subject_from_to_date() {
        let msg = sample(
            b"From: Alice <alice@example.com>\r\nTo: bob@example.com, carol@example.com\r\n\
Subject: status\r\nDate: Tue, 5 Mar 2024 14:30:00 +0000\r\n\r\nbody\r\n",
        );
        let summary = parse_header_summary(&msg, Some("%Y-%m-%d %H:%M")).unwrap();
        assert_eq!(summary.subject.as_deref(), Some("status"));
        assert_eq!(summary.from.address.as_deref(), Some("alice@example.com"));
        assert_eq!(summary.to.as_ref().map(Vec::len), Some(2));
        assert_eq!(summary.date_text.as_deref(), Some("2024-03-05 14:30"));
    }

    #[test]
    fn summary_without_from_is_missing_header() {
        let msg = sample(b"To: bob@example.com\r\nSubject: x\r\n\r\nbody\r\n");
        let err = parse_header_summary(&msg, None).unwrap_err();
        assert!(matches!(err, Error::MissingHeader(ref h) if h == "from"));
    }
}
