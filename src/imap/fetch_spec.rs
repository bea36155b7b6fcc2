//! IMAP fetch item-set construction.
//!
//! A [`FetchSpec`] selects what a UID FETCH retrieves: the whole message,
//! the header block, a named subset of header fields, or the RFC822 form.
//! `BODY.PEEK` variants are used so fetching does not set `\Seen`.

/// A formatted IMAP fetch item set. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec(String);

impl FetchSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FetchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for FetchSpec {
    /// The whole message (`(BODY.PEEK[])`).
    fn default() -> Self {
        whole_message()
    }
}

/// Header fields fetched by [`header_fields`] when none are named.
pub const DEFAULT_HEADER_FIELDS: &[&str] = &["SUBJECT", "FROM", "DATE", "TO"];

/// The entire message body.
pub fn whole_message() -> FetchSpec {
    FetchSpec("(BODY.PEEK[])".to_string())
}

/// The full header block only.
pub fn header() -> FetchSpec {
    FetchSpec("(BODY.PEEK[HEADER])".to_string())
}

/// A named subset of header fields; the default set is
/// [`DEFAULT_HEADER_FIELDS`] when `fields` is empty.
pub fn header_fields(fields: &[&str]) -> FetchSpec {
    let fields = if fields.is_empty() {
        DEFAULT_HEADER_FIELDS
    } else {
        fields
    };
    FetchSpec(format!("(BODY.PEEK[HEADER.FIELDS ({})])", fields.join(" ")))
}

/// The message in RFC822 form (sets `\Seen` on most servers).
pub fn rfc822() -> FetchSpec {
    FetchSpec("(RFC822)".to_string())
}
