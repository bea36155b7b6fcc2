//! IMAP search-criteria construction.
//!
//! Each builder returns an opaque [`Criteria`] token in IMAP search-key
//! syntax, e.g. `(FROM "gabbo")`. Several criteria are combined into one
//! query with [`compose`].
//!
//! Caller-supplied values are substituted verbatim: embedded `"` characters
//! are not escaped. This is an inherited limitation, kept as-is.

use chrono::NaiveDate;

/// A formatted IMAP search criterion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria(String);

impl Criteria {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for Criteria {
    /// Matches every message (`(ALL)`).
    fn default() -> Self {
        all()
    }
}

/// Messages whose FROM field contains `address`.
pub fn from(address: &str) -> Criteria {
    Criteria(format!("(FROM \"{}\")", address))
}

/// Messages whose TO field contains `address`.
pub fn to(address: &str) -> Criteria {
    Criteria(format!("(TO \"{}\")", address))
}

/// Messages whose SUBJECT field contains `text`.
pub fn subject(text: &str) -> Criteria {
    Criteria(format!("(SUBJECT \"{}\")", text))
}

/// Messages whose internal date is on or after `date`.
pub fn since(date: NaiveDate) -> Criteria {
    Criteria(format!("(SINCE \"{}\")", date.format(IMAP_DATE_FMT)))
}

/// Messages whose internal date is before `date`.
pub fn before(date: NaiveDate) -> Criteria {
    Criteria(format!("(BEFORE \"{}\")", date.format(IMAP_DATE_FMT)))
}

/// Messages without the `\Seen` flag.
pub fn unseen() -> Criteria {
    Criteria("(UNSEEN)".to_string())
}

/// Every message in the mailbox.
pub fn all() -> Criteria {
    Criteria("(ALL)".to_string())
}

/// Join several criteria into a single search query, space-separated.
/// An empty slice yields an empty query.
pub fn compose(criteria: &[Criteria]) -> Criteria {
    let joined = criteria
        .iter()
        .map(Criteria::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    Criteria(joined)
}

/// IMAP date-text, e.g. `05-Mar-2024`.
const IMAP_DATE_FMT: &str = "%d-%b-%Y";
