//! Convenience layer over IMAP and email parsing.
//!
//! Connect, search, and read mail in a handful of calls:
//!
//! ```no_run
//! use mailbird::prelude::*;
//!
//! fn main() -> mailbird::Result<()> {
//!     let mut session = Session::connect("imap.example.com", 993, Encryption::Tls)?;
//!     session.login("gabbo@example.com", "password")?;
//!
//!     let query = Query {
//!         criteria: criteria::compose(&[criteria::unseen(), criteria::from("gabbo")]),
//!         limit: Some(10),
//!         reverse: true,
//!         ..Query::default()
//!     };
//!     let (_uids, messages) = session.query(&query)?;
//!     for message in messages {
//!         let message = message?;
//!         let summary = parse_header_summary(&message, None)?;
//!         println!("{:?}: {:?}", summary.from.address, summary.subject);
//!     }
//!     session.close()
//! }
//! ```

pub mod config;
pub mod error;
pub mod imap;
pub mod message;

pub use error::{Error, Result};

pub mod prelude {
    // Config
    pub use crate::config::AccountConfig;

    // IMAP
    pub use crate::imap::criteria::{self, Criteria};
    pub use crate::imap::fetch_spec::{self, FetchSpec};
    pub use crate::imap::session::{
        open_session, open_session_with, FetchOptions, MailboxNameDecoder, Messages, Query,
        Session,
    };
    pub use crate::imap::transport::{Encryption, ImapTransport, MailboxStatus, Uid};

    // Message
    pub use crate::message::content::{
        extract_attachments, extract_content, Attachment, BodyText, Content, ExtractOptions,
    };
    pub use crate::message::headers::{
        decode_header_value, parse_address_field, parse_header_summary, AddressEntry,
        AddressField, HeaderSummary,
    };
    pub use crate::message::persist::save_raw;

    // Common libs
    pub use crate::error::{Error, Result};
    pub use log::{debug, error, info, trace, warn};
}
