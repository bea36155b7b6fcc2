pub mod criteria;
pub mod fetch_spec;
pub mod session;
pub mod transport;

#[cfg(test)]
mod session_test;

pub use criteria::Criteria;
pub use fetch_spec::FetchSpec;
pub use session::{open_session, open_session_with, FetchOptions, Messages, Query, Session};
pub use transport::{Encryption, ImapTransport, MailboxStatus, Uid};
