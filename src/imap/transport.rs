//! Typed interface to the wrapped IMAP library.
//!
//! [`ImapTransport`] enumerates exactly the wire operations the session
//! layer needs once authenticated. It is implemented blanket for
//! `imap::Session<T>`, and by mock transports in tests. Connect and login
//! are not trait methods: the wrapped library encodes those transitions in
//! its types (`Client` becomes `Session` on login), which [`PendingLogin`]
//! carries.

use std::io::{Read, Write};
use std::net::TcpStream;

use log::debug;

use crate::error::{Error, Result};

/// Server-assigned message identifier, unique and stable within a selected
/// mailbox. Treated as opaque apart from slicing the most recent N.
pub type Uid = u32;

/// Status of a selected mailbox, as reported by the SELECT response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxStatus {
    pub exists: u32,
    pub recent: u32,
    pub unseen: Option<u32>,
    pub uid_next: Option<Uid>,
    pub uid_validity: Option<u32>,
}

impl From<imap::types::Mailbox> for MailboxStatus {
    fn from(mb: imap::types::Mailbox) -> Self {
        MailboxStatus {
            exists: mb.exists,
            recent: mb.recent,
            unseen: mb.unseen,
            uid_next: mb.uid_next,
            uid_validity: mb.uid_validity,
        }
    }
}

/// The post-login wire operations used by [`Session`](crate::imap::session::Session).
///
/// One implementor owns exactly one connection; every call blocks until the
/// server responds.
pub trait ImapTransport {
    /// SELECT a mailbox by its raw (possibly UTF-7 encoded) name.
    fn select(&mut self, mailbox: &str) -> Result<MailboxStatus>;

    /// UID SEARCH; returns matching UIDs in ascending order.
    fn uid_search(&mut self, query: &str) -> Result<Vec<Uid>>;

    /// UID FETCH of one message; `Ok(None)` when the server returns no data
    /// for the UID (message gone).
    fn uid_fetch_raw(&mut self, uid: Uid, items: &str) -> Result<Option<Vec<u8>>>;

    /// LIST all mailbox names, raw as sent by the server.
    fn list_mailboxes(&mut self) -> Result<Vec<String>>;

    /// CLOSE the selected mailbox.
    fn close(&mut self) -> Result<()>;

    /// LOGOUT and drop the connection.
    fn logout(&mut self) -> Result<()>;
}

impl<T: Read + Write> ImapTransport for imap::Session<T> {
    fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        debug!("SELECT {}", mailbox);
        let mb = imap::Session::select(self, mailbox)?;
        Ok(mb.into())
    }

    fn uid_search(&mut self, query: &str) -> Result<Vec<Uid>> {
        debug!("UID SEARCH {}", query);
        // The wrapped library hands search results back as a set; server
        // order is reconstructed as ascending UID assignment order.
        let mut uids: Vec<Uid> = imap::Session::uid_search(self, query)?.into_iter().collect();
        uids.sort_unstable();
        Ok(uids)
    }

    fn uid_fetch_raw(&mut self, uid: Uid, items: &str) -> Result<Option<Vec<u8>>> {
        debug!("UID FETCH {} {}", uid, items);
        let fetches = imap::Session::uid_fetch(self, uid.to_string(), items)?;
        let data = fetches
            .iter()
            .next()
            .and_then(|f| f.body().or_else(|| f.header()).or_else(|| f.text()))
            .map(|bytes| bytes.to_vec());
        Ok(data)
    }

    fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        debug!("LIST \"\" *");
        let names = imap::Session::list(self, None, Some("*"))?;
        Ok(names.iter().map(|n| n.name().to_string()).collect())
    }

    fn close(&mut self) -> Result<()> {
        debug!("CLOSE");
        imap::Session::close(self)?;
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        debug!("LOGOUT");
        imap::Session::logout(self)?;
        Ok(())
    }
}

/// Whether the connection is wrapped in TLS from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    Tls,
    Plain,
}

/// A connected but not yet authenticated link to the server.
///
/// Logging in consumes it and yields the transport the session uses for all
/// further operations.
pub enum PendingLogin {
    Tls(imap::Client<native_tls::TlsStream<TcpStream>>),
    Plain(imap::Client<TcpStream>),
}

impl PendingLogin {
    /// Open a TCP (and, for [`Encryption::Tls`], TLS) connection to the host.
    pub fn connect(host: &str, port: u16, encryption: Encryption) -> Result<Self> {
        debug!("connecting to {}:{} ({:?})", host, port, encryption);
        match encryption {
            Encryption::Tls => {
                let tls = native_tls::TlsConnector::builder().build()?;
                let client = imap::connect((host, port), host, &tls)?;
                Ok(PendingLogin::Tls(client))
            }
            Encryption::Plain => {
                let client = imap::Client::new(TcpStream::connect((host, port))?);
                Ok(PendingLogin::Plain(client))
            }
        }
    }

    /// LOGIN with the given credentials; rejection maps to [`Error::Auth`]
    /// and hands the still-connected link back so the caller can retry.
    pub fn login(
        self,
        user: &str,
        password: &str,
    ) -> std::result::Result<Box<dyn ImapTransport>, (Error, PendingLogin)> {
        match self {
            PendingLogin::Tls(client) => match client.login(user, password) {
                Ok(session) => Ok(Box::new(session)),
                Err((e, client)) => Err((Error::Auth(e.to_string()), PendingLogin::Tls(client))),
            },
            PendingLogin::Plain(client) => match client.login(user, password) {
                Ok(session) => Ok(Box::new(session)),
                Err((e, client)) => Err((Error::Auth(e.to_string()), PendingLogin::Plain(client))),
            },
        }
    }
}
