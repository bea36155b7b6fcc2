//! One authenticated connection to one mailbox.
//!
//! A [`Session`] moves through Connected → Authenticated/MailboxSelected →
//! Closed; all wire activity is delegated to the [`ImapTransport`]
//! collaborator. The session is synchronous and not thread-safe: callers
//! serialize access through `&mut Session`, and every operation blocks
//! until the server responds.

use log::{debug, info, warn};
use mail_parser::Message;

use crate::config::AccountConfig;
use crate::error::{Error, Result};
use crate::imap::criteria::Criteria;
use crate::imap::fetch_spec::{self, FetchSpec};
use crate::imap::transport::{ImapTransport, MailboxStatus, PendingLogin, Uid};
use crate::message;

/// The mailbox selected right after login.
pub const DEFAULT_MAILBOX: &str = "INBOX";

/// Decodes raw mailbox names (typically modified UTF-7) for display.
///
/// Injected capability with an identity default; servers hand back raw names
/// and [`Session::list_mailboxes`] applies the decoder on request.
pub trait MailboxNameDecoder {
    fn decode(&self, raw: &str) -> String;
}

/// Default decoder: returns names unchanged.
pub struct IdentityDecoder;

impl MailboxNameDecoder for IdentityDecoder {
    fn decode(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// What a UID fetch retrieves.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Item set to request; the whole message when unset.
    pub spec: FetchSpec,
    /// When set, only the header block is fetched and `spec` is ignored.
    pub header_only: bool,
}

impl FetchOptions {
    fn items(&self) -> FetchSpec {
        if self.header_only {
            fetch_spec::header()
        } else {
            self.spec.clone()
        }
    }
}

/// A search-then-fetch request for [`Session::query`].
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Search criteria; `(ALL)` when unset.
    pub criteria: Criteria,
    /// Keep only the most recent `limit` UIDs (tail of server order).
    pub limit: Option<usize>,
    /// Reverse the kept UID order.
    pub reverse: bool,
    /// Fetch options applied to each message.
    pub fetch: FetchOptions,
}

enum Link {
    /// Connected, not yet authenticated.
    Connected(PendingLogin),
    /// Authenticated; `mailbox` is the selected mailbox name, if any.
    Active {
        transport: Box<dyn ImapTransport>,
        mailbox: Option<String>,
    },
    Closed,
}

/// One connection to one IMAP account.
pub struct Session {
    link: Link,
    name_decoder: Box<dyn MailboxNameDecoder>,
}

impl Session {
    /// Open a connection to `host:port`. Fails with [`Error::Connection`]
    /// (or [`Error::Tls`]) when the transport cannot be established.
    pub fn connect(
        host: &str,
        port: u16,
        encryption: crate::imap::transport::Encryption,
    ) -> Result<Self> {
        let pending = PendingLogin::connect(host, port, encryption)?;
        info!("connected to {}:{}", host, port);
        Ok(Session {
            link: Link::Connected(pending),
            name_decoder: Box::new(IdentityDecoder),
        })
    }

    /// Build a session over an already-authenticated transport.
    ///
    /// No mailbox is selected; call [`Session::select_mailbox`] first.
    pub fn with_transport(transport: Box<dyn ImapTransport>) -> Self {
        Session {
            link: Link::Active {
                transport,
                mailbox: None,
            },
            name_decoder: Box::new(IdentityDecoder),
        }
    }

    /// Replace the mailbox-name decoder used by [`Session::list_mailboxes`].
    pub fn set_mailbox_name_decoder(&mut self, decoder: Box<dyn MailboxNameDecoder>) {
        self.name_decoder = decoder;
    }

    /// Authenticate and select the default mailbox.
    ///
    /// Returns the SELECT status of [`DEFAULT_MAILBOX`]. Rejected
    /// credentials surface as [`Error::Auth`] and leave the session
    /// connected, so login can be retried.
    pub fn login(&mut self, user: &str, password: &str) -> Result<MailboxStatus> {
        match std::mem::replace(&mut self.link, Link::Closed) {
            Link::Connected(pending) => match pending.login(user, password) {
                Ok(mut transport) => {
                    info!("logged in as {}", user);
                    let status = transport.select(DEFAULT_MAILBOX)?;
                    self.link = Link::Active {
                        transport,
                        mailbox: Some(DEFAULT_MAILBOX.to_string()),
                    };
                    Ok(status)
                }
                Err((e, pending)) => {
                    self.link = Link::Connected(pending);
                    Err(e)
                }
            },
            other => {
                self.link = other;
                Err(Error::Session("login requires a connected session".into()))
            }
        }
    }

    /// Select a different mailbox by its raw (possibly UTF-7 encoded) name.
    pub fn select_mailbox(&mut self, name: &str) -> Result<MailboxStatus> {
        let (transport, mailbox) = self.active_mut()?;
        let status = transport.select(name)?;
        *mailbox = Some(name.to_string());
        Ok(status)
    }

    /// List mailbox names; `decode` runs each through the injected
    /// [`MailboxNameDecoder`].
    pub fn list_mailboxes(&mut self, decode: bool) -> Result<Vec<String>> {
        let (transport, _) = self.active_mut()?;
        let names = transport.list_mailboxes()?;
        if decode {
            Ok(names.iter().map(|n| self.name_decoder.decode(n)).collect())
        } else {
            Ok(names)
        }
    }

    /// UID SEARCH with the given criteria; UIDs come back in server order
    /// (ascending assignment), unaltered.
    pub fn search_uids(&mut self, criteria: &Criteria) -> Result<Vec<Uid>> {
        let (transport, _) = self.selected_mut()?;
        transport.uid_search(criteria.as_str())
    }

    /// UID FETCH one message and parse it.
    ///
    /// A UID the server no longer knows (deleted concurrently) surfaces as
    /// [`Error::Fetch`], never as an empty-result panic.
    pub fn fetch_by_uid(&mut self, uid: Uid, fetch: &FetchOptions) -> Result<Message<'static>> {
        let raw = self.fetch_raw_by_uid(uid, fetch)?;
        message::parse(&raw)
    }

    /// UID FETCH one message, returning the raw bytes unparsed.
    pub fn fetch_raw_by_uid(&mut self, uid: Uid, fetch: &FetchOptions) -> Result<Vec<u8>> {
        let items = fetch.items();
        let (transport, _) = self.selected_mut()?;
        transport
            .uid_fetch_raw(uid, items.as_str())?
            .ok_or_else(|| Error::Fetch(format!("UID {} not found", uid)))
    }

    /// Search, keep the most recent `limit` UIDs, and return them together
    /// with a lazy message sequence.
    ///
    /// The returned [`Messages`] iterator is single-pass and non-restartable:
    /// each pull performs exactly one fetch round-trip, so abandoning
    /// iteration early issues fewer fetches and large result sets are never
    /// held in memory at once.
    pub fn query(&mut self, query: &Query) -> Result<(Vec<Uid>, Messages<'_>)> {
        let mut uids = self.search_uids(&query.criteria)?;
        if let Some(limit) = query.limit {
            if uids.len() > limit {
                uids = uids.split_off(uids.len() - limit);
            }
        }
        if query.reverse {
            uids.reverse();
        }
        debug!("query matched {} message(s)", uids.len());
        let messages = Messages {
            session: self,
            uids: uids.clone().into_iter(),
            fetch: query.fetch.clone(),
        };
        Ok((uids, messages))
    }

    /// CLOSE the selected mailbox, then LOGOUT.
    ///
    /// Safe to call at most once; a second call (or a call on a session that
    /// never authenticated) fails with [`Error::Session`] instead of
    /// tripping over the underlying transport. A never-authenticated session
    /// stays connected, so login can still follow.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.link, Link::Closed) {
            Link::Active {
                mut transport,
                mailbox,
            } => {
                let closed = if mailbox.is_some() {
                    transport.close()
                } else {
                    Ok(())
                };
                let logged_out = transport.logout();
                closed?;
                logged_out?;
                info!("session closed");
                Ok(())
            }
            Link::Connected(pending) => {
                self.link = Link::Connected(pending);
                Err(Error::Session("not logged in".into()))
            }
            Link::Closed => Err(Error::Session("session already closed".into())),
        }
    }

    fn active_mut(&mut self) -> Result<(&mut Box<dyn ImapTransport>, &mut Option<String>)> {
        match &mut self.link {
            Link::Active { transport, mailbox } => Ok((transport, mailbox)),
            Link::Connected(_) => Err(Error::Session("not logged in".into())),
            Link::Closed => Err(Error::Session("session is closed".into())),
        }
    }

    fn selected_mut(&mut self) -> Result<(&mut Box<dyn ImapTransport>, &str)> {
        match &mut self.link {
            Link::Active {
                transport,
                mailbox: Some(name),
            } => Ok((transport, name.as_str())),
            Link::Active { mailbox: None, .. } => {
                Err(Error::Session("no mailbox selected".into()))
            }
            Link::Connected(_) => Err(Error::Session("not logged in".into())),
            Link::Closed => Err(Error::Session("session is closed".into())),
        }
    }
}

impl Drop for Session {
    /// Best-effort teardown so the scoped-acquisition pattern holds on
    /// early-exit paths. Explicit [`Session::close`] is still preferred.
    fn drop(&mut self) {
        if let Link::Active { transport, mailbox } = &mut self.link {
            if mailbox.is_some() {
                let _ = transport.close();
            }
            if let Err(e) = transport.logout() {
                warn!("logout during drop failed: {}", e);
            }
        }
    }
}

/// Lazy, pull-driven message sequence produced by [`Session::query`].
///
/// Single consumer, single pass, not restartable; each `next` issues one
/// UID fetch round-trip on the borrowed session.
pub struct Messages<'a> {
    session: &'a mut Session,
    uids: std::vec::IntoIter<Uid>,
    fetch: FetchOptions,
}

impl Iterator for Messages<'_> {
    type Item = Result<Message<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        let uid = self.uids.next()?;
        Some(self.session.fetch_by_uid(uid, &self.fetch))
    }
}

/// Decodes a stored password before it is sent to the server.
pub type PasswordDecoder = dyn Fn(&str) -> String;

/// Connect and log in with the account's credentials; the original entry
/// point for callers holding an [`AccountConfig`].
pub fn open_session(account: &AccountConfig) -> Result<(Session, MailboxStatus)> {
    open_session_with(account, None)
}

/// Like [`open_session`], with a decoder hook applied to the stored
/// password before login (for credentials kept encoded at rest).
pub fn open_session_with(
    account: &AccountConfig,
    password_decoder: Option<&PasswordDecoder>,
) -> Result<(Session, MailboxStatus)> {
    let mut session = Session::connect(&account.host, account.port, account.encryption)?;
    let password = match password_decoder {
        Some(decode) => decode(&account.password),
        None => account.password.clone(),
    };
    let status = session.login(&account.user, &password)?;
    Ok((session, status))
}
