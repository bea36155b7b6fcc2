use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::imap::criteria;
use crate::imap::session::{FetchOptions, MailboxNameDecoder, Query, Session};
use crate::imap::transport::{ImapTransport, MailboxStatus, Uid};

/// Records every wire call a session issues.
#[derive(Debug, Default)]
struct CallLog {
    selected: Vec<String>,
    searches: Vec<String>,
    fetches: Vec<(Uid, String)>,
    closed: u32,
    logged_out: u32,
}

/// In-memory transport: a fixed mailbox of UID → raw message bytes.
struct MockTransport {
    uids: Vec<Uid>,
    messages: HashMap<Uid, Vec<u8>>,
    log: Rc<RefCell<CallLog>>,
}

impl MockTransport {
    fn with_uids(uids: &[Uid]) -> (Self, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let messages = uids
            .iter()
            .map(|&uid| {
                let raw = format!(
                    "From: m{uid}@example.com\r\nSubject: message {uid}\r\n\r\nbody {uid}\r\n"
                );
                (uid, raw.into_bytes())
            })
            .collect();
        (
            MockTransport {
                uids: uids.to_vec(),
                messages,
                log: log.clone(),
            },
            log,
        )
    }
}

impl ImapTransport for MockTransport {
    fn select(&mut self, mailbox: &str) -> crate::error::Result<MailboxStatus> {
        self.log.borrow_mut().selected.push(mailbox.to_string());
        Ok(MailboxStatus {
            exists: self.uids.len() as u32,
            recent: 0,
            unseen: None,
            uid_next: self.uids.iter().max().map(|&u| u + 1),
            uid_validity: Some(1),
        })
    }

    fn uid_search(&mut self, query: &str) -> crate::error::Result<Vec<Uid>> {
        self.log.borrow_mut().searches.push(query.to_string());
        Ok(self.uids.clone())
    }

    fn uid_fetch_raw(&mut self, uid: Uid, items: &str) -> crate::error::Result<Option<Vec<u8>>> {
        self.log.borrow_mut().fetches.push((uid, items.to_string()));
        Ok(self.messages.get(&uid).cloned())
    }

    fn list_mailboxes(&mut self) -> crate::error::Result<Vec<String>> {
        Ok(vec!["INBOX".to_string(), "Sp&AOQ-m".to_string()])
    }

    fn close(&mut self) -> crate::error::Result<()> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }

    fn logout(&mut self) -> crate::error::Result<()> {
        self.log.borrow_mut().logged_out += 1;
        Ok(())
    }
}

fn selected_session(uids: &[Uid]) -> (Session, Rc<RefCell<CallLog>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (transport, log) = MockTransport::with_uids(uids);
    let mut session = Session::with_transport(Box::new(transport));
    session.select_mailbox("INBOX").unwrap();
    (session, log)
}

#[test]
fn query_keeps_most_recent_uids() {
    let (mut session, _log) = selected_session(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    let query = Query {
        limit: Some(3),
        ..Query::default()
    };
    let (uids, _messages) = session.query(&query).unwrap();
    assert_eq!(uids, vec![8, 9, 10]);
}

#[test]
fn query_reverse_flips_kept_order() {
    let (mut session, _log) = selected_session(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    let query = Query {
        limit: Some(3),
        reverse: true,
        ..Query::default()
    };
    let (uids, _messages) = session.query(&query).unwrap();
    assert_eq!(uids, vec![10, 9, 8]);
}

#[test]
fn message_sequence_fetches_lazily() {
    let (mut session, log) = selected_session(&[1, 2, 3]);
    let (uids, mut messages) = session.query(&Query::default()).unwrap();
    assert_eq!(uids.len(), 3);
    assert!(log.borrow().fetches.is_empty());

    let first = messages.next().unwrap().unwrap();
    assert_eq!(first.subject(), Some("message 1"));
    assert_eq!(log.borrow().fetches.len(), 1);

    // Abandoning the iterator here issues no further fetches.
    drop(messages);
    assert_eq!(log.borrow().fetches.len(), 1);
}

#[test]
fn fetch_of_vanished_uid_is_fetch_error() {
    let (mut session, _log) = selected_session(&[1, 2]);
    let err = session
        .fetch_by_uid(99, &FetchOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
}

#[test]
fn header_only_overrides_fetch_spec() {
    let (mut session, log) = selected_session(&[7]);
    let options = FetchOptions {
        spec: crate::imap::fetch_spec::rfc822(),
        header_only: true,
    };
    session.fetch_raw_by_uid(7, &options).unwrap();
    assert_eq!(log.borrow().fetches[0].1, "(BODY.PEEK[HEADER])");
}

#[test]
fn search_forwards_criteria_string() {
    let (mut session, log) = selected_session(&[1]);
    session
        .search_uids(&criteria::compose(&[criteria::unseen(), criteria::from("gabbo")]))
        .unwrap();
    assert_eq!(log.borrow().searches[0], "(UNSEEN) (FROM \"gabbo\")");
}

#[test]
fn operations_require_a_selected_mailbox() {
    let (transport, _log) = MockTransport::with_uids(&[1]);
    let mut session = Session::with_transport(Box::new(transport));
    let err = session.search_uids(&criteria::all()).unwrap_err();
    assert!(matches!(err, Error::Session(_)));
}

#[test]
fn close_issues_close_then_logout_once() {
    let (mut session, log) = selected_session(&[1]);
    session.close().unwrap();
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(log.borrow().logged_out, 1);

    let err = session.close().unwrap_err();
    assert!(matches!(err, Error::Session(_)));
    // The failed second close must not reach the transport.
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(log.borrow().logged_out, 1);
}

#[test]
fn drop_tears_the_session_down() {
    let (session, log) = selected_session(&[1]);
    drop(session);
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(log.borrow().logged_out, 1);
}

#[test]
fn mailbox_names_pass_through_injected_decoder() {
    struct Upper;
    impl MailboxNameDecoder for Upper {
        fn decode(&self, raw: &str) -> String {
            raw.to_uppercase()
        }
    }

    let (mut session, _log) = selected_session(&[1]);
    assert_eq!(
        session.list_mailboxes(false).unwrap(),
        vec!["INBOX".to_string(), "Sp&AOQ-m".to_string()]
    );

    session.set_mailbox_name_decoder(Box::new(Upper));
    assert_eq!(
        session.list_mailboxes(true).unwrap(),
        vec!["INBOX".to_string(), "SP&AOQ-M".to_string()]
    );
}
