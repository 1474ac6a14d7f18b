//! Tests against a live IMAP server, such as GreenMail:
//!
//! ```text
//! docker run -p 3993:3993 -e GREENMAIL_OPTS='-Dgreenmail.setup.test.all \
//!     -Dgreenmail.hostname=0.0.0.0 -Dgreenmail.auth.disabled' greenmail/standalone
//! cargo test --features test-full-imap
//! ```
#![cfg(feature = "test-full-imap")]

use chrono::{FixedOffset, TimeZone};
use std::net::TcpStream;
use std::sync::mpsc;

use imap_uidplus::extensions::uidplus::UidPlus;
use imap_uidplus::types::SequenceSet;
use imap_uidplus::{Execute, Flag, Session, State};

fn tls() -> native_tls::TlsConnector {
    native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .unwrap()
}

fn test_host() -> String {
    std::env::var("TEST_HOST").unwrap_or("127.0.0.1".to_string())
}

fn test_imaps_port() -> u16 {
    std::env::var("TEST_IMAPS_PORT")
        .unwrap_or("3993".to_string())
        .parse()
        .unwrap_or(3993)
}

fn session(user: &str) -> Session<native_tls::TlsStream<TcpStream>> {
    let host = test_host();
    imap_uidplus::ClientBuilder::new(&host, test_imaps_port())
        .connect(|domain, tcp| {
            let ssl_conn = tls();
            Ok(native_tls::TlsConnector::connect(&ssl_conn, domain, tcp).unwrap())
        })
        .unwrap()
        .login(user, user)
        .map_err(|(e, _)| e)
        .unwrap()
}

fn message(subject: &str) -> Vec<u8> {
    format!(
        "From: sender@localhost\r\nTo: uidplus@localhost\r\nSubject: {}\r\n\r\nHello\r\n",
        subject
    )
    .into_bytes()
}

fn uid(n: u32) -> SequenceSet {
    SequenceSet::try_from(n).unwrap()
}

#[test]
fn advertises_uidplus() {
    let mut s = session("uidplus-caps@localhost");
    assert!(s.has_uidplus().unwrap());
    s.logout().unwrap();
    assert_eq!(s.state(), State::Logout);
}

#[test]
fn append_reports_uid() {
    let mut s = session("uidplus-append@localhost");
    let date = FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2020, 12, 13, 13, 36, 36)
        .unwrap();
    let first = s
        .append_with_uid("INBOX", &[Flag::Seen], Some(date), &message("one"))
        .unwrap();
    let second = s
        .append_with_uid("INBOX", &[], None, &message("two"))
        .unwrap();
    assert_ne!(first.uid_validity, 0);
    assert_eq!(first.uid_validity, second.uid_validity);
    assert!(second.uid > first.uid);

    let mailbox = s.select("INBOX").unwrap();
    assert_eq!(mailbox.uid_validity, Some(first.uid_validity));
    assert!(mailbox.uid_next.unwrap() > second.uid);
}

#[test]
fn copy_reports_uids() {
    let mut s = session("uidplus-copy@localhost");
    let appended = s
        .append_with_uid("INBOX", &[], None, &message("copy me"))
        .unwrap();
    s.select("INBOX").unwrap();

    let copied = s.uid_copy_with_uid(&uid(appended.uid), "INBOX").unwrap();
    assert_eq!(copied.uid_validity, appended.uid_validity);
    assert_eq!(copied.source, Some(uid(appended.uid)));
    let destination = copied.destination.unwrap();
    assert_eq!(destination.len(), 1);
    assert!(!destination.contains(appended.uid));
}

#[test]
fn uid_expunge_removes_only_listed() {
    let mut s = session("uidplus-expunge@localhost");
    let keep = s
        .append_with_uid("INBOX", &[Flag::Deleted], None, &message("keep"))
        .unwrap();
    let remove = s
        .append_with_uid("INBOX", &[Flag::Deleted], None, &message("remove"))
        .unwrap();
    let before = s.select("INBOX").unwrap().exists;

    let (tx, rx) = mpsc::channel();
    s.uid_expunge(&uid(remove.uid), Some(tx)).unwrap();
    assert_eq!(rx.iter().count(), 1);

    let after = s.select("INBOX").unwrap().exists;
    assert_eq!(after, before - 1);

    // the other deleted message is still there
    let (tx, rx) = mpsc::channel();
    s.uid_expunge(&uid(keep.uid), Some(tx)).unwrap();
    assert_eq!(rx.iter().count(), 1);
}
