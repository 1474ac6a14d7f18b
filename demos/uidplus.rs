use imap_uidplus::extensions::uidplus::UidPlus;
use imap_uidplus::{Flag, SequenceSet};
use std::sync::mpsc;

fn main() {
    // To connect to the gmail IMAP server with this you will need to allow unsecure apps access.
    // See: https://support.google.com/accounts/answer/6010255?hl=en
    let client = imap_uidplus::ClientBuilder::new("imap.gmail.com", 993)
        .native_tls()
        .expect("Could not connect to imap.gmail.com");

    let mut session = client
        .login("username", "password")
        .map_err(|e| e.0)
        .expect("Could not log in");

    match session.has_uidplus() {
        Ok(true) => {}
        Ok(false) => {
            println!("Server does not support UIDPLUS");
            return;
        }
        Err(e) => panic!("Error retrieving capabilities: {}", e),
    }

    let draft = b"From: me@example.com\r\nSubject: uidplus demo\r\n\r\nHello!\r\n";
    let appended = session
        .append_with_uid("INBOX", &[Flag::Draft, Flag::Deleted], None, draft)
        .expect("Error appending");
    println!(
        "appended as UID {} (UIDVALIDITY {})",
        appended.uid, appended.uid_validity
    );

    match session.select("INBOX") {
        Ok(mailbox) => println!("{}", mailbox),
        Err(e) => panic!("Error selecting INBOX: {}", e),
    };

    let uid = SequenceSet::try_from(appended.uid).expect("UIDs are never zero");
    match session.uid_copy_with_uid(&uid, "INBOX") {
        Ok(copied) => println!("{:?} copied to {:?}", copied.source, copied.destination),
        Err(e) => println!("Error copying: {}", e),
    }

    // only the appended message goes away, other \Deleted messages stay
    let (tx, rx) = mpsc::channel();
    session.uid_expunge(&uid, Some(tx)).expect("Error expunging");
    for seq in rx {
        println!("expunged message {}", seq);
    }

    session.logout().unwrap();
}
