//! Adds support for the IMAP UIDPLUS extension specified in [RFC
//! 4315](https://tools.ietf.org/html/rfc4315).
//!
//! `UIDPLUS` lets a client expunge only some of the messages marked `\Deleted` (by UID), and
//! makes the server report the UIDs it assigned to appended and copied messages. The operations
//! are provided by the [`UidPlus`] trait, which is implemented for every [`Execute`]
//! implementation, including [`Session`](crate::Session).
//!
//! ```no_run
//! # {} #[cfg(feature = "native-tls")]
//! # fn main() -> imap_uidplus::error::Result<()> {
//! use imap_uidplus::extensions::uidplus::UidPlus;
//! use std::sync::mpsc;
//!
//! let client = imap_uidplus::ClientBuilder::new("imap.example.com", 993).native_tls()?;
//! let mut session = client.login("me", "secret").map_err(|e| e.0)?;
//! session.select("INBOX")?;
//!
//! let (tx, rx) = mpsc::channel();
//! session.uid_expunge(&"3000:3002".parse()?, Some(tx))?;
//! for seq in rx {
//!     println!("message {} is gone", seq);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::mpsc;

use chrono::{DateTime, FixedOffset};

use crate::client::{Execute, State};
use crate::command::{AppendCommand, Command, CopyCommand, ImapCommand, UidCommand};
use crate::error::{Error, Result};
use crate::types::{Flag, Seq, SequenceSet};

mod code;
mod expunge;

pub use self::code::{
    is_uid_not_sticky, AppendUid, CopyUid, CODE_APPEND_UID, CODE_COPY_UID, CODE_UID_NOT_STICKY,
};
pub use self::expunge::ExpungeCommand;

/// The capability a server advertises when it supports this extension.
pub const CAPABILITY: &str = "UIDPLUS";

// how the messages of a COPY are addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Addressing {
    Sequence,
    Uid,
}

fn copy<E: Execute + ?Sized>(
    session: &mut E,
    addressing: Addressing,
    sequence_set: &SequenceSet,
    mailbox: &str,
) -> Result<CopyUid> {
    if session.state() != State::Selected {
        return Err(Error::NoMailboxSelected);
    }

    let copy = CopyCommand {
        sequence_set: sequence_set.clone(),
        mailbox: mailbox.to_string(),
    };
    let command: Command = match addressing {
        Addressing::Sequence => copy.command(),
        Addressing::Uid => UidCommand(copy).command(),
    };
    log::debug!("{:?} copy of {} to {}", addressing, sequence_set, mailbox);

    let status = session.execute(&command, None)?.into_result()?;
    Ok(CopyUid::decode(&status).unwrap_or_default())
}

/// The operations of the `UIDPLUS` extension.
///
/// None of these check for the [`CAPABILITY`] first; call [`UidPlus::has_uidplus`] if the server
/// may not support it. Without it, `uid_expunge` fails with a `BAD` response and the others
/// succeed without feedback.
pub trait UidPlus: Execute {
    /// Check whether the server advertises `UIDPLUS`.
    fn has_uidplus(&mut self) -> Result<bool> {
        self.has_capability(CAPABILITY)
    }

    /// Permanently remove the messages in `uid_set` that are marked `\Deleted`, leaving other
    /// deleted messages alone.
    ///
    /// The message sequence number of every removed message, as reported by the server's
    /// untagged `EXPUNGE` responses, is sent to `expunged` in the order the server reports
    /// them. The sender is dropped before this returns, whatever the outcome, so a receiver can
    /// simply iterate until the channel closes.
    ///
    /// Requires a selected mailbox.
    fn uid_expunge(
        &mut self,
        uid_set: &SequenceSet,
        expunged: Option<mpsc::Sender<Seq>>,
    ) -> Result<()> {
        if self.state() != State::Selected {
            return Err(Error::NoMailboxSelected);
        }

        let command = UidCommand(ExpungeCommand {
            sequence_set: uid_set.clone(),
        })
        .command();
        log::debug!("expunging UIDs {}", uid_set);

        self.execute(&command, expunged.as_ref())?.into_result()?;
        Ok(())
    }

    /// Append a message to `mailbox` and return the UID the server gave it.
    ///
    /// If the server sends no (or a malformed) `APPENDUID` code, a zeroed [`AppendUid`] is
    /// returned.
    fn append_with_uid(
        &mut self,
        mailbox: &str,
        flags: &[Flag<'_>],
        date: Option<DateTime<FixedOffset>>,
        content: &[u8],
    ) -> Result<AppendUid> {
        if !self.state().is_authenticated() {
            return Err(Error::NotLoggedIn);
        }

        let command = AppendCommand {
            mailbox,
            flags,
            date,
            content,
        }
        .command();
        log::debug!("appending {} bytes to {}", content.len(), mailbox);

        let status = self.execute(&command, None)?.into_result()?;
        Ok(AppendUid::decode(&status).unwrap_or_default())
    }

    /// Copy the messages with the given sequence numbers to `mailbox` and return the UIDs of the
    /// originals and the copies.
    fn copy_with_uid(&mut self, sequence_set: &SequenceSet, mailbox: &str) -> Result<CopyUid> {
        copy(self, Addressing::Sequence, sequence_set, mailbox)
    }

    /// Like [`UidPlus::copy_with_uid`], but the messages are given by UID.
    fn uid_copy_with_uid(&mut self, uid_set: &SequenceSet, mailbox: &str) -> Result<CopyUid> {
        copy(self, Addressing::Uid, uid_set, mailbox)
    }
}

impl<E: Execute + ?Sized> UidPlus for E {}
