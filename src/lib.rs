//! Client support for the IMAP [UIDPLUS extension](https://tools.ietf.org/html/rfc4315).
//!
//! `UIDPLUS` adds three things to a plain IMAP4rev1 session:
//!
//!  - `UID EXPUNGE`, which permanently removes only the listed `\Deleted` messages,
//!  - the `APPENDUID` and `COPYUID` response codes, which tell the client which UIDs the server
//!    assigned to appended and copied messages,
//!  - the `UIDNOTSTICKY` response code, for mailboxes that do not keep UIDs across sessions.
//!
//! The operations live on the [`UidPlus`](extensions::uidplus::UidPlus) trait. It is
//! implemented for anything that can [`Execute`](client::Execute) IMAP commands, most notably
//! the [`Session`] you get after logging in with a [`Client`].
//!
//! # Usage
//!
//! ```no_run
//! # {} #[cfg(feature = "native-tls")]
//! # fn main() -> imap_uidplus::error::Result<()> {
//! use imap_uidplus::extensions::uidplus::UidPlus;
//!
//! let client = imap_uidplus::ClientBuilder::new("imap.example.com", 993).native_tls()?;
//!
//! // the client we have here is unauthenticated.
//! // to do anything useful with the e-mails, we need to log in
//! let mut session = client
//!     .login("me@example.com", "password")
//!     .map_err(|e| e.0)?;
//!
//! if !session.has_uidplus()? {
//!     eprintln!("the server does not support UIDPLUS");
//!     return Ok(());
//! }
//!
//! // we want to copy messages out of the INBOX
//! session.select("INBOX")?;
//!
//! let copied = session.uid_copy_with_uid(&"42:44".parse()?, "Archive")?;
//! println!(
//!     "copied {:?} to {:?} (UIDVALIDITY {})",
//!     copied.source, copied.destination, copied.uid_validity
//! );
//!
//! // be nice to the server and log out
//! session.logout()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: every line sent and received
//! at `trace` level, commands and state changes at `debug`, and discarded `COPYUID` data at
//! `warn`. Install any logger to see them.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod parse;

pub mod client;
pub mod command;
pub mod error;
pub mod extensions;
pub mod types;

pub use crate::client::*;
pub use crate::error::{Error, Result};
pub use crate::types::*;

mod client_builder;
pub use crate::client_builder::ClientBuilder;

#[cfg(any(feature = "test_helpers", doc))]
pub mod testing;

#[cfg(test)]
mod mock_stream;
