//! Implementations of various IMAP extensions.
pub mod uidplus;
