//! IMAP error types.

use std::io::Error as IoError;
use std::result;

#[cfg(feature = "native-tls")]
use native_tls::Error as TlsError;
#[cfg(feature = "native-tls")]
use native_tls::HandshakeError as TlsHandshakeError;
#[cfg(feature = "native-tls")]
use std::net::TcpStream;

use bufstream::IntoInnerError as BufError;

use crate::types::StatusResponse;

/// A convenience wrapper around `Result` for `imap_uidplus::Error`.
pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur in the IMAP client
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An `io::Error` that occurred while trying to read or write to a network stream.
    #[error(transparent)]
    Io(#[from] IoError),
    /// An error from the `native_tls` library during the TLS handshake.
    #[cfg(feature = "native-tls")]
    #[error(transparent)]
    TlsHandshake(#[from] TlsHandshakeError<TcpStream>),
    /// An error from the `native_tls` library while managing the socket.
    #[cfg(feature = "native-tls")]
    #[error(transparent)]
    Tls(#[from] TlsError),
    /// A BAD response from the IMAP server.
    #[error("Bad Response: {}", .0.information.as_deref().unwrap_or("no explanation given"))]
    Bad(StatusResponse),
    /// A NO response from the IMAP server.
    #[error("No Response: {}", .0.information.as_deref().unwrap_or("no explanation given"))]
    No(StatusResponse),
    /// The connection was terminated unexpectedly.
    #[error("Connection Lost")]
    ConnectionLost,
    /// Error parsing a server response or command arguments.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Command inputs were not valid [IMAP
    /// strings](https://tools.ietf.org/html/rfc3501#section-4.3).
    #[error(transparent)]
    Validate(#[from] ValidateError),
    /// The operation requires an authenticated session.
    #[error("Not logged in")]
    NotLoggedIn,
    /// The operation requires a selected mailbox.
    #[error("No mailbox selected")]
    NoMailboxSelected,
}

impl<T> From<BufError<T>> for Error {
    fn from(err: BufError<T>) -> Error {
        Error::Io(err.into())
    }
}

/// An error occured while trying to parse a server response or a command.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Indicates an error parsing the status response. Such as OK, NO, and BAD.
    #[error("Unable to parse status response: {}", String::from_utf8_lossy(.0))]
    Invalid(Vec<u8>),
    /// A command was parsed from fewer fields than it requires.
    #[error("Not enough arguments")]
    NotEnoughArguments,
    /// A field that should hold a sequence set was not text.
    #[error("Invalid range")]
    InvalidSequenceSet,
    /// A sequence set did not follow the `sequence-set` grammar.
    #[error("Invalid sequence set: {0:?}")]
    SequenceSet(String),
    /// A response code carried arguments of the wrong shape.
    #[error("Malformed {code} response code: {reason}")]
    ResponseCode {
        /// The response code that was being decoded.
        code: &'static str,
        /// What was wrong with its arguments.
        reason: String,
    },
}

/// An [invalid character](https://tools.ietf.org/html/rfc3501#section-4.3) was found in a command
/// argument.
#[derive(Debug, thiserror::Error)]
#[error("Invalid character in input: {0:?}")]
pub struct ValidateError(pub char);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusKind;

    #[test]
    fn display_status_errors() {
        let mut status = StatusResponse::new("a1", StatusKind::No);
        assert_eq!(
            Error::No(status.clone()).to_string(),
            "No Response: no explanation given"
        );
        status.information = Some("mailbox is read-only".to_string());
        assert_eq!(
            Error::Bad(status).to_string(),
            "Bad Response: mailbox is read-only"
        );
    }

    #[test]
    fn display_parse_errors() {
        assert_eq!(
            Error::from(ParseError::NotEnoughArguments).to_string(),
            "Not enough arguments"
        );
        assert_eq!(ParseError::InvalidSequenceSet.to_string(), "Invalid range");
        assert_eq!(
            ValidateError('\n').to_string(),
            "Invalid character in input: '\\n'"
        );
    }
}
