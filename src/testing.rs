//! Enable the test_helpers feature to expose helper methods to build
//! mock response structures for testing your code that uses this crate
//!
//! To use add a dev-dependency on the crate adding the feature "test_helpers"
//! e.g.
//!
//! ```toml
//! [dependencies]
//! imap-uidplus = { version = "0.1" }
//!
//! [dev-dependencies]
//! # mirror the same configuration your dependencies and add test_helpers
//! imap-uidplus = { version = "0.1", features = ["test_helpers"] }
//! ```
//!
//! Together with a scripted [`Execute`](crate::client::Execute) implementation these make it
//! possible to exercise code built on [`UidPlus`](crate::extensions::uidplus::UidPlus) without
//! a server.

/// Methods to build a [`StatusResponse`](crate::types::StatusResponse) object
pub mod status {
    use crate::types::StatusResponse;

    /// Builds a [`StatusResponse`] from a tagged status line.
    ///
    /// Example input.
    ///
    /// ```
    /// # {} #[cfg(feature = "test_helpers")]
    /// # fn main() {
    /// let input = "a1 OK [APPENDUID 38505 3955] APPEND completed\r\n";
    /// let status = imap_uidplus::testing::status::parse(input);
    /// assert!(status.has_code("APPENDUID"));
    /// # }
    /// ```
    ///
    /// The trailing CRLF may be left out.
    pub fn parse(input: impl Into<Vec<u8>>) -> StatusResponse {
        let mut input = input.into();
        if !input.ends_with(b"\n") {
            input.extend_from_slice(b"\r\n");
        }
        crate::parse::parse_status_line(&input).unwrap()
    }
}

/// Methods to build a [`Capabilities`](crate::types::Capabilities) response object
pub mod capabilities {
    use crate::types::Capabilities;
    use imap_proto::Response;

    /// Builds an [`Capabilities`] based on the provided input
    ///
    /// Example input.
    ///
    /// ```
    /// # {} #[cfg(feature = "test_helpers")]
    /// # fn main() {
    /// let input = "* CAPABILITY IMAP4rev1 STARTTLS AUTH=GSSAPI UIDPLUS\r\n";
    /// let response = imap_uidplus::testing::capabilities::parse(input);
    /// assert!(response.has("uidplus"));
    /// # }
    /// ```
    pub fn parse(input: impl Into<Vec<u8>>) -> Capabilities {
        let input = input.into();
        match imap_proto::parser::parse_response(&input) {
            Ok((_, Response::Capabilities(caps))) => Capabilities::from_proto(caps),
            other => panic!("not a CAPABILITY response: {:?}", other),
        }
    }
}

/// Methods to build the raw [`Field`](crate::types::Field)s of a command or response code
pub mod fields {
    use crate::types::Field;

    /// Splits space-separated arguments into [`Field`]s.
    ///
    /// ```
    /// # {} #[cfg(feature = "test_helpers")]
    /// # fn main() {
    /// use imap_uidplus::types::Field;
    ///
    /// let fields = imap_uidplus::testing::fields::parse("3:5 NIL");
    /// assert_eq!(fields, vec![Field::Atom("3:5".to_string()), Field::Nil]);
    /// # }
    /// ```
    pub fn parse(input: &str) -> Vec<Field> {
        crate::parse::parse_fields(input).unwrap()
    }
}
