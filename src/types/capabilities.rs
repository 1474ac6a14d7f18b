use std::collections::hash_set::Iter;
use std::collections::HashSet;

use imap_proto::types::Capability;

/// From [section 7.2.1 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-7.2.1).
///
/// A list of capabilities that the server supports.
/// The capability list will include the atom "IMAP4rev1".
///
/// A capability name which begins with `AUTH=` indicates that the server supports that particular
/// authentication mechanism. Other capability names indicate that the server supports an
/// extension, revision, or amendment to the IMAP4rev1 protocol, such as `UIDPLUS`.
///
/// Capability names are compared case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities(pub(crate) HashSet<String>);

impl Capabilities {
    pub(crate) fn from_proto<'a>(caps: impl IntoIterator<Item = Capability<'a>>) -> Self {
        Capabilities(
            caps.into_iter()
                .map(|cap| match cap {
                    Capability::Imap4rev1 => "IMAP4REV1".to_string(),
                    Capability::Auth(mech) => format!("AUTH={}", mech.to_ascii_uppercase()),
                    Capability::Atom(atom) => atom.to_ascii_uppercase(),
                })
                .collect(),
        )
    }

    /// Check if the server has the given capability.
    pub fn has(&self, s: &str) -> bool {
        self.0.contains(&s.to_ascii_uppercase())
    }

    /// Iterate over all the server's capabilities, in upper case.
    pub fn iter(&self) -> Iter<'_, String> {
        self.0.iter()
    }

    /// Returns how many capabilities the server has.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the server purports to have no capabilities.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Capabilities {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Capabilities(iter.into_iter().map(|s| s.to_ascii_uppercase()).collect())
    }
}
