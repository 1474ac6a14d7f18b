//! Response codes added by `UIDPLUS`, see [RFC 4315 section
//! 3](https://tools.ietf.org/html/rfc4315#section-3).
//!
//! Servers may leave these codes out, so decoding yields `None` rather than an error when a code
//! is missing or its arguments do not have the expected shape.

use crate::error::{Error, ParseError, Result};
use crate::types::{Field, SequenceSet, StatusResponse, Uid};

/// Sent with a successful `APPEND`: `[APPENDUID <uid-validity> <uid>]`.
pub const CODE_APPEND_UID: &str = "APPENDUID";
/// Sent with a successful `COPY` or `UID COPY`: `[COPYUID <uid-validity> <source> <destination>]`.
pub const CODE_COPY_UID: &str = "COPYUID";
/// The mailbox does not keep UIDs across sessions.
pub const CODE_UID_NOT_STICKY: &str = "UIDNOTSTICKY";

/// The UID the server assigned to an appended message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AppendUid {
    /// The `UIDVALIDITY` of the destination mailbox.
    pub uid_validity: u32,
    /// The UID of the new message.
    pub uid: Uid,
}

impl AppendUid {
    /// Decode the `APPENDUID` code of `status`, if there is a well-formed one.
    pub fn decode(status: &StatusResponse) -> Option<Self> {
        if !status.has_code(CODE_APPEND_UID) {
            return None;
        }
        match status.arguments.as_slice() {
            [uid_validity, uid] => Some(AppendUid {
                uid_validity: uid_validity.as_number()?,
                uid: uid.as_number()?,
            }),
            _ => None,
        }
    }
}

/// The UIDs of copied messages, in the source and in the destination mailbox.
///
/// The n-th UID of `source` was copied to the n-th UID of `destination`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyUid {
    /// The `UIDVALIDITY` of the destination mailbox.
    pub uid_validity: u32,
    /// UIDs of the copied messages in the source mailbox.
    pub source: Option<SequenceSet>,
    /// UIDs the copies were given in the destination mailbox.
    pub destination: Option<SequenceSet>,
}

// a bare number is a valid single-element uid-set
fn sequence_set(field: &Field) -> std::result::Result<SequenceSet, String> {
    match field {
        Field::Number(n) => SequenceSet::try_from(*n).map_err(|_| n.to_string()),
        field => match field.as_str() {
            Some(text) => text.parse().map_err(|_| text.to_string()),
            None => Err(field.to_string()),
        },
    }
}

fn lenient(which: &str, field: &Field) -> Option<SequenceSet> {
    match sequence_set(field) {
        Ok(set) => Some(set),
        Err(text) => {
            log::warn!("ignoring malformed {} {} set {:?}", CODE_COPY_UID, which, text);
            None
        }
    }
}

fn malformed(reason: String) -> Error {
    Error::Parse(ParseError::ResponseCode {
        code: CODE_COPY_UID,
        reason,
    })
}

impl CopyUid {
    /// Decode the `COPYUID` code of `status`.
    ///
    /// A UID set that cannot be parsed is dropped (and logged) on its own; the other fields are
    /// still returned.
    pub fn decode(status: &StatusResponse) -> Option<Self> {
        if !status.has_code(CODE_COPY_UID) {
            return None;
        }
        match status.arguments.as_slice() {
            [uid_validity, source, destination] => Some(CopyUid {
                uid_validity: uid_validity.as_number()?,
                source: lenient("source", source),
                destination: lenient("destination", destination),
            }),
            _ => None,
        }
    }

    /// Like [`CopyUid::decode`], but a `COPYUID` code with malformed arguments is an error.
    ///
    /// `Ok(None)` still means the server did not send the code at all.
    pub fn decode_strict(status: &StatusResponse) -> Result<Option<Self>> {
        if !status.has_code(CODE_COPY_UID) {
            return Ok(None);
        }
        match status.arguments.as_slice() {
            [uid_validity, source, destination] => {
                let uid_validity = uid_validity
                    .as_number()
                    .ok_or_else(|| malformed(format!("invalid uid-validity {}", uid_validity)))?;
                let source = sequence_set(source)
                    .map_err(|text| malformed(format!("invalid source set {:?}", text)))?;
                let destination = sequence_set(destination)
                    .map_err(|text| malformed(format!("invalid destination set {:?}", text)))?;
                Ok(Some(CopyUid {
                    uid_validity,
                    source: Some(source),
                    destination: Some(destination),
                }))
            }
            args => Err(malformed(format!("expected 3 arguments, got {}", args.len()))),
        }
    }
}

/// Whether `status` says that the mailbox does not keep UIDs across sessions.
pub fn is_uid_not_sticky(status: &StatusResponse) -> bool {
    status.has_code(CODE_UID_NOT_STICKY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusKind;

    fn ok(code: &str, arguments: Vec<Field>) -> StatusResponse {
        StatusResponse::new("a1", StatusKind::Ok).with_code(code, arguments)
    }

    fn atom(s: &str) -> Field {
        Field::Atom(s.to_string())
    }

    #[test]
    fn append_uid() {
        let status = ok(
            CODE_APPEND_UID,
            vec![Field::Number(172), Field::Number(45)],
        );
        assert_eq!(
            AppendUid::decode(&status),
            Some(AppendUid {
                uid_validity: 172,
                uid: 45
            })
        );
    }

    #[test]
    fn append_uid_missing_or_malformed() {
        assert_eq!(
            AppendUid::decode(&StatusResponse::new("a1", StatusKind::Ok)),
            None
        );
        assert_eq!(
            AppendUid::decode(&ok(CODE_APPEND_UID, vec![Field::Number(172)])),
            None
        );
        assert_eq!(
            AppendUid::decode(&ok(CODE_APPEND_UID, vec![Field::Number(172), atom("4:5")])),
            None
        );
        // wrong code
        assert_eq!(
            AppendUid::decode(&ok(
                CODE_COPY_UID,
                vec![Field::Number(172), Field::Number(45)]
            )),
            None
        );
    }

    #[test]
    fn copy_uid() {
        let status = ok(
            CODE_COPY_UID,
            vec![Field::Number(172), atom("1:3"), atom("45:47")],
        );
        let copy = CopyUid::decode(&status).unwrap();
        assert_eq!(copy.uid_validity, 172);
        assert_eq!(copy.source, Some("1,2,3".parse().unwrap()));
        assert_eq!(copy.destination, Some("45:47".parse().unwrap()));
        assert_eq!(CopyUid::decode_strict(&status).unwrap(), Some(copy));
    }

    #[test]
    fn copy_uid_single_numbers() {
        let status = ok(
            CODE_COPY_UID,
            vec![Field::Number(38505), Field::Number(304), Field::Number(3956)],
        );
        let copy = CopyUid::decode(&status).unwrap();
        assert_eq!(copy.source, Some(SequenceSet::try_from(304).unwrap()));
        assert_eq!(copy.destination, Some(SequenceSet::try_from(3956).unwrap()));
    }

    #[test]
    fn copy_uid_malformed_ranges_are_dropped() {
        let status = ok(
            CODE_COPY_UID,
            vec![Field::Number(172), atom("1:x"), atom("45:47")],
        );
        let copy = CopyUid::decode(&status).unwrap();
        assert_eq!(copy.uid_validity, 172);
        assert_eq!(copy.source, None);
        assert!(copy.destination.is_some());

        let status = ok(
            CODE_COPY_UID,
            vec![Field::Number(172), atom("1:3"), Field::Nil],
        );
        let copy = CopyUid::decode(&status).unwrap();
        assert!(copy.source.is_some());
        assert_eq!(copy.destination, None);
    }

    #[test]
    fn copy_uid_strict() {
        let status = ok(
            CODE_COPY_UID,
            vec![Field::Number(172), atom("1:3"), atom("0")],
        );
        match CopyUid::decode_strict(&status) {
            Err(Error::Parse(ParseError::ResponseCode { code, reason })) => {
                assert_eq!(code, CODE_COPY_UID);
                assert!(reason.contains("destination"), "{}", reason);
            }
            other => panic!("unexpected {:?}", other),
        }

        let status = ok(CODE_COPY_UID, vec![Field::Number(172)]);
        assert_eq!(CopyUid::decode(&status), None);
        assert!(CopyUid::decode_strict(&status).is_err());

        let status = StatusResponse::new("a1", StatusKind::Ok);
        assert_eq!(CopyUid::decode_strict(&status).unwrap(), None);
    }

    #[test]
    fn uid_not_sticky() {
        assert!(is_uid_not_sticky(&ok("uidnotsticky", vec![])));
        assert!(!is_uid_not_sticky(&StatusResponse::new("a1", StatusKind::Ok)));
    }
}
