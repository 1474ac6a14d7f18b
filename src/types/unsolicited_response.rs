use std::ops::RangeInclusive;

use imap_proto::{MailboxDatum, Response, Status};

use super::{Seq, Uid};

/// Responses that the server sends that are not related to the current command.
/// [RFC 3501](https://tools.ietf.org/html/rfc3501#section-7) states that clients need to be able
/// to accept any response at any time.
///
/// Note that `Recent`, `Exists` and `Expunge` responses refer to the currently `SELECT`ed folder,
/// so the user must take care when interpreting these.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnsolicitedResponse {
    /// An unsolicited [`RECENT` response](https://tools.ietf.org/html/rfc3501#section-7.3.2)
    /// indicating the number of messages with the `\Recent` flag set.
    Recent(u32),

    /// An unsolicited [`EXISTS` response](https://tools.ietf.org/html/rfc3501#section-7.3.1) that
    /// reports the number of messages in the mailbox.
    Exists(u32),

    /// An unsolicited [`EXPUNGE` response](https://tools.ietf.org/html/rfc3501#section-7.4.1) that
    /// reports that the specified message sequence number has been permanently removed from the
    /// mailbox. Expunges that happen as part of
    /// [`UidPlus::uid_expunge`](crate::extensions::uidplus::UidPlus::uid_expunge) are delivered
    /// to the caller's channel instead, if one was given.
    Expunge(Seq),

    /// An unsolicited [`VANISHED` response](https://tools.ietf.org/html/rfc7162#section-3.2.10)
    /// that reports a sequence-set of UIDs that have been expunged from the mailbox.
    Vanished {
        /// Whether the `EARLIER` tag was set on the response.
        earlier: bool,
        /// The list of UIDs which have been removed.
        uids: Vec<RangeInclusive<Uid>>,
    },

    /// An unsolicited [`OK` response](https://tools.ietf.org/html/rfc3501#section-7.1.1).
    Ok {
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`NO` response](https://tools.ietf.org/html/rfc3501#section-7.1.2).
    No {
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`BAD` response](https://tools.ietf.org/html/rfc3501#section-7.1.3).
    Bad {
        /// Information text that may be presented to the user.
        information: Option<String>,
    },

    /// An unsolicited [`BYE` response](https://tools.ietf.org/html/rfc3501#section-7.1.5).
    Bye {
        /// Information text that may be presented to the user.
        information: Option<String>,
    },
}

impl<'a> TryFrom<Response<'a>> for UnsolicitedResponse {
    type Error = Response<'a>;

    fn try_from(response: Response<'a>) -> Result<Self, Self::Error> {
        match response {
            Response::MailboxData(MailboxDatum::Recent(n)) => Ok(UnsolicitedResponse::Recent(n)),
            Response::MailboxData(MailboxDatum::Exists(n)) => Ok(UnsolicitedResponse::Exists(n)),
            Response::Expunge(n) => Ok(UnsolicitedResponse::Expunge(n)),
            Response::Vanished { earlier, uids } => {
                Ok(UnsolicitedResponse::Vanished { earlier, uids })
            }
            Response::Data {
                status,
                information,
                ..
            } => {
                let information = information.map(|s| s.to_string());
                match status {
                    Status::Ok => Ok(UnsolicitedResponse::Ok { information }),
                    Status::No => Ok(UnsolicitedResponse::No { information }),
                    Status::Bad => Ok(UnsolicitedResponse::Bad { information }),
                    Status::Bye => Ok(UnsolicitedResponse::Bye { information }),
                    _ => Ok(UnsolicitedResponse::Ok { information }),
                }
            }
            response => Err(response),
        }
    }
}
