use crate::command::{Command, ImapCommand, ParseCommand};
use crate::error::{Error, ParseError, Result};
use crate::types::{Field, SequenceSet};

/// The `EXPUNGE <sequence-set>` command that `UIDPLUS` allows inside the `UID` envelope.
///
/// Only messages that are both in the set and marked `\Deleted` are removed. Send it wrapped in
/// [`UidCommand`](crate::command::UidCommand); a bare `EXPUNGE` takes no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpungeCommand {
    /// UIDs of the messages to expunge.
    pub sequence_set: SequenceSet,
}

impl ImapCommand for ExpungeCommand {
    fn command(&self) -> Command {
        Command::new("EXPUNGE").arg(self.sequence_set.clone())
    }
}

impl ParseCommand for ExpungeCommand {
    fn parse(fields: &[Field]) -> Result<Self> {
        let first = fields
            .first()
            .ok_or(Error::Parse(ParseError::NotEnoughArguments))?;
        let text = first
            .as_str()
            .ok_or(Error::Parse(ParseError::InvalidSequenceSet))?;
        Ok(ExpungeCommand {
            sequence_set: text.parse()?,
        })
    }
}
