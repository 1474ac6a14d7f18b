//! A small model of IMAP commands: a name followed by typed arguments.
//!
//! Commands are built as values so that extensions can wrap or extend the base protocol's
//! commands (for example by prefixing them with `UID`) before handing them to an
//! [`Execute`](crate::client::Execute) implementation, which serializes and sends them.

use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Result, ValidateError};
use crate::types::{Field, Flag, SequenceSet};

/// A single argument of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Sent as-is. Must not contain spaces or special characters.
    Atom(String),
    /// Sent as a quoted string. Must not contain CR or LF.
    Quoted(String),
    /// A sequence set, sent in its canonical text form.
    SequenceSet(SequenceSet),
    /// A parenthesized list of arguments.
    List(Vec<Argument>),
    /// A synchronizing literal (`{n}` followed by the raw bytes).
    Literal(Vec<u8>),
}

impl From<SequenceSet> for Argument {
    fn from(set: SequenceSet) -> Self {
        Argument::SequenceSet(set)
    }
}

/// An IMAP command as a name and a list of arguments, without a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command keyword, e.g. `EXPUNGE`.
    pub name: String,
    /// Positional arguments, in order.
    pub arguments: Vec<Argument>,
}

impl Command {
    /// A command with the given name and no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<Argument>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Serialize the command after the given tag.
    ///
    /// Every literal splits the command into another [`Segment`]: the text of a segment is
    /// followed by CRLF, and the literal is sent once the server asks for it.
    pub(crate) fn segments(&self, tag: &str) -> Result<Vec<Segment<'_>>> {
        let mut segments = Vec::new();
        let mut text = format!("{} {}", tag, self.name).into_bytes();
        for arg in &self.arguments {
            text.push(b' ');
            write_argument(arg, &mut text, &mut segments)?;
        }
        segments.push(Segment {
            text,
            literal: None,
        });
        Ok(segments)
    }
}

/// A chunk of a serialized command, see [`Command::segments`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Segment<'c> {
    pub(crate) text: Vec<u8>,
    pub(crate) literal: Option<&'c [u8]>,
}

fn write_argument<'c>(
    arg: &'c Argument,
    text: &mut Vec<u8>,
    segments: &mut Vec<Segment<'c>>,
) -> Result<()> {
    match arg {
        Argument::Atom(atom) => text.extend_from_slice(validate_atom(atom)?.as_bytes()),
        Argument::Quoted(s) => text.extend_from_slice(validate_str(s)?.as_bytes()),
        Argument::SequenceSet(set) => text.extend_from_slice(set.to_string().as_bytes()),
        Argument::List(items) => {
            text.push(b'(');
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    text.push(b' ');
                }
                write_argument(item, text, segments)?;
            }
            text.push(b')');
        }
        Argument::Literal(data) => {
            text.extend_from_slice(format!("{{{}}}", data.len()).as_bytes());
            segments.push(Segment {
                text: std::mem::take(text),
                literal: Some(data),
            });
        }
    }
    Ok(())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', r"\\").replace('"', "\\\""))
}

/// Refuse atoms that would end the argument early or break the line.
pub(crate) fn validate_atom(value: &str) -> Result<&str> {
    let bad = |c: char| c.is_ascii_control() || matches!(c, ' ' | '(' | ')' | '{' | '"');
    match value.chars().find(|&c| bad(c)) {
        Some(c) => Err(Error::Validate(ValidateError(c))),
        None => Ok(value),
    }
}

/// Quote a string argument, refusing characters that cannot appear in a quoted string.
pub(crate) fn validate_str(value: &str) -> Result<String> {
    if let Some(c) = value.chars().find(|&c| c == '\r' || c == '\n') {
        return Err(Error::Validate(ValidateError(c)));
    }
    Ok(quote(value))
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Atom(atom) => f.write_str(atom),
            Argument::Quoted(s) => f.write_str(&quote(s)),
            Argument::SequenceSet(set) => write!(f, "{}", set),
            Argument::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Argument::Literal(data) => write!(f, "{{{}}}", data.len()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A typed request that can be turned into a [`Command`].
pub trait ImapCommand {
    /// The wire representation of this request.
    fn command(&self) -> Command;
}

impl ImapCommand for Command {
    fn command(&self) -> Command {
        self.clone()
    }
}

/// A typed request that can be rebuilt from the raw argument fields of a command.
pub trait ParseCommand: Sized {
    /// Parse the arguments that followed the command keyword.
    fn parse(fields: &[Field]) -> Result<Self>;
}

/// The [`UID`](https://tools.ietf.org/html/rfc3501#section-6.4.8) envelope: runs the wrapped
/// command with UIDs instead of message sequence numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidCommand<C>(pub C);

impl<C: ImapCommand> ImapCommand for UidCommand<C> {
    fn command(&self) -> Command {
        let inner = self.0.command();
        let mut arguments = Vec::with_capacity(inner.arguments.len() + 1);
        arguments.push(Argument::Atom(inner.name));
        arguments.extend(inner.arguments);
        Command {
            name: "UID".to_string(),
            arguments,
        }
    }
}

/// The [`COPY`](https://tools.ietf.org/html/rfc3501#section-6.4.7) command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCommand {
    /// The messages to copy.
    pub sequence_set: SequenceSet,
    /// The destination mailbox.
    pub mailbox: String,
}

impl ImapCommand for CopyCommand {
    fn command(&self) -> Command {
        Command::new("COPY")
            .arg(self.sequence_set.clone())
            .arg(Argument::Quoted(self.mailbox.clone()))
    }
}

/// The [`APPEND`](https://tools.ietf.org/html/rfc3501#section-6.3.11) command.
#[derive(Debug, Clone)]
pub struct AppendCommand<'a> {
    /// The destination mailbox.
    pub mailbox: &'a str,
    /// Flags to set on the new message.
    pub flags: &'a [Flag<'a>],
    /// The internal date of the new message; the server picks one if `None`.
    pub date: Option<DateTime<FixedOffset>>,
    /// The full RFC 5322 message.
    pub content: &'a [u8],
}

impl<'a> ImapCommand for AppendCommand<'a> {
    fn command(&self) -> Command {
        let mut command = Command::new("APPEND").arg(Argument::Quoted(self.mailbox.to_string()));
        if !self.flags.is_empty() {
            let flags = self
                .flags
                .iter()
                .map(|f| Argument::Atom(f.to_string()))
                .collect();
            command = command.arg(Argument::List(flags));
        }
        if let Some(date) = self.date {
            command = command.arg(Argument::Quoted(
                date.format("%d-%h-%Y %T %z").to_string(),
            ));
        }
        command.arg(Argument::Literal(self.content.to_vec()))
    }
}
