use std::fmt;

use crate::error::{Error, Result};

/// The outcome of a command, as reported by its tagged [status
/// response](https://tools.ietf.org/html/rfc3501#section-7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// The command completed successfully.
    Ok,
    /// The command failed.
    No,
    /// The command was not accepted by the server (protocol-level error).
    Bad,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Ok => f.write_str("OK"),
            StatusKind::No => f.write_str("NO"),
            StatusKind::Bad => f.write_str("BAD"),
        }
    }
}

/// An untyped token from the argument list of a response code.
///
/// Response codes defined by extensions carry arguments whose meaning depends on the code, so
/// they are kept in this raw form and decoded by whoever understands the code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// A token made up entirely of digits that fits in 32 bits.
    Number(u32),
    /// Any other bare token, such as `1:3,7` or `\Seen`.
    Atom(String),
    /// A quoted string, with escapes removed.
    Quoted(String),
    /// A parenthesized list.
    List(Vec<Field>),
    /// The `NIL` atom.
    Nil,
}

impl Field {
    /// The textual content of an atom or quoted string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Atom(s) | Field::Quoted(s) => Some(s),
            _ => None,
        }
    }

    /// The value of a numeric token. Atoms that happen to spell a number are also accepted.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Field::Number(n) => Some(*n),
            Field::Atom(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => write!(f, "{}", n),
            Field::Atom(s) => f.write_str(s),
            Field::Quoted(s) => write!(f, "{:?}", s),
            Field::List(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", field)?;
                }
                f.write_str(")")
            }
            Field::Nil => f.write_str("NIL"),
        }
    }
}

/// The tagged response that terminates a command.
///
/// Besides the outcome, a status response may carry a bracketed response code (such as
/// `APPENDUID` or `COPYUID`) followed by arguments, and human-readable text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct StatusResponse {
    /// The tag of the command this response completes.
    pub tag: String,
    /// Whether the command succeeded.
    pub kind: StatusKind,
    /// The response code, upper-cased, if the server sent one.
    pub code: Option<String>,
    /// The arguments following the response code, in the order the server sent them.
    pub arguments: Vec<Field>,
    /// Human-readable text following the response code.
    pub information: Option<String>,
}

impl StatusResponse {
    /// A status response with no response code and no text.
    pub fn new(tag: impl Into<String>, kind: StatusKind) -> Self {
        StatusResponse {
            tag: tag.into(),
            kind,
            code: None,
            arguments: Vec::new(),
            information: None,
        }
    }

    /// Attach a response code and its arguments.
    pub fn with_code(mut self, code: impl Into<String>, arguments: Vec<Field>) -> Self {
        self.code = Some(code.into().to_ascii_uppercase());
        self.arguments = arguments;
        self
    }

    /// Attach human-readable text.
    pub fn with_information(mut self, information: impl Into<String>) -> Self {
        self.information = Some(information.into());
        self
    }

    /// Whether the command completed successfully.
    pub fn is_ok(&self) -> bool {
        self.kind == StatusKind::Ok
    }

    /// Whether this response carries the given response code.
    pub fn has_code(&self, code: &str) -> bool {
        self.code
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(code))
    }

    /// Turn a `NO` or `BAD` status into the matching [`Error`].
    pub fn into_result(self) -> Result<StatusResponse> {
        match self.kind {
            StatusKind::Ok => Ok(self),
            StatusKind::No => Err(Error::No(self)),
            StatusKind::Bad => Err(Error::Bad(self)),
        }
    }
}

impl fmt::Display for StatusResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag, self.kind)?;
        if let Some(code) = &self.code {
            write!(f, " [{}", code)?;
            for arg in &self.arguments {
                write!(f, " {}", arg)?;
            }
            f.write_str("]")?;
        }
        if let Some(information) = &self.information {
            write!(f, " {}", information)?;
        }
        Ok(())
    }
}
