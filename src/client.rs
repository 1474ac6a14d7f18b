//! A blocking IMAP session over any `Read + Write` stream.
//!
//! Only the parts of the base protocol that the `UIDPLUS` operations need are covered here:
//! logging in, selecting a mailbox, querying capabilities, and executing arbitrary
//! [`Command`]s through the [`Execute`] trait.

use bufstream::BufStream;
use imap_proto::{MailboxDatum, Response, ResponseCode, Status};
use std::io::{Read, Write};
use std::sync::mpsc;

use crate::command::{Argument, Command};
use crate::error::{Error, ParseError, Result};
use crate::parse::{is_tagged, parse_status_line};
use crate::types::*;

static TAG_PREFIX: &str = "a";
const INITIAL_TAG: u32 = 0;
const CR: u8 = 0x0d;
const LF: u8 = 0x0a;

/// The [connection state](https://tools.ietf.org/html/rfc3501#section-3) of an IMAP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The client has not logged in yet.
    NotAuthenticated,
    /// The client is logged in, but has no mailbox selected.
    Authenticated,
    /// A mailbox is selected.
    Selected,
    /// The connection is being terminated.
    Logout,
}

impl State {
    /// Whether the session is logged in, with or without a selected mailbox.
    pub fn is_authenticated(self) -> bool {
        matches!(self, State::Authenticated | State::Selected)
    }
}

/// Something that can run IMAP commands and report their outcome.
///
/// This is the seam between protocol extensions and the connection: extensions build a
/// [`Command`], hand it to `execute`, and decode the returned [`StatusResponse`]. [`Client`] and
/// [`Session`] implement it over a real stream; tests can substitute a scripted implementation.
pub trait Execute {
    /// The current connection state.
    fn state(&self) -> State;

    /// Send `command` and block until its tagged status response arrives.
    ///
    /// Untagged `EXPUNGE` responses received while the command runs are sent to `expunged`, if
    /// given, in the order they arrive; otherwise they are treated as unsolicited.
    ///
    /// Transport and framing problems are returned as `Err`. A `NO` or `BAD` status is returned
    /// as `Ok`; use [`StatusResponse::into_result`] to turn it into an error.
    fn execute(
        &mut self,
        command: &Command,
        expunged: Option<&mpsc::Sender<Seq>>,
    ) -> Result<StatusResponse>;

    /// Check whether the server advertises the given capability.
    fn has_capability(&mut self, capability: &str) -> Result<bool>;
}

// what a read ended on, other than untagged data
enum Reply {
    Continue(Vec<u8>),
    Done(StatusResponse),
}

/// The stream and bookkeeping shared by [`Client`] and [`Session`].
pub(crate) struct Connection<T: Read + Write> {
    pub(crate) stream: BufStream<T>,
    tag: u32,
    capabilities: Option<Capabilities>,
    unsolicited_responses_tx: mpsc::Sender<UnsolicitedResponse>,
}

impl<T: Read + Write> Connection<T> {
    fn new(stream: T, unsolicited_responses_tx: mpsc::Sender<UnsolicitedResponse>) -> Self {
        Connection {
            stream: BufStream::new(stream),
            tag: INITIAL_TAG,
            capabilities: None,
            unsolicited_responses_tx,
        }
    }

    fn next_tag(&mut self) -> String {
        self.tag += 1;
        format!("{}{}", TAG_PREFIX, self.tag)
    }

    /// Write `command` and read until its tagged response.
    ///
    /// Untagged responses are first offered to `handle`; whatever it hands back is dealt with
    /// as unsolicited data.
    fn run<F>(&mut self, command: &Command, mut handle: F) -> Result<StatusResponse>
    where
        F: for<'a> FnMut(Response<'a>) -> Option<Response<'a>>,
    {
        let tag = self.next_tag();
        for segment in command.segments(&tag)? {
            self.write_line(&segment.text)?;
            if let Some(literal) = segment.literal {
                match self.read_reply(&tag, &mut handle)? {
                    Reply::Continue(_) => self.write_literal(literal)?,
                    // the server refused the literal
                    Reply::Done(status) => return Ok(status),
                }
            }
        }

        match self.read_reply(&tag, &mut handle)? {
            Reply::Done(status) => {
                log::debug!("{} completed: {}", command.name, status.kind);
                Ok(status)
            }
            Reply::Continue(line) => Err(Error::Parse(ParseError::Invalid(line))),
        }
    }

    fn read_reply<F>(&mut self, tag: &str, handle: &mut F) -> Result<Reply>
    where
        F: for<'a> FnMut(Response<'a>) -> Option<Response<'a>>,
    {
        let mut data = Vec::new();
        loop {
            self.readline(&mut data)?;

            if is_tagged(&data, tag) {
                let status = parse_status_line(&data)?;
                self.absorb_status(&status);
                return Ok(Reply::Done(status));
            }
            if data.starts_with(b"+") {
                return Ok(Reply::Continue(data));
            }

            match imap_proto::parser::parse_response(&data) {
                Ok((_, response)) => {
                    if let Some(response) = handle(response) {
                        self.absorb(response);
                    }
                }
                // a literal follows; keep reading onto the same buffer
                Err(nom::Err::Incomplete(_)) => continue,
                Err(_) => return Err(Error::Parse(ParseError::Invalid(data.clone()))),
            }
            data.clear();
        }
    }

    // untagged data nobody asked for
    fn absorb(&mut self, response: Response<'_>) {
        match response {
            Response::Capabilities(caps) => {
                self.capabilities = Some(Capabilities::from_proto(caps));
            }
            Response::Data {
                code: Some(ResponseCode::Capabilities(caps)),
                ..
            } => {
                self.capabilities = Some(Capabilities::from_proto(caps));
            }
            response => match UnsolicitedResponse::try_from(response) {
                Ok(unsolicited) => {
                    // nobody listening is fine
                    let _ = self.unsolicited_responses_tx.send(unsolicited);
                }
                Err(response) => log::debug!("ignoring untagged response: {:?}", response),
            },
        }
    }

    fn absorb_status(&mut self, status: &StatusResponse) {
        if status.has_code("CAPABILITY") {
            self.capabilities = Some(
                status
                    .arguments
                    .iter()
                    .filter_map(|arg| arg.as_str().map(str::to_string))
                    .collect(),
            );
        }
    }

    fn read_greeting(&mut self) -> Result<Vec<u8>> {
        let mut v = Vec::new();
        self.readline(&mut v)?;
        if let Ok((_, response)) = imap_proto::parser::parse_response(&v) {
            if let Response::Data {
                code: Some(ResponseCode::Capabilities(caps)),
                ..
            } = response
            {
                self.capabilities = Some(Capabilities::from_proto(caps));
            }
        }
        Ok(v)
    }

    fn readline(&mut self, into: &mut Vec<u8>) -> Result<usize> {
        use std::io::BufRead;
        let read = self.stream.read_until(LF, into)?;
        if read == 0 {
            return Err(Error::ConnectionLost);
        }

        let line = &into[(into.len() - read)..];
        log::trace!("S: {}", String::from_utf8_lossy(line).trim_end());

        Ok(read)
    }

    fn write_line(&mut self, buf: &[u8]) -> Result<()> {
        self.stream.write_all(buf)?;
        self.stream.write_all(&[CR, LF])?;
        self.stream.flush()?;
        log::trace!("C: {}", String::from_utf8_lossy(buf));
        Ok(())
    }

    fn write_literal(&mut self, literal: &[u8]) -> Result<()> {
        self.stream.write_all(literal)?;
        log::trace!("C: <{} bytes>", literal.len());
        Ok(())
    }

    fn execute(
        &mut self,
        command: &Command,
        expunged: Option<&mpsc::Sender<Seq>>,
    ) -> Result<StatusResponse> {
        self.run(command, |response| match (response, expunged) {
            (Response::Expunge(seq), Some(tx)) => {
                // the receiver may have hung up; the expunge still happened
                let _ = tx.send(seq);
                None
            }
            (response, _) => Some(response),
        })
    }

    fn capabilities(&mut self) -> Result<Capabilities> {
        self.run(&Command::new("CAPABILITY"), |r| Some(r))?
            .into_result()?;
        Ok(self.capabilities.clone().unwrap_or_default())
    }

    fn has_capability(&mut self, capability: &str) -> Result<bool> {
        if let Some(caps) = &self.capabilities {
            return Ok(caps.has(capability));
        }
        Ok(self.capabilities()?.has(capability))
    }
}

/// An authenticated IMAP session providing the usual IMAP commands. This type is what you get
/// from a succesful login attempt.
///
/// Both `Client` and `Session` implement [`Execute`], so the extension operations in
/// [`crate::extensions`] can be called on either; most of them require a `Session` with a
/// selected mailbox.
pub struct Session<T: Read + Write> {
    conn: Connection<T>,
    pub(crate) state: State,

    /// Server responses that are not related to the current command. See also the note on
    /// [unilateral server responses in RFC 3501](https://tools.ietf.org/html/rfc3501#section-7).
    pub unsolicited_responses: mpsc::Receiver<UnsolicitedResponse>,
}

/// An (unauthenticated) handle to talk to an IMAP server. This is what you get when first
/// connecting. A succesfull call to [`Client::login`] will return a [`Session`] instance that
/// provides the usual IMAP methods.
pub struct Client<T: Read + Write> {
    conn: Connection<T>,
    unsolicited_responses: mpsc::Receiver<UnsolicitedResponse>,
}

impl<T: Read + Write> Client<T> {
    /// Creates a new client over the given stream.
    ///
    /// This method primarily exists for writing tests that mock the underlying transport, but
    /// can also be used to support IMAP over custom tunnels. If you do not need to do that, then
    /// it is simpler to use the [`ClientBuilder`](crate::ClientBuilder) to get a new client.
    ///
    /// **Note:** In case you do need to use `Client::new` instead of the `ClientBuilder` you
    /// will need to read the greeting yourself with [`Client::read_greeting`].
    pub fn new(stream: T) -> Client<T> {
        let (tx, rx) = mpsc::channel();
        Client {
            conn: Connection::new(stream, tx),
            unsolicited_responses: rx,
        }
    }

    /// Yield the underlying connection for this Client.
    ///
    /// This consumes `self` since the Client is not much use without
    /// an underlying transport.
    pub fn into_inner(self) -> Result<T> {
        Ok(self.conn.stream.into_inner()?)
    }

    /// Read the server's greeting line. Any capabilities announced in it are remembered.
    pub fn read_greeting(&mut self) -> Result<Vec<u8>> {
        self.conn.read_greeting()
    }

    /// Log in to the IMAP server. Upon success a [`Session`] instance is returned; on error the
    /// original `Client` instance is returned in addition to the error.
    ///
    /// ```no_run
    /// # {} #[cfg(feature = "native-tls")]
    /// # fn main() {
    /// let client = imap_uidplus::ClientBuilder::new("imap.example.org", 993)
    ///     .native_tls().unwrap();
    ///
    /// match client.login("user", "pass") {
    ///     Ok(s) => {
    ///         // you are successfully authenticated!
    ///     },
    ///     Err((e, orig_client)) => {
    ///         eprintln!("error logging in: {}", e);
    ///         // prompt user and try again with orig_client here
    ///         return;
    ///     }
    /// }
    /// # }
    /// ```
    pub fn login<U: AsRef<str>, P: AsRef<str>>(
        mut self,
        username: U,
        password: P,
    ) -> ::std::result::Result<Session<T>, (Error, Client<T>)> {
        let command = Command::new("LOGIN")
            .arg(Argument::Quoted(username.as_ref().to_string()))
            .arg(Argument::Quoted(password.as_ref().to_string()));

        // capabilities may change once authenticated
        self.conn.capabilities = None;
        match self
            .conn
            .run(&command, |r| Some(r))
            .and_then(StatusResponse::into_result)
        {
            Ok(_) => {
                log::debug!("logged in as {}", username.as_ref());
                Ok(Session::new(self.conn, self.unsolicited_responses))
            }
            Err(e) => Err((e, self)),
        }
    }

    /// Run a command without a session, for example `STARTTLS`.
    pub(crate) fn run_command_and_check_ok(&mut self, command: &str) -> Result<()> {
        self.conn
            .run(&Command::new(command), |r| Some(r))?
            .into_result()
            .map(|_| ())
    }
}

impl<T: Read + Write> Execute for Client<T> {
    fn state(&self) -> State {
        State::NotAuthenticated
    }

    fn execute(
        &mut self,
        command: &Command,
        expunged: Option<&mpsc::Sender<Seq>>,
    ) -> Result<StatusResponse> {
        self.conn.execute(command, expunged)
    }

    fn has_capability(&mut self, capability: &str) -> Result<bool> {
        self.conn.has_capability(capability)
    }
}

fn collect_mailbox<'a>(mailbox: &mut Mailbox, response: Response<'a>) -> Option<Response<'a>> {
    match response {
        Response::MailboxData(MailboxDatum::Exists(n)) => mailbox.exists = n,
        Response::MailboxData(MailboxDatum::Recent(n)) => mailbox.recent = n,
        Response::MailboxData(MailboxDatum::Flags(flags)) => mailbox
            .flags
            .extend(flags.into_iter().map(String::from).map(Flag::from)),
        Response::Data {
            status: Status::Ok,
            code: Some(code),
            information,
        } => match code {
            ResponseCode::UidValidity(v) => mailbox.uid_validity = Some(v),
            ResponseCode::UidNext(v) => mailbox.uid_next = Some(v),
            ResponseCode::Unseen(v) => mailbox.unseen = Some(v),
            ResponseCode::PermanentFlags(flags) => mailbox
                .permanent_flags
                .extend(flags.into_iter().map(String::from).map(Flag::from)),
            code => {
                return Some(Response::Data {
                    status: Status::Ok,
                    code: Some(code),
                    information,
                })
            }
        },
        response => return Some(response),
    }
    None
}

impl<T: Read + Write> Session<T> {
    pub(crate) fn new(
        conn: Connection<T>,
        unsolicited_responses: mpsc::Receiver<UnsolicitedResponse>,
    ) -> Self {
        Session {
            conn,
            state: State::Authenticated,
            unsolicited_responses,
        }
    }

    /// The current connection state.
    pub fn state(&self) -> State {
        self.state
    }

    fn select_or_examine(&mut self, verb: &str, mailbox_name: &str) -> Result<Mailbox> {
        let command = Command::new(verb).arg(Argument::Quoted(mailbox_name.to_string()));
        let mut mailbox = Mailbox::default();
        let status = self
            .conn
            .run(&command, |response| collect_mailbox(&mut mailbox, response))?;

        // a failed SELECT still deselects the previous mailbox
        match status.into_result() {
            Ok(status) => {
                mailbox.read_only = verb == "EXAMINE" || status.has_code("READ-ONLY");
                self.state = State::Selected;
                log::debug!("selected {}", mailbox_name);
                Ok(mailbox)
            }
            Err(e) => {
                self.state = State::Authenticated;
                Err(e)
            }
        }
    }

    /// Selects a mailbox
    ///
    /// The `SELECT` command selects a mailbox so that messages in the mailbox can be accessed.
    /// Note that earlier versions of this protocol only required the FLAGS and EXISTS untagged
    /// data; consequently, client implementations SHOULD implement default behavior for missing
    /// data as discussed with the individual item.
    ///
    /// Only one mailbox can be selected at a time in a connection; simultaneous access to
    /// multiple mailboxes requires multiple connections. If the `SELECT` command fails, the
    /// session returns to the authenticated state.
    pub fn select<S: AsRef<str>>(&mut self, mailbox_name: S) -> Result<Mailbox> {
        self.select_or_examine("SELECT", mailbox_name.as_ref())
    }

    /// The `EXAMINE` command is identical to [`Session::select`] and returns the same output;
    /// however, the selected mailbox is identified as read-only.
    pub fn examine<S: AsRef<str>>(&mut self, mailbox_name: S) -> Result<Mailbox> {
        self.select_or_examine("EXAMINE", mailbox_name.as_ref())
    }

    /// The [`CLOSE` command](https://tools.ietf.org/html/rfc3501#section-6.4.2) permanently
    /// removes all messages that have the `\Deleted` flag set from the currently selected
    /// mailbox, and returns to the authenticated state from the selected state.
    pub fn close(&mut self) -> Result<()> {
        self.conn
            .run(&Command::new("CLOSE"), |r| Some(r))?
            .into_result()?;
        self.state = State::Authenticated;
        Ok(())
    }

    /// Logout informs the server that the client is done with the connection.
    pub fn logout(&mut self) -> Result<()> {
        let status = self.conn.run(&Command::new("LOGOUT"), |r| Some(r));
        self.state = State::Logout;
        status?.into_result().map(|_| ())
    }

    /// The [`CAPABILITY` command](https://tools.ietf.org/html/rfc3501#section-6.1.1) requests a
    /// listing of capabilities that the server supports. The answer is also remembered for
    /// [`Execute::has_capability`].
    pub fn capabilities(&mut self) -> Result<Capabilities> {
        self.conn.capabilities()
    }
}

impl<T: Read + Write> Execute for Session<T> {
    fn state(&self) -> State {
        self.state
    }

    fn execute(
        &mut self,
        command: &Command,
        expunged: Option<&mpsc::Sender<Seq>>,
    ) -> Result<StatusResponse> {
        self.conn.execute(command, expunged)
    }

    fn has_capability(&mut self, capability: &str) -> Result<bool> {
        self.conn.has_capability(capability)
    }
}

#[cfg(test)]
pub(crate) mod test_session {
    use super::*;
    use crate::mock_stream::MockStream;

    /// A session over a mock stream that already has a mailbox selected.
    pub(crate) fn selected_session(response: &str) -> Session<MockStream> {
        let mut session = authenticated_session(response);
        session.state = State::Selected;
        session
    }

    pub(crate) fn authenticated_session(response: &str) -> Session<MockStream> {
        let client = Client::new(MockStream::new(response.as_bytes().to_vec()));
        Session::new(client.conn, client.unsolicited_responses)
    }

    pub(crate) fn written(session: &Session<MockStream>) -> String {
        session.conn.stream.get_ref().written()
    }
}
