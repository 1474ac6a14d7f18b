use std::cmp::min;
use std::io::{Error, ErrorKind, Read, Result, Write};

/// An in-memory stream that replays a canned server transcript and records what the client
/// writes.
///
/// Once the transcript is exhausted, reads fail with `UnexpectedEof`, which is how tests
/// simulate a connection dropping in the middle of a command.
#[derive(Default)]
pub struct MockStream {
    read_buf: Vec<u8>,
    read_pos: usize,
    pub written_buf: Vec<u8>,
    err_on_read: bool,
    eof_on_read: bool,
    // reads that return at most one byte, to exercise partial reads
    short_reads: usize,
}

impl MockStream {
    pub fn new(read_buf: Vec<u8>) -> MockStream {
        MockStream::default().with_buf(read_buf)
    }

    pub fn with_buf(mut self, read_buf: Vec<u8>) -> MockStream {
        self.read_buf = read_buf;
        self
    }

    /// Every read reports a closed connection.
    pub fn with_eof(mut self) -> MockStream {
        self.eof_on_read = true;
        self
    }

    /// Every read fails.
    pub fn with_err(mut self) -> MockStream {
        self.err_on_read = true;
        self
    }

    /// The first read returns a single byte.
    pub fn with_delay(mut self) -> MockStream {
        self.short_reads = 1;
        self
    }

    /// Everything written so far, as text.
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.written_buf).into_owned()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.eof_on_read {
            return Ok(0);
        }
        if self.err_on_read {
            return Err(Error::new(ErrorKind::Other, "MockStream Error"));
        }
        let remaining = &self.read_buf[min(self.read_pos, self.read_buf.len())..];
        if remaining.is_empty() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "transcript exhausted"));
        }

        let mut len = min(buf.len(), remaining.len());
        if self.short_reads > 0 {
            self.short_reads -= 1;
            len = min(len, 1);
        }
        buf[..len].copy_from_slice(&remaining[..len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written_buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
