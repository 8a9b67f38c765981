use std::borrow::Cow;
use std::io::{self, BufRead};

/// Longest method token kept; anything after it is treated as the target.
pub const MAX_METHOD_LEN: usize = 254;

/// The parsed request line of one connection.
///
/// Both fields hold the bytes exactly as sent; nothing is decoded, so a key
/// that is not valid UTF-8 still names its own record. Header lines are
/// consumed but not kept. Both fields are empty when the client closed the
/// connection without sending anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Method token, e.g. `GET`.
    pub method: Vec<u8>,
    /// Request target: path plus any `?query`, e.g. `/set/k?v=1`.
    pub target: Vec<u8>,
}

impl Request {
    pub fn new(method: impl Into<Vec<u8>>, target: impl Into<Vec<u8>>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
        }
    }

    /// True for a connection that sent no request line.
    pub fn is_empty(&self) -> bool {
        self.method.is_empty() && self.target.is_empty()
    }

    /// The method as a standard HTTP method, if it is a valid token.
    pub fn http_method(&self) -> Option<http::Method> {
        if self.method.is_empty() {
            return None;
        }
        http::Method::from_bytes(&self.method).ok()
    }

    /// The method for display in logs.
    pub fn method_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.method)
    }

    /// The target for display in logs.
    pub fn target_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }
}

/// Read one request from `reader`.
///
/// The first line is split into method and target on whitespace; the protocol
/// version, if any, is ignored. All following lines up to the first empty one
/// are discarded. Lines longer than `max_line_len` are cut short silently.
pub fn parse_request<R: BufRead>(reader: &mut R, max_line_len: usize) -> io::Result<Request> {
    let line = read_line(reader, max_line_len)?;

    let mut pos = 0;
    while pos < line.len() && pos < MAX_METHOD_LEN && !is_space(line[pos]) {
        pos += 1;
    }
    let method = &line[..pos];

    while pos < line.len() && is_space(line[pos]) {
        pos += 1;
    }
    let start = pos;
    while pos < line.len() && !is_space(line[pos]) {
        pos += 1;
    }
    let target = &line[start..pos];

    if !line.is_empty() {
        discard_headers(reader, max_line_len)?;
    }

    Ok(Request {
        method: method.to_vec(),
        target: target.to_vec(),
    })
}

/// Read one line terminated by LF, CR or CRLF, without the terminator.
///
/// After a CR the next byte is peeked and consumed only if it is LF. The peek
/// blocks until that byte arrives, the stream ends or the read deadline
/// expires. End of stream ends the line. Bytes beyond `max_len` are read and
/// dropped.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    while let Some(byte) = next_byte(reader)? {
        match byte {
            b'\n' => break,
            b'\r' => {
                if peek_byte(reader)? == Some(b'\n') {
                    reader.consume(1);
                }
                break;
            }
            b => {
                if line.len() < max_len {
                    line.push(b);
                }
            }
        }
    }
    Ok(line)
}

fn discard_headers<R: BufRead>(reader: &mut R, max_line_len: usize) -> io::Result<()> {
    loop {
        let line = read_line(reader, max_line_len)?;
        if line.is_empty() {
            return Ok(());
        }
    }
}

fn peek_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn next_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    let byte = peek_byte(reader)?;
    if byte.is_some() {
        reader.consume(1);
    }
    Ok(byte)
}

/// Whitespace as the C locale defines it, vertical tab and form feed included.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}
