use std::io::{self, Write};

use bytes::Bytes;
use http::StatusCode;

const BAD_REQUEST_BODY: &str =
    "<P>Your browser sent a bad request, such as a POST without a Content-Length.\r\n";

const NOT_FOUND_BODY: &str = concat!(
    "<HTML><TITLE>404: Not Found</TITLE>\r\n",
    "<BODY><h1>404: Not Found</h1>\r\n",
    "</BODY></HTML>\r\n",
);

const INTERNAL_ERROR_BODY: &str = concat!(
    "<HTML><TITLE>500: Internal Server Error</TITLE>\r\n",
    "<BODY><h1>500: Internal Server Error</h1>\r\n",
    "</BODY></HTML>\r\n",
);

const NOT_IMPLEMENTED_BODY: &str = concat!(
    "<HTML><HEAD><TITLE>Method Not Implemented\r\n",
    "</TITLE></HEAD>\r\n",
    "<BODY><P>HTTP request method not supported.\r\n",
    "</BODY></HTML>\r\n",
);

/// One complete HTTP/1.0 response.
///
/// There is no `Content-Length`: the body ends when the connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
    }

    pub fn not_implemented() -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, NOT_IMPLEMENTED_BODY)
    }

    /// The same status and headers with an empty body, as a HEAD reply.
    pub fn without_body(mut self) -> Self {
        self.body = Bytes::new();
        self
    }

    /// Reason phrase as kvlite has always sent it.
    pub fn reason(&self) -> &'static str {
        match self.status {
            StatusCode::OK => "OK",
            StatusCode::BAD_REQUEST => "BAD REQUEST",
            StatusCode::NOT_FOUND => "NOT FOUND",
            StatusCode::INTERNAL_SERVER_ERROR => "INTERNAL SERVER ERROR",
            StatusCode::NOT_IMPLEMENTED => "Method Not Implemented",
            other => other.canonical_reason().unwrap_or("Unknown"),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let head = format!(
            "HTTP/1.0 {} {}\r\n\
             Connection: close\r\n\
             Content-Type: text/html\r\n\
             \r\n",
            self.status.as_u16(),
            self.reason(),
        );
        out.write_all(head.as_bytes())?;
        out.write_all(&self.body)?;
        out.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 64);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}
