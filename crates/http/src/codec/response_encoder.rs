//! Serializes a response head into wire bytes.

use crate::codec::FastWrite;
use crate::protocol::{ResponseHead, SendError};
use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Writes the status line and header block, terminated by the blank line.
///
/// The stored reason phrase is written verbatim; an empty phrase leaves the
/// trailing space of the status line in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<&ResponseHead> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, head: &ResponseHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut out = FastWrite(dst);
        write!(out, "{} {} {}\r\n", head.version(), head.status().as_str(), head.reason())?;
        for (name, value) in head.headers().iter() {
            write!(out, "{name}: {value}\r\n")?;
        }
        write!(out, "\r\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn writes_status_line_and_headers() {
        let mut head = ResponseHead::new(StatusCode::OK);
        head.headers_mut().insert("Content-Length", "2");

        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\n");
    }

    #[test]
    fn empty_reason_keeps_the_separating_space() {
        let mut dst = BytesMut::new();
        let head = ResponseHead::new(StatusCode::from_u16(299).unwrap());
        ResponseEncoder::new().encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 299 \r\n\r\n");
    }
}
