//! Serializes a request head into wire bytes.

use crate::codec::FastWrite;
use crate::protocol::{RequestHead, SendError};
use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Writes the request line and header block, terminated by the blank line.
///
/// Headers are written in insertion order with their stored (lowercased)
/// names; the query is re-encoded into the target. The body is not written
/// here, that is the entity's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEncoder;

impl RequestEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<&RequestHead> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, head: &RequestHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut out = FastWrite(dst);
        write!(out, "{} {} {}\r\n", head.method(), head.target(), head.version())?;
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
    use crate::protocol::Method;

    #[test]
    fn writes_request_line_and_headers_in_order() {
        let mut head = RequestHead::new(Method::Post, "/submit");
        head.headers_mut().insert("Host", "example.com");
        head.headers_mut().insert("Content-Length", "5");

        let mut dst = BytesMut::new();
        RequestEncoder::new().encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"POST /submit HTTP/1.1\r\nhost: example.com\r\ncontent-length: 5\r\n\r\n");
    }

    #[test]
    fn target_carries_the_re_encoded_query() {
        let mut head = RequestHead::new(Method::Get, "/search");
        head.query_mut().insert("q", "a b");

        let mut dst = BytesMut::new();
        RequestEncoder::new().encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"GET /search?q=a+b HTTP/1.1\r\n\r\n");
    }
}
