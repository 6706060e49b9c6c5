//! Streaming codecs for HTTP/1.1 messages.
//!
//! All codecs here are pure byte transformers over [`BytesMut`] buffers: they
//! never touch a socket, which keeps them testable with literal byte strings
//! and independent of how the connection layer fragments its reads.
//!
//! - [`header`]: header-block framing and start-line/header-field decoding
//! - [`body`]: chunked and fixed-length body codecs
//! - [`RequestDecoder`] / [`ResponseDecoder`]: full message decoding as a
//!   stream of [`Message`](crate::protocol::Message) items
//! - [`RequestEncoder`] / [`ResponseEncoder`]: head serialization

pub mod body;
pub mod header;

mod request_decoder;
pub use request_decoder::RequestDecoder;

mod request_encoder;
pub use request_encoder::RequestEncoder;

mod response_decoder;
pub use response_decoder::ResponseDecoder;

mod response_encoder;
pub use response_encoder::ResponseEncoder;

use bytes::BytesMut;
use std::io;

/// Infallible `io::Write` adapter over a [`BytesMut`], so codecs can use
/// `write!` formatting without an intermediate `String`.
pub(crate) struct FastWrite<'a>(pub &'a mut BytesMut);

impl io::Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
