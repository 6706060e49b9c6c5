//! Blocking connection drivers over `std::io` streams.
//!
//! A connection owns one reader/writer pair and drives the codecs over it:
//! the server side reads requests and sends responses, the client side the
//! reverse. Each side keeps its own buffer, so body bytes that arrive in the
//! same read as a header (or bytes of the next pipelined message) stay
//! buffered for the next decode instead of being lost.
//!
//! Bodies are materialized eagerly: a `read` call returns only once the whole
//! body has been decoded into an [`Entity`], leaving the stream positioned at
//! the start of the next message.

mod client;
pub use client::ClientConnection;

mod server;
pub use server::ServerConnection;

use crate::protocol::{BodyKind, Entity, EntitySink, HttpError, Message, ParseError, PayloadItem};
use bytes::BytesMut;
use std::io::{self, Read};
use tokio_util::codec::Decoder;

/// Per-read transfer size from the stream into the decode buffer.
const READ_CHUNK_SIZE: usize = 1024;

/// Performs one read from the stream into the decode buffer.
///
/// Returns the number of bytes transferred; zero means end of stream.
pub(crate) fn fill<R: Read>(reader: &mut R, buf: &mut BytesMut) -> io::Result<usize> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let n = reader.read(&mut chunk)?;
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

/// Drives a message decoder through its body phase, collecting the decoded
/// bytes into an entity store.
///
/// Runs until the decoder signals end of body, pulling more input from the
/// stream as needed. Returns `None` for a bodyless message; a stream that
/// ends mid-body is an error, not a short body.
pub(crate) fn read_entity<R, D, H>(
    reader: &mut R,
    buf: &mut BytesMut,
    decoder: &mut D,
    kind: BodyKind,
    gzip: bool,
) -> Result<Option<Entity>, HttpError>
where
    R: Read,
    D: Decoder<Item = Message<H>, Error = ParseError>,
{
    let mut sink = EntitySink::new(kind, gzip).map_err(ParseError::io)?;

    loop {
        match decoder.decode(buf)? {
            Some(Message::Payload(PayloadItem::Chunk(bytes))) => {
                sink.push(&bytes).map_err(ParseError::io)?;
            }
            Some(Message::Payload(PayloadItem::Eof)) => break,
            Some(Message::Header(_)) => {
                return Err(ParseError::invalid_body("message head inside a body").into());
            }
            None => {
                let n = fill(reader, buf).map_err(ParseError::io)?;
                if n == 0 {
                    let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended inside a message body");
                    return Err(ParseError::io(eof).into());
                }
            }
        }
    }

    if kind.is_empty() {
        return Ok(None);
    }
    Ok(Some(sink.finish().map_err(ParseError::io)?))
}
