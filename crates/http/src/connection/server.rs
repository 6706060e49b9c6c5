//! The server side of one connection.

use crate::codec::header::wire_gzip;
use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::connection::{fill, read_entity};
use crate::protocol::{HttpError, Message, ParseError, Request, Response, SendError};
use bytes::BytesMut;
use std::io::{Read, Write};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

/// Drives one accepted connection: reads requests, sends responses.
///
/// Designed for one-thread-per-connection use; the `read`/`send` pair is
/// called in a loop until `read` fails. A clean close between messages
/// surfaces as [`ParseError::ConnectionClosed`], which ends the loop without
/// a response; any other decode error still maps to a response status via
/// [`ParseError::status`].
#[derive(Debug)]
pub struct ServerConnection<R, W> {
    reader: R,
    writer: W,
    decoder: RequestDecoder,
    encoder: ResponseEncoder,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl<R: Read, W: Write> ServerConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            decoder: RequestDecoder::new(),
            encoder: ResponseEncoder::new(),
            read_buf: BytesMut::with_capacity(4 * 1024),
            write_buf: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Reads one complete request, with its body fully materialized.
    ///
    /// Blocks until the whole message is consumed, leaving the stream
    /// positioned at the start of the next one.
    pub fn read(&mut self) -> Result<Request, HttpError> {
        let (head, kind) = loop {
            if let Some(message) = self.decoder.decode(&mut self.read_buf)? {
                match message {
                    Message::Header(header) => break header,
                    Message::Payload(_) => {
                        return Err(ParseError::invalid_body("payload before a message head").into());
                    }
                }
            }

            let n = fill(&mut self.reader, &mut self.read_buf).map_err(ParseError::io)?;
            if n == 0 {
                trace!("stream closed between messages");
                return Err(ParseError::ConnectionClosed.into());
            }
        };

        let gzip = wire_gzip(head.headers());
        let entity = read_entity(&mut self.reader, &mut self.read_buf, &mut self.decoder, kind, gzip)?;
        debug!(method = %head.method(), path = head.path(), "read request");
        Ok(head.into_request(entity))
    }

    /// Sends a complete response: head first, then the entity body, if any.
    pub fn send(&mut self, response: &Response) -> Result<(), HttpError> {
        self.write_buf.clear();
        self.encoder.encode(response.head(), &mut self.write_buf)?;
        self.writer.write_all(&self.write_buf).map_err(SendError::io)?;
        self.writer.flush().map_err(SendError::io)?;

        if let Some(entity) = response.entity() {
            entity.write_to(&mut self.writer)?;
        }
        debug!(status = %response.status(), "sent response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Entity, Method};
    use http::StatusCode;
    use std::io::Cursor;

    fn server_over(input: &[u8]) -> ServerConnection<Cursor<Vec<u8>>, Vec<u8>> {
        ServerConnection::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[test]
    fn reads_request_and_sends_response() {
        let input = b"POST /echo HTTP/1.1\r\nhost: h\r\ncontent-length: 5\r\n\r\nhello";
        let mut conn = server_over(input);

        let request = conn.read().unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "/echo");

        let mut body = Vec::new();
        request.entity().unwrap().content().unwrap().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"hello");

        let mut response = Response::with_entity(StatusCode::OK, Entity::from_bytes(&b"hello"[..], false, false));
        response.headers_mut().insert("content-length", "5");
        conn.send(&response).unwrap();

        assert_eq!(&conn.writer[..], b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello");
    }

    #[test]
    fn pipelined_requests_are_read_in_turn() {
        let input = b"POST /a HTTP/1.1\r\ncontent-length: 3\r\n\r\nabcGET /b HTTP/1.1\r\n\r\n";
        let mut conn = server_over(input);

        let first = conn.read().unwrap();
        assert_eq!(first.path(), "/a");
        let mut body = Vec::new();
        first.entity().unwrap().content().unwrap().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"abc");

        let second = conn.read().unwrap();
        assert_eq!(second.path(), "/b");
        assert!(second.entity().is_none());
    }

    #[test]
    fn chunked_request_body_is_dechunked() {
        let input = b"POST /up HTTP/1.1\r\ntransfer-encoding: chunked\r\n\r\n3\r\nabc\r\n3\r\ndef\r\n0\r\n\r\n";
        let mut conn = server_over(input);

        let request = conn.read().unwrap();
        let entity = request.entity().unwrap();
        assert!(entity.is_chunked());
        assert_eq!(entity.length().unwrap(), None);

        let mut body = Vec::new();
        entity.content().unwrap().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"abcdef");
    }

    #[test]
    fn clean_close_between_messages() {
        let mut conn = server_over(b"");
        let err = conn.read().unwrap_err();
        assert!(matches!(err, HttpError::ReadError { source: ParseError::ConnectionClosed }));
    }

    #[test]
    fn eof_inside_a_body_is_an_error() {
        let input = b"POST /x HTTP/1.1\r\ncontent-length: 10\r\n\r\nshort";
        let mut conn = server_over(input);

        let err = conn.read().unwrap_err();
        assert!(matches!(err, HttpError::ReadError { source: ParseError::Io { .. } }));
    }

    #[test]
    fn chunked_response_is_framed_on_the_wire() {
        let mut conn = server_over(b"GET / HTTP/1.1\r\n\r\n");
        let _ = conn.read().unwrap();

        let mut response =
            Response::with_entity(StatusCode::OK, Entity::from_bytes(&b"streamed"[..], true, false));
        response.headers_mut().insert("transfer-encoding", "chunked");
        conn.send(&response).unwrap();

        assert_eq!(
            &conn.writer[..],
            b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n8\r\nstreamed\r\n0\r\n\r\n"
        );
    }

    #[test]
    fn parse_failure_still_yields_a_sendable_response() {
        let mut conn = server_over(b"BREW /pot HTTP/1.1\r\n\r\n");

        let err = conn.read().unwrap_err();
        let HttpError::ReadError { source } = err else { panic!("expected read error") };
        let response = Response::from_parse_error(&source);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        conn.send(&response).unwrap();

        assert!(conn.writer.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
