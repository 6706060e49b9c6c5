//! The client side of one connection.

use crate::codec::header::wire_gzip;
use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::connection::{fill, read_entity};
use crate::protocol::{HttpError, Message, ParseError, Request, Response, SendError};
use bytes::BytesMut;
use std::io::{Read, Write};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

/// Drives one outbound connection: sends requests, reads responses.
///
/// The mirror of [`ServerConnection`](crate::connection::ServerConnection),
/// with the message directions swapped.
#[derive(Debug)]
pub struct ClientConnection<R, W> {
    reader: R,
    writer: W,
    decoder: ResponseDecoder,
    encoder: RequestEncoder,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl<R: Read, W: Write> ClientConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            decoder: ResponseDecoder::new(),
            encoder: RequestEncoder::new(),
            read_buf: BytesMut::with_capacity(4 * 1024),
            write_buf: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Sends a complete request: head first, then the entity body, if any.
    pub fn send(&mut self, request: &Request) -> Result<(), HttpError> {
        self.write_buf.clear();
        self.encoder.encode(request.head(), &mut self.write_buf)?;
        self.writer.write_all(&self.write_buf).map_err(SendError::io)?;
        self.writer.flush().map_err(SendError::io)?;

        if let Some(entity) = request.entity() {
            entity.write_to(&mut self.writer)?;
        }
        debug!(method = %request.method(), path = request.path(), "sent request");
        Ok(())
    }

    /// Reads one complete response, with its body fully materialized.
    pub fn read(&mut self) -> Result<Response, HttpError> {
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
        debug!(status = %head.status(), "read response");
        Ok(head.into_response(entity))
    }
}
