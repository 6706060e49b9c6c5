//! Encoder for chunk-framed message bodies.

use crate::codec::FastWrite;
use crate::protocol::{PayloadItem, SendError};
use crate::utils::ensure;
use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Frames outbound payload items as chunked transfer encoding.
///
/// Each [`PayloadItem::Chunk`] becomes an uppercase hex size line, the data
/// and a CRLF; [`PayloadItem::Eof`] writes the terminating `0\r\n\r\n` and
/// finishes the encoder. Driving a finished encoder is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    finished: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { finished: false }
    }

    /// True once the terminating chunk has been written.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<PayloadItem> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!self.finished, SendError::FinishedBody);

        match item {
            PayloadItem::Chunk(bytes) => {
                // an empty data chunk would read as the terminator on the wire
                if bytes.is_empty() {
                    return Ok(());
                }
                write!(FastWrite(dst), "{:X}\r\n", bytes.len())?;
                dst.extend_from_slice(&bytes);
                dst.extend_from_slice(b"\r\n");
            }
            PayloadItem::Eof => {
                self.finished = true;
                dst.extend_from_slice(b"0\r\n\r\n");
            }
        }
        Ok(())
    }
}
