//! Full request decoding: header block first, then the body stream.

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{HeaderFramer, decode_request_head};
use crate::protocol::{BodyKind, Message, ParseError, RequestHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Two-phase decoder for inbound requests on a server connection.
///
/// Until a header block is framed and parsed, decoding yields nothing; the
/// parsed head arrives as [`Message::Header`] together with the body-framing
/// policy, and subsequent calls yield [`Message::Payload`] items from the
/// matching body decoder. After the body's EOF the decoder resets, ready for
/// the next message on a keep-alive stream.
#[derive(Debug)]
pub struct RequestDecoder {
    framer: HeaderFramer,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self { framer: HeaderFramer::new(), payload_decoder: None }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHead, BodyKind)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            if item.as_ref().is_some_and(|item| item.is_eof()) {
                // body complete, back to header phase
                self.payload_decoder = None;
            }
            return Ok(item.map(Message::Payload));
        }

        let Some(block) = self.framer.decode(src)? else {
            return Ok(None);
        };

        let (head, kind) = decode_request_head(&block)?;
        debug!(method = %head.method(), path = head.path(), ?kind, "decoded request head");

        self.payload_decoder = Some(PayloadDecoder::from(kind));
        Ok(Some(Message::Header((head, kind))))
    }
}
