//! Full response decoding: status line and headers first, then the body.

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{HeaderFramer, decode_response_head};
use crate::protocol::{BodyKind, Message, ParseError, ResponseHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Two-phase decoder for inbound responses on a client connection.
///
/// Mirrors [`RequestDecoder`](crate::codec::RequestDecoder) with the response
/// head grammar: the head arrives as [`Message::Header`], body bytes follow as
/// [`Message::Payload`], and the decoder resets after EOF.
#[derive(Debug)]
pub struct ResponseDecoder {
    framer: HeaderFramer,
    payload_decoder: Option<PayloadDecoder>,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Self { framer: HeaderFramer::new(), payload_decoder: None }
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, BodyKind)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            if item.as_ref().is_some_and(|item| item.is_eof()) {
                self.payload_decoder = None;
            }
            return Ok(item.map(Message::Payload));
        }

        let Some(block) = self.framer.decode(src)? else {
            return Ok(None);
        };

        let (head, kind) = decode_response_head(&block)?;
        debug!(status = %head.status(), ?kind, "decoded response head");

        self.payload_decoder = Some(PayloadDecoder::from(kind));
        Ok(Some(Message::Header((head, kind))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn head_then_fixed_body() {
        let mut buffer = BytesMut::from(&b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nhi"[..]);
        let mut decoder = ResponseDecoder::new();

        let Some(Message::Header((head, kind))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected header");
        };
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(kind, BodyKind::Fixed(2));

        let Some(Message::Payload(chunk)) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected payload");
        };
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"hi");

        let Some(Message::Payload(eof)) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected eof");
        };
        assert!(eof.is_eof());
    }

    #[test]
    fn truncated_reason_phrase_is_preserved() {
        let mut buffer = BytesMut::from(&b"HTTP/1.1 404 Not Found\r\n\r\n"[..]);
        let mut decoder = ResponseDecoder::new();

        let Some(Message::Header((head, _))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected header");
        };
        assert_eq!(head.reason(), "Not");
    }

    #[test]
    fn chunked_response_body() {
        let mut buffer =
            BytesMut::from(&b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n2\r\nok\r\n0\r\n\r\n"[..]);
        let mut decoder = ResponseDecoder::new();

        let Some(Message::Header((_, kind))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected header");
        };
        assert_eq!(kind, BodyKind::Chunked);

        let Some(Message::Payload(chunk)) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected payload");
        };
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"ok");

        let Some(Message::Payload(eof)) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected eof");
        };
        assert!(eof.is_eof());
    }
}
