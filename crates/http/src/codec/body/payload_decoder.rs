//! Unified decoder over the body-framing strategies.

use crate::codec::body::{ChunkedDecoder, LengthDecoder};
use crate::protocol::{BodyKind, ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Decodes a message body with the strategy its headers selected.
///
/// Wraps one of the three framings: fixed length, chunked, or no body at all
/// (which yields [`PayloadItem::Eof`] immediately).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    NoBody,
}

impl PayloadDecoder {
    /// Creates a decoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a decoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Creates a decoder for a body of the given fixed length.
    pub fn fixed_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }
}

impl From<BodyKind> for PayloadDecoder {
    fn from(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Fixed(size) => Self::fixed_length(size),
            BodyKind::Chunked => Self::chunked(),
            BodyKind::Empty => Self::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_from_body_kind() {
        assert!(PayloadDecoder::from(BodyKind::Chunked).is_chunked());
        assert!(PayloadDecoder::from(BodyKind::Empty).is_empty());
        assert!(!PayloadDecoder::from(BodyKind::Fixed(10)).is_chunked());
    }

    #[test]
    fn no_body_yields_immediate_eof() {
        let mut decoder = PayloadDecoder::empty();
        let mut buffer = BytesMut::from(&b"next message"[..]);

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert_eq!(&buffer[..], b"next message");
    }
}
