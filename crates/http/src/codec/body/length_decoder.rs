//! Decoder for fixed-length message bodies.

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

/// Serves exactly the declared number of body bytes, then signals end of body.
///
/// Bytes past the declared length stay in the buffer untouched; on a
/// keep-alive stream they belong to the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = std::cmp::min(self.remaining, src.len() as u64) as usize;
        self.remaining -= take as u64;

        trace!(len = take, remaining = self.remaining, "decoded fixed-length data");
        Ok(Some(PayloadItem::Chunk(src.split_to(take).freeze())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn serves_declared_length_then_eof() {
        let mut buffer = BytesMut::from(&b"hello world"[..]);
        let mut decoder = LengthDecoder::new(5);

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        // bytes past the length are left for the next message
        assert_eq!(&buffer[..], b" world");
    }

    #[test]
    fn zero_length_is_immediate_eof() {
        let mut buffer = BytesMut::from(&b"leftover"[..]);
        let mut decoder = LengthDecoder::new(0);

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert_eq!(&buffer[..], b"leftover");
    }

    #[test]
    fn body_split_across_reads() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut decoder = LengthDecoder::new(6);

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"abc"));

        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"def");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"def"));

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }
}
