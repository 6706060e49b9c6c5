//! Decoder for chunk-framed message bodies.
//!
//! Chunked framing interleaves the body with its own structure: each chunk is
//! a hex size line, the data bytes, and a trailing CRLF; a zero-size chunk
//! followed by a final CRLF terminates the body. The decoder strips all of the
//! framing and yields only the data bytes.

use crate::protocol::{ParseError, PayloadItem};
use crate::utils::ensure;
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

/// Longest permitted chunk-size line, CRLF included.
const MAX_CHUNK_SIZE_LINE: usize = 32;

/// Incremental decoder for chunked transfer encoding.
///
/// The decoder consumes bytes only once a complete framing element is
/// buffered (a full size line, a full chunk-trailing CRLF), so a decode that
/// returns `Ok(None)` leaves the buffer positioned exactly where it was. Data
/// bytes inside a chunk are the exception: they are yielded as they arrive,
/// in as many pieces as the reads happen to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
}

/// Where the decoder stands in the chunk framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// At the start of a size line (the next framing element is `SIZE\r\n`).
    NeedChunkHeader,
    /// Inside a chunk's data, with this many bytes still owed; zero means the
    /// chunk-trailing CRLF is next.
    InChunk(u64),
    /// The terminal chunk has been consumed; only [`PayloadItem::Eof`] remains.
    Done,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: NeedChunkHeader }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes the next payload item from the buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` for a run of decoded data bytes
    /// - `Ok(Some(PayloadItem::Eof))` once the terminal chunk is consumed
    /// - `Ok(None)` when more input is needed
    /// - `Err(ParseError)` when the framing is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                Done => {
                    trace!("finished reading chunked body");
                    return Ok(Some(PayloadItem::Eof));
                }

                NeedChunkHeader => {
                    let window = &src[..src.len().min(MAX_CHUNK_SIZE_LINE)];
                    let Some(line_len) = find_crlf(window) else {
                        ensure!(
                            src.len() < MAX_CHUNK_SIZE_LINE,
                            ParseError::invalid_chunk_size(format!(
                                "no CRLF within the first {MAX_CHUNK_SIZE_LINE} bytes"
                            ))
                        );
                        return Ok(None);
                    };

                    let size = parse_chunk_size(&src[..line_len])?;
                    if size == 0 {
                        // terminal chunk: the final CRLF must be validated
                        // before any of it is consumed
                        if src.len() < line_len + 4 {
                            return Ok(None);
                        }
                        ensure!(&src[line_len + 2..line_len + 4] == b"\r\n", ParseError::ChunkNotTerminated);
                        src.advance(line_len + 4);
                        self.state = Done;
                    } else {
                        src.advance(line_len + 2);
                        self.state = InChunk(size);
                    }
                }

                InChunk(0) => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    ensure!(&src[..2] == b"\r\n", ParseError::ChunkNotTerminated);
                    src.advance(2);
                    self.state = NeedChunkHeader;
                }

                InChunk(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    let take = std::cmp::min(remaining, src.len() as u64) as usize;
                    let bytes = src.split_to(take).freeze();
                    self.state = InChunk(remaining - take as u64);
                    trace!(len = take, "decoded chunk data");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }
            }
        }
    }
}

fn find_crlf(window: &[u8]) -> Option<usize> {
    window.windows(2).position(|pair| pair == b"\r\n")
}

/// Parses a size line as bare hexadecimal. Extensions are not supported and
/// fail the parse like any other non-hex byte.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    ensure!(!line.is_empty(), ParseError::invalid_chunk_size("empty size line"));

    let mut size: u64 = 0;
    for &b in line {
        let digit = match b {
            b'0'..=b'9' => (b - b'0') as u64,
            b'a'..=b'f' => (b - b'a' + 10) as u64,
            b'A'..=b'F' => (b - b'A' + 10) as u64,
            _ => {
                return Err(ParseError::invalid_chunk_size(format!("unexpected byte {b:#04x}")));
            }
        };
        size = size
            .checked_mul(16)
            .and_then(|s| s.checked_add(digit))
            .ok_or_else(|| ParseError::invalid_chunk_size("size overflows u64"))?;
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn single_chunk_then_eof() {
        let mut buffer = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"1234567890abcdef"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn multiple_chunks() {
        let mut buffer = BytesMut::from(&b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b", world"));

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn mixed_size_chunks_in_one_read() {
        let mut buffer = BytesMut::from(&b"10\r\n0123456789ABCDEF\r\na\r\n0123456789\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let mut body = Vec::new();
        loop {
            match decoder.decode(&mut buffer).unwrap().unwrap() {
                PayloadItem::Chunk(bytes) => body.extend_from_slice(&bytes),
                PayloadItem::Eof => break,
            }
        }
        assert_eq!(body, b"0123456789ABCDEF0123456789");
        assert_eq!(body.len(), 26);
    }

    #[test]
    fn uppercase_hex_size() {
        let mut buffer = BytesMut::from(&b"A\r\n0123456789\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().len(), 10);
    }

    #[test]
    fn partial_chunk_data_is_yielded_as_it_arrives() {
        let mut buffer = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hel"));

        // nothing more until the rest arrives
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"lo\r\n0\r\n\r\n");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"lo"));
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn fragmented_size_line_is_not_consumed_early() {
        let mut buffer = BytesMut::from(&b"5"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"5");

        buffer.extend_from_slice(b"\r\nhello\r\n0\r\n\r\n");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));
    }

    #[test]
    fn fragmented_terminal_chunk() {
        let mut buffer = BytesMut::from(&b"0\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"\r\n");
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn eof_is_sticky_and_leftover_bytes_survive() {
        let mut buffer = BytesMut::from(&b"0\r\n\r\nGET / HTTP/1.1\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        // bytes of the next message are untouched
        assert_eq!(&buffer[..], b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn non_hex_size_is_rejected() {
        let mut buffer = BytesMut::from(&b"xyz\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(matches!(
            decoder.decode(&mut buffer).unwrap_err(),
            ParseError::InvalidChunkSize { .. }
        ));
    }

    #[test]
    fn empty_size_line_is_rejected() {
        let mut buffer = BytesMut::from(&b"\r\nhello"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(matches!(
            decoder.decode(&mut buffer).unwrap_err(),
            ParseError::InvalidChunkSize { .. }
        ));
    }

    #[test]
    fn overlong_size_line_is_rejected() {
        let mut buffer = BytesMut::from(&vec![b'1'; MAX_CHUNK_SIZE_LINE + 1][..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(matches!(
            decoder.decode(&mut buffer).unwrap_err(),
            ParseError::InvalidChunkSize { .. }
        ));
    }

    #[test]
    fn missing_chunk_terminator_is_rejected() {
        let mut buffer = BytesMut::from(&b"5\r\nhelloXX"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        assert!(matches!(decoder.decode(&mut buffer).unwrap_err(), ParseError::ChunkNotTerminated));
    }

    #[test]
    fn missing_final_crlf_is_rejected() {
        let mut buffer = BytesMut::from(&b"0\r\nXY"[..]);
        let mut decoder = ChunkedDecoder::new();
        assert!(matches!(decoder.decode(&mut buffer).unwrap_err(), ParseError::ChunkNotTerminated));
    }

    #[test]
    fn large_chunk_across_many_reads() {
        let size = 1024 * 1024;
        let mut data = format!("{size:x}\r\n").into_bytes();
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let mut decoder = ChunkedDecoder::new();
        let mut buffer = BytesMut::new();
        let mut total = 0;

        for piece in data.chunks(4096) {
            buffer.extend_from_slice(piece);
            while let Some(item) = decoder.decode(&mut buffer).unwrap() {
                match item {
                    PayloadItem::Chunk(bytes) => total += bytes.len(),
                    PayloadItem::Eof => {
                        assert_eq!(total, size);
                        return;
                    }
                }
            }
        }
        panic!("never reached end of body");
    }
}
