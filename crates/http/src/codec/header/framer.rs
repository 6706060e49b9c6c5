//! Isolates the header block of a message from the raw byte stream.

use crate::protocol::ParseError;
use crate::utils::ensure;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

/// Header blocks larger than this abort the decode.
const MAX_HEADER_BYTES: usize = 8192;

/// Finds the boundary between a message's header block and its body.
///
/// The framer scans for the first `\r\n\r\n`; a bare `\n\n` is tolerated as
/// well for lenient senders. On a hit it yields the header block *including*
/// the boundary bytes and leaves everything after it untouched in the buffer,
/// so body bytes that arrived in the same read are preserved for the body
/// decoders. The content of the block is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFramer {
    max_size: usize,
}

impl HeaderFramer {
    /// Creates a framer with the default size cap.
    pub fn new() -> Self {
        Self { max_size: MAX_HEADER_BYTES }
    }

    /// Creates a framer with a custom size cap.
    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }
}

impl Default for HeaderFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HeaderFramer {
    type Item = Bytes;
    type Error = ParseError;

    /// Yields the complete header block once its boundary is buffered.
    ///
    /// Returns `Ok(None)` while the boundary has not arrived yet; fails with
    /// [`ParseError::TooLargeHeader`] when the buffer exceeds the cap without
    /// containing one. The verdict depends only on accumulated content, never
    /// on how the bytes were fragmented across reads.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(end) = find_boundary(src) {
            trace!(len = end, "framed header block");
            return Ok(Some(src.split_to(end).freeze()));
        }

        ensure!(src.len() <= self.max_size, ParseError::too_large_header(src.len(), self.max_size));
        Ok(None)
    }
}

/// Returns the index one past the header/body boundary, if present.
fn find_boundary(src: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 1 < src.len() {
        if src[i] == b'\r' && src[i + 1..].starts_with(b"\n\r\n") {
            return Some(i + 4);
        }
        if src[i] == b'\n' && src[i + 1] == b'\n' {
            return Some(i + 2);
        }
        i += 1;
    }
    None
}
