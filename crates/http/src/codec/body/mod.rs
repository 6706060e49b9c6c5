//! Body codecs for the two transfer framings.
//!
//! [`PayloadDecoder`] is the entry point for reading: it wraps either the
//! [`ChunkedDecoder`] or the [`LengthDecoder`] according to the message's
//! [`BodyKind`](crate::protocol::BodyKind). [`ChunkedEncoder`] is the write
//! side used for outbound chunk-framed bodies; fixed-length bodies are written
//! raw and need no encoder.

mod chunked_decoder;
pub use chunked_decoder::ChunkedDecoder;

mod chunked_encoder;
pub use chunked_encoder::ChunkedEncoder;

mod length_decoder;
pub use length_decoder::LengthDecoder;

mod payload_decoder;
pub use payload_decoder::PayloadDecoder;
