//! Header-block framing and head decoding.
//!
//! Decoding a message head is a two-stage affair: the [`HeaderFramer`] finds
//! the end of the header block in the raw byte stream without interpreting it,
//! then [`decode_request_head`] / [`decode_response_head`] parse the isolated
//! block into a typed head plus the body-framing policy for what follows.

mod framer;
pub use framer::HeaderFramer;

mod head_decoder;
pub use head_decoder::body_kind;
pub use head_decoder::decode_request_head;
pub use head_decoder::decode_response_head;
pub use head_decoder::wire_gzip;
