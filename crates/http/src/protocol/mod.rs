//! Core protocol types for the message-framing engine.
//!
//! This module provides the building blocks the codec and connection layers
//! exchange with each other and with embedding code:
//!
//! - **Message Handling**: [`Message`], [`PayloadItem`] and [`BodyKind`]: the
//!   items the streaming decoders produce and the framing policy they follow
//! - **Request Processing**: [`RequestHead`] and [`Request`]
//! - **Response Processing**: [`ResponseHead`] and [`Response`]
//! - **Entity Store**: [`Entity`] and [`EntitySink`]: the memory/disk hybrid
//!   body store with its wire-encoding flags
//! - **Error Handling**: [`HttpError`], [`ParseError`], [`SendError`]
//!
//! Everything here is synchronous; body I/O happens on the connection's own
//! worker thread.

mod method;
pub use method::Method;

mod fields;
pub use fields::FieldMap;
pub use fields::QueryParams;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod entity;
pub use entity::ContentReader;
pub use entity::Entity;
pub use entity::EntitySink;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

use bytes::Bytes;

/// The HTTP version assumed when a request line carries no version token.
pub const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// Represents a decoded item of an HTTP message stream: either the parsed
/// head or a piece of the body.
///
/// The generic parameter `T` is the head type: `(RequestHead, BodyKind)` on
/// the server read side, `(ResponseHead, BodyKind)` on the client read side.
#[derive(Debug)]
pub enum Message<T> {
    /// The parsed start-line and header block.
    Header(T),
    /// A chunk of body data or the end-of-body marker.
    Payload(PayloadItem),
}

/// An item in the decoded body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A run of decoded body bytes.
    Chunk(Bytes),
    /// Marks the end of the body.
    Eof,
}

/// The body-framing policy derived from a message's headers.
///
/// Selection rules (identical for requests and responses):
/// 1. `transfer-encoding: chunked` → [`BodyKind::Chunked`]
/// 2. else `content-length: n` → [`BodyKind::Fixed`]
/// 3. else → [`BodyKind::Empty`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// Body bounded by a declared byte count.
    Fixed(u64),
    /// Body framed with chunked transfer-encoding.
    Chunked,
    /// No body follows the header block.
    Empty,
}

impl BodyKind {
    /// Returns true if the body uses chunked transfer encoding.
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodyKind::Chunked)
    }

    /// Returns true if no body is expected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodyKind::Empty)
    }
}

impl<T> Message<T> {
    /// Returns true if this message contains body data.
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    /// Returns true if this message contains a parsed head.
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }
}

impl PayloadItem {
    /// Returns true if this item marks the end of the body.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item carries body bytes.
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a chunk.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the item and returns the contained bytes if this is a chunk.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
