use http::StatusCode;
use std::io;
use thiserror::Error;

/// Top-level error for one connection cycle, wrapping the read and send sides.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("read error: {source}")]
    ReadError {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },
}

/// Errors surfaced while reading and decoding an inbound message.
///
/// All decode errors surface synchronously from the read call; none of them
/// are resumable.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The remote closed the stream before a header boundary was found.
    /// Distinct from malformed input: no response should be attempted.
    #[error("remote host closed the connection before a message was read")]
    ConnectionClosed,

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("invalid start line: {reason}")]
    InvalidStartLine { reason: String },

    #[error("unhandled http method: {token:?}")]
    InvalidMethod { token: String },

    #[error("invalid status code: {token:?}")]
    InvalidStatusCode { token: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("invalid chunk size line: {reason}")]
    InvalidChunkSize { reason: String },

    #[error("chunk is not terminated properly")]
    ChunkNotTerminated,

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn invalid_start_line<S: ToString>(reason: S) -> Self {
        Self::InvalidStartLine { reason: reason.to_string() }
    }

    pub fn invalid_method<S: ToString>(token: S) -> Self {
        Self::InvalidMethod { token: token.to_string() }
    }

    pub fn invalid_status_code<S: ToString>(token: S) -> Self {
        Self::InvalidStatusCode { token: token.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn invalid_query<S: ToString>(reason: S) -> Self {
        Self::InvalidQuery { reason: reason.to_string() }
    }

    pub fn invalid_chunk_size<S: ToString>(reason: S) -> Self {
        Self::InvalidChunkSize { reason: reason.to_string() }
    }

    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status a server should answer with before aborting the cycle.
    ///
    /// Malformed input maps to a 4xx head, resource failures to 500. For
    /// [`ParseError::ConnectionClosed`] no response can reach the peer; the
    /// mapping still yields 400 so callers need no special case.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLargeHeader { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors surfaced while encoding and writing an outbound message.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    /// The chunked encoder was driven after its terminating chunk.
    #[error("body already finished, no further chunks may be written")]
    FinishedBody,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_status_mapping() {
        assert_eq!(ParseError::too_large_header(9000, 8192).status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert_eq!(ParseError::invalid_method("BREW").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::invalid_start_line("empty").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::io(io::Error::other("boom")).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
