//! The closed set of request methods this engine accepts.

use std::fmt;

/// HTTP request methods, decoded case-sensitively from the request line.
///
/// Any token outside this enumeration is rejected as a bad request; there is
/// no extension-method escape hatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
    Patch,
    Propfind,
    Proppatch,
    Mkcol,
    Move,
    Copy,
    Lock,
    Unlock,
}

impl Method {
    /// Decodes a request-line token into a method.
    ///
    /// Matching is case-sensitive, so `get` is not a valid method token.
    pub fn from_token(token: &str) -> Option<Method> {
        let method = match token {
            "GET" => Method::Get,
            "PUT" => Method::Put,
            "POST" => Method::Post,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "TRACE" => Method::Trace,
            "CONNECT" => Method::Connect,
            "PATCH" => Method::Patch,
            "PROPFIND" => Method::Propfind,
            "PROPPATCH" => Method::Proppatch,
            "MKCOL" => Method::Mkcol,
            "MOVE" => Method::Move,
            "COPY" => Method::Copy,
            "LOCK" => Method::Lock,
            "UNLOCK" => Method::Unlock,
            _ => return None,
        };
        Some(method)
    }

    /// The wire representation of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Patch => "PATCH",
            Method::Propfind => "PROPFIND",
            Method::Proppatch => "PROPPATCH",
            Method::Mkcol => "MKCOL",
            Method::Move => "MOVE",
            Method::Copy => "COPY",
            Method::Lock => "LOCK",
            Method::Unlock => "UNLOCK",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
