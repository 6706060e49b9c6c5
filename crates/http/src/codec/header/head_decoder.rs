//! Parses a framed header block into a typed message head.
//!
//! The block is decoded leniently, matching how permissive peers actually
//! write heads:
//!
//! - start-line tokens are whitespace-delimited; a request line without a
//!   version token gets `HTTP/1.1` assumed
//! - header lines split at the first `:`, names and values are trimmed, and a
//!   line without a `:` is skipped rather than rejected
//! - the block is interpreted as UTF-8 with invalid sequences replaced
//!
//! Alongside the head, decoding derives the [`BodyKind`] governing how the
//! bytes after the block are framed.

use crate::protocol::{
    BodyKind, DEFAULT_HTTP_VERSION, FieldMap, Method, ParseError, QueryParams, RequestHead, ResponseHead,
};
use http::StatusCode;
use tracing::{debug, trace};

/// Decodes a request header block into its head and body-framing policy.
pub fn decode_request_head(block: &[u8]) -> Result<(RequestHead, BodyKind), ParseError> {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.lines();
    let start_line = lines.next().ok_or_else(|| ParseError::invalid_start_line("empty header block"))?;
    let mut tokens = start_line.split_whitespace();

    let method_token = tokens.next().ok_or_else(|| ParseError::invalid_start_line("missing method"))?;
    let method = Method::from_token(method_token).ok_or_else(|| ParseError::invalid_method(method_token))?;

    let target = tokens.next().ok_or_else(|| ParseError::invalid_start_line("missing request target"))?;
    let (path, query) = match target.split_once('?') {
        Some((path, raw_query)) => (path.to_owned(), QueryParams::parse(raw_query)?),
        None => (target.to_owned(), QueryParams::new()),
    };

    let version = match tokens.next() {
        Some(version) => version.to_owned(),
        None => {
            debug!(target, "request line carries no version token, assuming HTTP/1.1");
            DEFAULT_HTTP_VERSION.to_owned()
        }
    };

    let headers = decode_header_lines(lines);
    let kind = body_kind(&headers)?;
    Ok((RequestHead::from_parts(method, path, query, version, headers), kind))
}

/// Decodes a response header block into its head and body-framing policy.
///
/// The reason phrase is taken as the single token after the status code, so a
/// multi-word phrase arrives truncated to its first word. All three status
/// line tokens are required.
pub fn decode_response_head(block: &[u8]) -> Result<(ResponseHead, BodyKind), ParseError> {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.lines();
    let start_line = lines.next().ok_or_else(|| ParseError::invalid_start_line("empty header block"))?;
    let mut tokens = start_line.split_whitespace();

    let version =
        tokens.next().ok_or_else(|| ParseError::invalid_start_line("missing version"))?.to_owned();
    let code_token = tokens.next().ok_or_else(|| ParseError::invalid_start_line("missing status code"))?;
    let status = code_token
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| ParseError::invalid_status_code(code_token))?;
    let reason =
        tokens.next().ok_or_else(|| ParseError::invalid_start_line("missing reason phrase"))?.to_owned();

    let headers = decode_header_lines(lines);
    let kind = body_kind(&headers)?;
    Ok((ResponseHead::from_parts(version, status, reason, headers), kind))
}

fn decode_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> FieldMap {
    let mut headers = FieldMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        match line.split_once(':') {
            Some((name, value)) => headers.insert(name.trim(), value.trim()),
            None => trace!(line, "skipping header line without separator"),
        }
    }
    headers
}

/// Derives the body-framing policy from a decoded header block.
///
/// `transfer-encoding: chunked` takes precedence over `content-length`; with
/// neither present the message has no body.
pub fn body_kind(headers: &FieldMap) -> Result<BodyKind, ParseError> {
    if let Some(te) = headers.get("transfer-encoding") {
        if te.eq_ignore_ascii_case("chunked") {
            return Ok(BodyKind::Chunked);
        }
    }

    match headers.get("content-length") {
        Some(value) => {
            let size = value
                .trim()
                .parse::<u64>()
                .map_err(|e| ParseError::invalid_content_length(format!("{value:?}: {e}")))?;
            Ok(BodyKind::Fixed(size))
        }
        None => Ok(BodyKind::Empty),
    }
}

/// Whether the body bytes on the wire are gzip-compressed.
pub fn wire_gzip(headers: &FieldMap) -> bool {
    headers.get("content-encoding").is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"))
}
