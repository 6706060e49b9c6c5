//! Response representation: status head plus optional entity body.

use http::StatusCode;

use crate::protocol::{DEFAULT_HTTP_VERSION, Entity, FieldMap, ParseError};

/// The decoded (or to-be-sent) status-line and header block of a response.
///
/// The reason phrase is stored verbatim. On decode it holds at most the first
/// whitespace-delimited token of the phrase ("Not Found" arrives as "Not"),
/// preserving observed behavior. It may be empty, in which case
/// the serialized status line still carries the separating space.
#[derive(Debug)]
pub struct ResponseHead {
    version: String,
    status: StatusCode,
    reason: String,
    headers: FieldMap,
}

impl ResponseHead {
    /// Creates a head with the default version and the canonical reason phrase.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: DEFAULT_HTTP_VERSION.to_owned(),
            status,
            reason: status.canonical_reason().unwrap_or("").to_owned(),
            headers: FieldMap::new(),
        }
    }

    pub(crate) fn from_parts(version: String, status: StatusCode, reason: String, headers: FieldMap) -> Self {
        Self { version, status, reason, headers }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &FieldMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut FieldMap {
        &mut self.headers
    }

    /// Attaches an entity (or none), producing a full [`Response`].
    pub fn into_response(self, entity: Option<Entity>) -> Response {
        Response { head: self, entity }
    }
}

/// A complete response message.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    entity: Option<Entity>,
}

impl Response {
    /// Creates a bodyless response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self { head: ResponseHead::new(status), entity: None }
    }

    /// Creates a response carrying the given entity.
    ///
    /// The textual `content-length`/`transfer-encoding`/`content-encoding`
    /// headers are not derived from the entity flags; the caller keeps them
    /// in sync with the entity it attaches.
    pub fn with_entity(status: StatusCode, entity: Entity) -> Self {
        Self { head: ResponseHead::new(status), entity: Some(entity) }
    }

    /// Builds the pre-dispatch error answer for a failed request decode.
    ///
    /// The body is the error's message as plain text; connection-level errors
    /// still produce a head, but the caller should not attempt to send one
    /// for [`ParseError::ConnectionClosed`].
    pub fn from_parse_error(err: &ParseError) -> Self {
        let text = err.to_string();
        let mut response = Self::with_entity(err.status(), Entity::from_bytes(text.clone().into_bytes(), false, false));
        response.head.headers.insert("content-type", "text/plain");
        response.head.headers.insert("content-length", text.len().to_string());
        response
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut ResponseHead {
        &mut self.head
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn version(&self) -> &str {
        &self.head.version
    }

    pub fn headers(&self) -> &FieldMap {
        &self.head.headers
    }

    pub fn headers_mut(&mut self) -> &mut FieldMap {
        &mut self.head.headers
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.entity.as_mut()
    }

    pub fn set_entity(&mut self, entity: Option<Entity>) {
        self.entity = entity;
    }

    pub fn into_parts(self) -> (ResponseHead, Option<Entity>) {
        (self.head, self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_head_uses_canonical_reason() {
        let head = ResponseHead::new(StatusCode::NOT_FOUND);
        assert_eq!(head.reason(), "Not Found");
        assert_eq!(head.version(), "HTTP/1.1");
    }

    #[test]
    fn error_response_carries_plain_text_body() {
        let err = ParseError::invalid_method("BREW");
        let response = Response::from_parse_error(&err);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("content-type"), Some("text/plain"));

        let entity = response.entity().unwrap();
        let len: u64 = response.headers().get("content-length").unwrap().parse().unwrap();
        assert_eq!(entity.length().unwrap(), Some(len));
    }

    #[test]
    fn oversized_header_maps_to_431() {
        let err = ParseError::too_large_header(10000, 8192);
        assert_eq!(Response::from_parse_error(&err).status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
    }
}
