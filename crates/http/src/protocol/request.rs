//! Request representation: parsed head plus optional entity body.

use crate::protocol::{DEFAULT_HTTP_VERSION, Entity, FieldMap, Method, QueryParams};

/// The decoded start-line and header block of a request, without its body.
///
/// The path is kept as it appeared on the wire (not percent-decoded); the
/// query component is split off and decoded into [`QueryParams`].
#[derive(Debug)]
pub struct RequestHead {
    method: Method,
    path: String,
    query: QueryParams,
    version: String,
    headers: FieldMap,
}

impl RequestHead {
    /// Creates a head with the default `HTTP/1.1` version and empty headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            version: DEFAULT_HTTP_VERSION.to_owned(),
            headers: FieldMap::new(),
        }
    }

    pub(crate) fn from_parts(
        method: Method,
        path: String,
        query: QueryParams,
        version: String,
        headers: FieldMap,
    ) -> Self {
        Self { method, path, query, version, headers }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The path portion of the target, always starting at `/`, query excluded.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryParams {
        &mut self.query
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &FieldMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut FieldMap {
        &mut self.headers
    }

    /// The full request target for the wire: path plus re-encoded query.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.to_query_string())
        }
    }

    /// Attaches a decoded entity (or none), producing a full [`Request`].
    pub fn into_request(self, entity: Option<Entity>) -> Request {
        Request { head: self, entity }
    }
}

/// A fully decoded request: head plus the eagerly materialized entity body.
///
/// This is what one connection cycle hands to the dispatch layer; collaborators
/// access the body only through [`Entity::content`] and [`Entity::length`].
#[derive(Debug)]
pub struct Request {
    head: RequestHead,
    entity: Option<Entity>,
}

impl Request {
    /// Builds a request from a head and an optional outbound entity.
    pub fn from_parts(head: RequestHead, entity: Option<Entity>) -> Self {
        Self { head, entity }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut RequestHead {
        &mut self.head
    }

    pub fn method(&self) -> Method {
        self.head.method
    }

    pub fn path(&self) -> &str {
        &self.head.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.head.query
    }

    pub fn version(&self) -> &str {
        &self.head.version
    }

    pub fn headers(&self) -> &FieldMap {
        &self.head.headers
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.entity.as_mut()
    }

    pub fn into_parts(self) -> (RequestHead, Option<Entity>) {
        (self.head, self.entity)
    }
}
