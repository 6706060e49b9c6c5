//! Ordered string maps for header fields and query parameters.
//!
//! Both maps share the same shape: insertion order is preserved for
//! re-serialization, and a duplicate key keeps its original position while the
//! last value wins. Header keys are additionally normalized to lowercase on
//! insert; values keep their original casing.

use crate::protocol::ParseError;

/// An ordered header mapping with case-normalized keys.
///
/// Keys are lowercased on insert (header names are case-insensitive and vary
/// by sender); values are stored as given. Iteration yields entries in
/// insertion order, which is the order they are re-serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing the value of an existing key in place.
    ///
    /// The name is lowercased; the value is stored unchanged.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Looks up a field value; the name may be given in any casing.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Returns true if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered, percent-decoded query parameters.
///
/// Decoding follows form rules: `+` becomes a space, a pair without `=` yields
/// an empty value, and duplicate keys collapse to the last value (a documented
/// limitation of this map).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (the part after `?`, still percent-encoded).
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(raw).map_err(|e| ParseError::invalid_query(e.to_string()))?;

        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Inserts a parameter; a duplicate key keeps its position, last value wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a decoded parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Re-serializes the parameters as a percent-encoded query string.
    ///
    /// Returns an empty string when there are no parameters.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.entries).expect("string pairs always serialize")
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
