use std::fmt;

use oapm_core::model::HttpMethod;

/// Body text already escaped for embedding as a JSON string value.
///
/// Only the synthesizer builds these from raw text, so a value is escaped
/// exactly once. Variable rewriting edits the text in place without
/// re-escaping it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapedText(String);

impl EscapedText {
    pub(crate) fn from_escaped(text: String) -> Self {
        Self(text)
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    /// Rewrite the text. The rewrite must only move or insert characters
    /// that need no escaping (placeholder names, braces).
    pub(crate) fn rewrite(&mut self, f: impl FnOnce(&str) -> String) {
        self.0 = f(&self.0);
    }
}

impl fmt::Display for EscapedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One runnable request variant of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestItem {
    /// Example key this request was built from; empty for the default variant.
    pub id: String,
    pub name: String,
    pub body: EscapedText,
    pub method: HttpMethod,
    pub responses: Vec<ResponseItem>,
}

impl RequestItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        body: EscapedText,
        method: HttpMethod,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body,
            method,
            responses: Vec::new(),
        }
    }
}

/// A sample response attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseItem {
    /// Example key; pairs the response with the request of the same key.
    pub id: String,
    pub code: String,
    pub status: &'static str,
    pub name: String,
    pub body: EscapedText,
    /// Identity of the request this response ended up attached to.
    pub request_id: Option<String>,
}

/// A header or query entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub disabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
            disabled: false,
        }
    }
}

/// A `:name` segment of the request path and the value it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariable {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Status line of a declared response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub code: String,
    pub status: &'static str,
}

/// An operation ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PostmanOperation {
    pub name: String,
    pub description: Option<String>,
    pub method: HttpMethod,
    /// Path in `:param` form.
    pub path: String,
    pub path_segments: Vec<String>,
    pub tags: Vec<String>,
    pub headers: Vec<KeyValue>,
    pub query: Vec<KeyValue>,
    pub path_variables: Vec<PathVariable>,
    pub requests: Vec<RequestItem>,
    pub responses: Vec<ResponseStatus>,
}
