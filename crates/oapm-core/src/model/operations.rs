use std::fmt;

use indexmap::IndexMap;

use super::examples::NamedExample;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP method + path combination of the API.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub method: HttpMethod,
    /// Path template in `{param}` syntax.
    pub path: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<ParameterDescriptor>,
    pub body: Option<BodyParameter>,
    pub responses: Vec<ResponseDescriptor>,
    /// Request media types, in declaration order.
    pub consumes: Vec<String>,
    /// Response media types across all responses, first occurrence order.
    pub produces: Vec<String>,
}

impl OperationDescriptor {
    /// An operation with no parameters, body or responses.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation_id: None,
            summary: None,
            description: None,
            method,
            path: path.into(),
            tags: Vec::new(),
            deprecated: false,
            parameters: Vec::new(),
            body: None,
            responses: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// The declared type of a parameter's schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    #[default]
    Unknown,
}

/// A path/query/header/cookie parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub data_type: DataType,
    pub required: bool,
    pub description: Option<String>,
    pub default_value: Option<serde_json::Value>,
    pub example: Option<serde_json::Value>,
}

impl ParameterDescriptor {
    /// The value a request should carry: the example, else the schema default.
    pub fn sample_value(&self) -> Option<String> {
        self.example
            .as_ref()
            .or(self.default_value.as_ref())
            .and_then(value_to_plain_string)
    }
}

/// Render a scalar as plain text: strings unquoted, null as nothing.
pub fn value_to_plain_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The request body of an operation.
#[derive(Debug, Clone, Default)]
pub struct BodyParameter {
    pub media_type: String,
    /// A single inline example (`example:` on the media type).
    pub example: Option<serde_json::Value>,
    /// Named examples (`examples:` on the media type), in declaration order.
    pub examples: IndexMap<String, NamedExample>,
    pub schema: Option<SchemaDescriptor>,
}

/// The shape of a body schema, flattened to its top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescriptor {
    pub fields: Vec<SchemaField>,
    /// The schema's own `example`.
    pub example: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Coarse kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Date,
    Boolean,
    Other,
}

/// One declared response of an operation.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    /// Status code as declared (`"200"`, `"4XX"`, `"default"`).
    pub code: String,
    pub description: String,
    pub content: IndexMap<String, MediaContent>,
}

impl ResponseDescriptor {
    pub fn json_content(&self) -> Option<&MediaContent> {
        self.content.get("application/json")
    }
}

/// Response payloads for one media type. Only named examples become
/// response items.
#[derive(Debug, Clone, Default)]
pub struct MediaContent {
    pub examples: IndexMap<String, NamedExample>,
}
