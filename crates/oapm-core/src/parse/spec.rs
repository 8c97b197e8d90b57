use indexmap::IndexMap;
use serde::Deserialize;

use super::components::Components;
use super::paths::PathItem;

/// Top-level OpenAPI 3.x document, reduced to what a collection needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    /// Only the first server becomes the collection base URL.
    #[serde(default)]
    pub servers: Vec<Server>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    pub components: Option<Components>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    pub title: String,

    pub description: Option<String>,

    pub version: String,
}

/// A server URL template such as `https://{region}.example.com/v{version}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerVariable {
    pub default: String,

    pub description: Option<String>,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
}
