use indexmap::IndexMap;

use super::examples::ExampleRegistry;
use super::operations::OperationDescriptor;

/// The read-only model handed to generators: every operation of the API plus
/// the shared definitions they refer to.
#[derive(Debug, Clone, Default)]
pub struct ApiModel {
    pub info: ApiInfo,
    pub servers: Vec<ServerDescriptor>,
    pub operations: Vec<OperationDescriptor>,
    pub examples: ExampleRegistry,
    pub auth: Option<AuthScheme>,
}

/// API metadata.
#[derive(Debug, Clone, Default)]
pub struct ApiInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// A server URL template with its variables.
#[derive(Debug, Clone)]
pub struct ServerDescriptor {
    pub url: String,
    pub variables: IndexMap<String, ServerVariableDescriptor>,
}

/// A server URL variable, e.g. `{region}` in `https://{region}.example.com`.
#[derive(Debug, Clone)]
pub struct ServerVariableDescriptor {
    pub default: String,
    pub description: Option<String>,
    pub enum_values: Vec<String>,
}

/// Collection-level authentication, taken from the first declared security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
    ApiKey { name: String, location: String },
    /// OAuth2, OpenID Connect, mutual TLS: not expressible as static auth.
    Other,
}
