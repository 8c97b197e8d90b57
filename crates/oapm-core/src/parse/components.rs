use indexmap::IndexMap;
use serde::Deserialize;

use super::example::ExampleOrRef;
use super::paths::{ParameterOrRef, RequestBodyOrRef, ResponseOrRef};
use super::schema::SchemaOrRef;

/// Reusable definitions addressed by `#/components/<section>/<name>`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default)]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(default)]
    pub examples: IndexMap<String, ExampleOrRef>,

    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Scheme kinds a collection can express; the rest deserialize as `Unsupported`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    pub description: Option<String>,

    /// Header, query or cookie name of an API key.
    pub name: Option<String>,

    #[serde(rename = "in")]
    pub location: Option<ApiKeyLocation>,

    /// HTTP auth scheme, e.g. `basic` or `bearer`.
    pub scheme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_scheme_types() {
        let oauth: SecurityScheme = serde_yaml_ng::from_str(
            r#"
type: oauth2
flows:
  clientCredentials:
    tokenUrl: https://auth.example.com/token
    scopes: {}
"#,
        )
        .unwrap();
        assert_eq!(oauth.scheme_type, SecuritySchemeType::Unsupported);

        let key: SecurityScheme =
            serde_yaml_ng::from_str("{type: apiKey, name: X-API-Key, in: header}").unwrap();
        assert_eq!(key.scheme_type, SecuritySchemeType::ApiKey);
        assert_eq!(key.location.map(|l| l.as_str()), Some("header"));
    }
}
