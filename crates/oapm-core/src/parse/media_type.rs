use indexmap::IndexMap;
use serde::Deserialize;

use super::example::ExampleOrRef;
use super::schema::SchemaOrRef;

/// Content for one media type of a request or response body.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<SchemaOrRef>,

    pub example: Option<serde_json::Value>,

    /// Named examples, inline or referencing `#/components/examples/*`.
    #[serde(default)]
    pub examples: IndexMap<String, ExampleOrRef>,
}
