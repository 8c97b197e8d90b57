use serde::Deserialize;

/// A named sample payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Example {
    /// Becomes the request name when present.
    pub summary: Option<String>,

    pub description: Option<String>,

    pub value: Option<serde_json::Value>,
}

/// A shared `#/components/examples/*` reference or an inline example.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExampleOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Example(Example),
}
