use indexmap::IndexMap;
use serde::Deserialize;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    /// The first non-null type, e.g. `string` for `[string, null]`.
    pub fn primary(&self) -> Option<&SchemaType> {
        match self {
            TypeSet::Single(t) => Some(t),
            TypeSet::Multiple(types) => types
                .iter()
                .find(|t| **t != SchemaType::Null)
                .or_else(|| types.first()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

/// A JSON Schema object, limited to the keywords that drive body synthesis
/// and parameter sample values.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeSet>,

    /// Only `date` changes the placeholder of a string field.
    pub format: Option<String>,

    pub description: Option<String>,

    #[serde(rename = "default")]
    pub default_value: Option<serde_json::Value>,

    #[serde(default)]
    pub properties: IndexMap<String, SchemaOrRef>,

    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "allOf", default)]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default)]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<SchemaOrRef>,

    pub example: Option<serde_json::Value>,
}
