use indexmap::IndexMap;
use oapm_core::model::DataType;
use serde::Serialize;

use crate::items::RequestItem;

/// Placeholder Postman replaces with a fresh GUID on every request.
pub const GENERATED_PLACEHOLDER: &str = "{{$guid}}";

/// Path parameters bound to account variables regardless of their declared
/// defaults. Matched case-insensitively.
const ACCOUNT_OVERRIDES: &[(&str, &str)] = &[
    ("companyId", "{{YOUR_COMPANY_ACCOUNT}}"),
    ("merchantId", "{{YOUR_MERCHANT_ACCOUNT}}"),
];

/// Postman variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Any,
}

impl From<DataType> for VariableType {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::String => VariableType::String,
            DataType::Number | DataType::Integer => VariableType::Number,
            DataType::Boolean => VariableType::Boolean,
            DataType::Array | DataType::Object | DataType::Unknown => VariableType::Any,
        }
    }
}

/// A collection-level variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableType,
    pub value: String,
    pub description: Option<String>,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, kind: VariableType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Variables keyed by name, in registration order. The first declaration of a
/// name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    variables: IndexMap<String, VariableDeclaration>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable. Returns `false` when the name is already taken.
    pub fn insert(&mut self, declaration: VariableDeclaration) -> bool {
        if self.variables.contains_key(&declaration.name) {
            return false;
        }
        self.variables
            .insert(declaration.name.clone(), declaration);
        true
    }

    pub fn get(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.variables.values()
    }
}

/// `/users/{id}/cards` → `/users/:id/cards`
pub fn path_to_postman(path: &str) -> String {
    path.replace('{', ":").replace('}', "")
}

/// `/users/:id/cards` → `["users", ":id", "cards"]`
pub fn path_segments(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').map(String::from).collect()
}

/// Turn URL template braces into Postman placeholders: `{x}` → `{{x}}`.
/// Text already in placeholder form is left as is.
pub fn double_curly_braces(text: &str) -> String {
    text.replace("{{", "{")
        .replace("}}", "}")
        .replace('{', "{{")
        .replace('}', "}}")
}

/// The account placeholder for a path parameter, if it is one.
pub fn account_override(name: &str) -> Option<&'static str> {
    ACCOUNT_OVERRIDES
        .iter()
        .find(|(param, _)| param.eq_ignore_ascii_case(name))
        .map(|(_, placeholder)| *placeholder)
}

/// `name` in placeholder form.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Wrap every occurrence of `name` that is not already wrapped.
fn wrap_occurrences(text: &str, name: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(name) {
        let end = start + name.len();
        let wrapped = text[..start].ends_with("{{") && text[end..].starts_with("}}");
        out.push_str(&text[last..start]);
        if wrapped {
            out.push_str(name);
        } else {
            out.push_str(&placeholder(name));
        }
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Byte ranges of the `{{…}}` placeholders in `text`, braces included.
fn placeholder_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find("{{").map(|i| from + i) {
        let Some(close) = text[open + 2..].find("}}").map(|i| open + 2 + i + 2) else {
            break;
        };
        spans.push((open, close));
        from = close;
    }
    spans
}

/// Replace occurrences of `name` that do not sit inside a placeholder.
fn replace_outside_placeholders(text: &str, name: &str, replacement: &str) -> String {
    let spans = placeholder_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(name) {
        let end = start + name.len();
        if spans.iter().any(|&(open, close)| start >= open && end <= close) {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Turn configured names found in request and response bodies into
/// placeholders and register them as string variables with empty values.
///
/// Matching is plain substring matching, applied name by name in the order
/// given, so a name contained in another name also matches inside it.
pub fn apply_named_variables(
    requests: &mut [RequestItem],
    names: &[String],
    variables: &mut VariableSet,
) {
    for name in names.iter().filter(|n| !n.is_empty()) {
        for request in requests.iter_mut() {
            let bodies = std::iter::once(&mut request.body)
                .chain(request.responses.iter_mut().map(|r| &mut r.body));
            for body in bodies {
                if !body.contains(name) {
                    continue;
                }
                body.rewrite(|text| wrap_occurrences(text, name));
                variables.insert(VariableDeclaration::new(
                    name.as_str(),
                    VariableType::String,
                    "",
                ));
            }
        }
    }
}

/// Replace occurrences of the configured names with the generated-value
/// placeholder. Text already inside a placeholder is left alone, so a second
/// pass changes nothing. Nothing is registered.
pub fn apply_generated_variables(requests: &mut [RequestItem], names: &[String]) {
    for name in names.iter().filter(|n| !n.is_empty()) {
        for request in requests.iter_mut() {
            let bodies = std::iter::once(&mut request.body)
                .chain(request.responses.iter_mut().map(|r| &mut r.body));
            for body in bodies {
                if body.contains(name) {
                    body.rewrite(|text| {
                        replace_outside_placeholders(text, name, GENERATED_PLACEHOLDER)
                    });
                }
            }
        }
    }
}
