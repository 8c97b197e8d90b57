use oapm_core::config::RequestParameterGeneration;
use oapm_core::model::{
    BodyParameter, ExampleRegistry, HttpMethod, NamedExample, OperationDescriptor,
    ResponseDescriptor, SchemaDescriptor,
};

use crate::items::{EscapedText, RequestItem, ResponseItem};
use crate::status::status_text;
use crate::synthesizer::{example_to_json, schema_to_json};

/// Human-readable operation name: summary, else operationId, else the HTTP
/// method. Deprecated operations are marked.
pub fn display_name(op: &OperationDescriptor) -> String {
    let name = op
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(op.operation_id.as_deref())
        .unwrap_or(op.method.as_str());
    if op.deprecated {
        format!("{name} (DEPRECATED)")
    } else {
        name.to_string()
    }
}

/// Builds the request variants of an operation and pairs them with sample
/// responses.
pub struct RequestBuilder<'a> {
    examples: &'a ExampleRegistry,
    strategy: RequestParameterGeneration,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(examples: &'a ExampleRegistry, strategy: RequestParameterGeneration) -> Self {
        Self { examples, strategy }
    }

    /// One request per body variant, each carrying the responses that belong
    /// to it.
    pub fn build(&self, op: &OperationDescriptor, name: &str) -> Vec<RequestItem> {
        let mut requests = match op.body {
            Some(ref body) => self.body_requests(body, name, op.method),
            None => vec![RequestItem::new("", name, EscapedText::empty(), op.method)],
        };

        let responses: Vec<ResponseItem> = op
            .responses
            .iter()
            .flat_map(|r| self.response_examples(r))
            .collect();
        attach_responses(&mut requests, &responses);

        log::debug!(
            "{} {}: {} request(s), {} response example(s)",
            op.method,
            op.path,
            requests.len(),
            responses.len()
        );
        requests
    }

    fn body_requests(
        &self,
        body: &BodyParameter,
        name: &str,
        method: HttpMethod,
    ) -> Vec<RequestItem> {
        if self.strategy == RequestParameterGeneration::Schema {
            return vec![RequestItem::new("", name, synthesize(body.schema.as_ref()), method)];
        }

        if !body.examples.is_empty() {
            return body
                .examples
                .iter()
                .filter_map(|(key, named)| {
                    let Some(example) = self.examples.resolve(named) else {
                        log::debug!("example '{key}' refers to no shared example, skipping");
                        return None;
                    };
                    let item_name = example
                        .summary
                        .as_deref()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(name);
                    Some(RequestItem::new(
                        key.as_str(),
                        item_name,
                        example_to_json(example.value.as_ref()),
                        method,
                    ))
                })
                .collect();
        }

        let text = match (&body.example, body.schema.as_ref()) {
            (Some(example), _) => example_to_json(Some(example)),
            (None, Some(SchemaDescriptor {
                example: Some(example),
                ..
            })) => example_to_json(Some(example)),
            (None, schema) => synthesize(schema),
        };
        vec![RequestItem::new("", name, text, method)]
    }

    /// Sample responses from the named examples of the JSON content.
    fn response_examples(&self, response: &ResponseDescriptor) -> Vec<ResponseItem> {
        let Some(content) = response.json_content() else {
            return Vec::new();
        };
        content
            .examples
            .iter()
            .filter_map(|(key, named)| {
                let example = self.examples.resolve(named).or_else(|| {
                    if let NamedExample::Ref(r) = named {
                        log::debug!("response example '{key}' refers to missing {r}, skipping");
                    }
                    None
                })?;
                Some(ResponseItem {
                    id: key.clone(),
                    code: response.code.clone(),
                    status: status_text(Some(&response.code)),
                    name: response.description.clone(),
                    body: example_to_json(example.value.as_ref()),
                    request_id: None,
                })
            })
            .collect()
    }
}

fn synthesize(schema: Option<&SchemaDescriptor>) -> EscapedText {
    match schema {
        Some(schema) => schema_to_json(schema),
        None => schema_to_json(&SchemaDescriptor::default()),
    }
}

/// Give every request the responses sharing its identity. A GET request with
/// no match gets the first response of the operation.
fn attach_responses(requests: &mut [RequestItem], responses: &[ResponseItem]) {
    for request in requests.iter_mut() {
        let mut matched: Vec<ResponseItem> = responses
            .iter()
            .filter(|r| r.id == request.id)
            .cloned()
            .collect();
        if matched.is_empty() && request.method == HttpMethod::Get {
            matched.extend(responses.first().cloned());
        }
        for response in &mut matched {
            response.request_id = Some(request.id.clone());
        }
        request.responses = matched;
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use oapm_core::model::{
        Example, FieldKind, MediaContent, ResponseDescriptor, SchemaField,
    };
    use serde_json::json;

    use super::*;

    fn example(summary: Option<&str>, value: serde_json::Value) -> Example {
        Example {
            summary: summary.map(String::from),
            description: None,
            value: Some(value),
        }
    }

    fn registry() -> ExampleRegistry {
        let mut examples = IndexMap::new();
        examples.insert(
            "shared".to_string(),
            example(Some("Shared example"), json!({"from": "registry"})),
        );
        ExampleRegistry::new(examples)
    }

    fn response(code: &str, examples: &[(&str, NamedExample)]) -> ResponseDescriptor {
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaContent {
                examples: examples
                    .iter()
                    .map(|(k, e)| (k.to_string(), e.clone()))
                    .collect(),
            },
        );
        ResponseDescriptor {
            code: code.to_string(),
            description: format!("response {code}"),
            content,
        }
    }

    fn inline(value: serde_json::Value) -> NamedExample {
        NamedExample::Inline(example(None, value))
    }

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor {
            fields: vec![SchemaField::new("id", FieldKind::Number)],
            example: None,
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut op = OperationDescriptor::new(HttpMethod::Post, "/x");
        assert_eq!(display_name(&op), "POST");
        op.operation_id = Some("createX".to_string());
        assert_eq!(display_name(&op), "createX");
        op.summary = Some("Create an X".to_string());
        assert_eq!(display_name(&op), "Create an X");
        op.deprecated = true;
        assert_eq!(display_name(&op), "Create an X (DEPRECATED)");
    }

    #[test]
    fn test_no_body_gives_one_empty_request() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let op = OperationDescriptor::new(HttpMethod::Delete, "/x");
        let requests = builder.build(&op, "Delete");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "");
        assert!(requests[0].body.is_empty());
        assert_eq!(requests[0].method, HttpMethod::Delete);
    }

    #[test]
    fn test_named_examples_one_request_each() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Post, "/x");
        let mut examples = IndexMap::new();
        examples.insert(
            "first".to_string(),
            NamedExample::Inline(example(Some("First"), json!({"n": 1}))),
        );
        examples.insert(
            "second".to_string(),
            NamedExample::Ref("#/components/examples/shared".to_string()),
        );
        examples.insert(
            "gone".to_string(),
            NamedExample::Ref("#/components/examples/missing".to_string()),
        );
        examples.insert("unnamed".to_string(), inline(json!({"n": 3})));
        op.body = Some(BodyParameter {
            media_type: "application/json".to_string(),
            examples,
            schema: Some(schema()),
            ..BodyParameter::default()
        });

        let requests = builder.build(&op, "Create");
        let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "unnamed"]);
        let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Shared example", "Create"]);
        assert_eq!(
            requests[1].body.as_str(),
            r#"{\n \"from\": \"registry\"\n}"#
        );
    }

    #[test]
    fn test_inline_example_before_schema_example() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Post, "/x");
        op.body = Some(BodyParameter {
            media_type: "application/json".to_string(),
            example: Some(json!({"inline": true})),
            schema: Some(SchemaDescriptor {
                fields: vec![],
                example: Some(json!({"schema": true})),
            }),
            ..BodyParameter::default()
        });
        let requests = builder.build(&op, "Create");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "");
        assert_eq!(requests[0].body.as_str(), r#"{\n \"inline\": true\n}"#);

        if let Some(ref mut body) = op.body {
            body.example = None;
        }
        let requests = builder.build(&op, "Create");
        assert_eq!(requests[0].body.as_str(), r#"{\n \"schema\": true\n}"#);
    }

    #[test]
    fn test_schema_synthesis_fallback() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Put, "/x");
        op.body = Some(BodyParameter {
            media_type: "application/json".to_string(),
            schema: Some(schema()),
            ..BodyParameter::default()
        });
        let requests = builder.build(&op, "Put");
        assert_eq!(requests[0].body.as_str(), r#"{\n \"id\": \"<number>\"\n}"#);
    }

    #[test]
    fn test_schema_strategy_ignores_examples() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Schema);
        let mut op = OperationDescriptor::new(HttpMethod::Post, "/x");
        let mut examples = IndexMap::new();
        examples.insert("a".to_string(), inline(json!({"n": 1})));
        op.body = Some(BodyParameter {
            media_type: "application/json".to_string(),
            example: Some(json!({"inline": true})),
            examples,
            schema: Some(schema()),
        });
        let requests = builder.build(&op, "Create");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "");
        assert_eq!(requests[0].body.as_str(), r#"{\n \"id\": \"<number>\"\n}"#);
    }

    #[test]
    fn test_responses_pair_by_identity() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Post, "/x");
        let mut examples = IndexMap::new();
        examples.insert("a".to_string(), inline(json!({"n": 1})));
        examples.insert("b".to_string(), inline(json!({"n": 2})));
        op.body = Some(BodyParameter {
            media_type: "application/json".to_string(),
            examples,
            ..BodyParameter::default()
        });
        op.responses = vec![
            response("200", &[("a", inline(json!({"ok": "a"})))]),
            response("422", &[("a", inline(json!({"err": "a"})))]),
        ];

        let requests = builder.build(&op, "Create");
        assert_eq!(requests[0].responses.len(), 2);
        assert_eq!(requests[0].responses[0].status, "OK");
        assert_eq!(requests[0].responses[1].status, "Unprocessable Entity");
        assert_eq!(requests[0].responses[1].name, "response 422");
        assert!(
            requests[0]
                .responses
                .iter()
                .all(|r| r.request_id.as_deref() == Some("a"))
        );
        // non-GET requests get no fallback
        assert!(requests[1].responses.is_empty());
    }

    #[test]
    fn test_get_pairs_with_first_response_only() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Get, "/x");
        op.responses = vec![
            response("200", &[
                ("basic", inline(json!({"id": 1}))),
                ("full", inline(json!({"id": 2}))),
            ]),
            response("404", &[("missing", inline(json!({"error": "nope"})))]),
        ];

        let requests = builder.build(&op, "Get");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].responses.len(), 1);
        let paired = &requests[0].responses[0];
        assert_eq!(paired.id, "basic");
        assert_eq!(paired.code, "200");
        assert_eq!(paired.request_id.as_deref(), Some(""));
    }

    #[test]
    fn test_response_without_named_examples() {
        let registry = registry();
        let builder = RequestBuilder::new(&registry, RequestParameterGeneration::Example);
        let mut op = OperationDescriptor::new(HttpMethod::Get, "/x");
        op.responses = vec![
            ResponseDescriptor {
                code: "default".to_string(),
                description: "Error".to_string(),
                content: IndexMap::new(),
            },
            response("200", &[(
                "ref",
                NamedExample::Ref("#/components/examples/shared".to_string()),
            )]),
        ];
        let requests = builder.build(&op, "Get");
        assert_eq!(requests[0].responses.len(), 1);
        assert_eq!(requests[0].responses[0].status, "OK");
        assert_eq!(
            requests[0].responses[0].body.as_str(),
            r#"{\n \"from\": \"registry\"\n}"#
        );
    }
}
