use indexmap::IndexMap;

use crate::error::TransformError;
use crate::model::*;
use crate::parse::components::{ApiKeyLocation, SecuritySchemeType};
use crate::parse::example::ExampleOrRef;
use crate::parse::media_type::MediaType;
use crate::parse::paths::{
    self, Operation, ParameterOrRef, PathItem, RequestBodyOrRef, ResponseOrRef,
};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::OpenApiSpec;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Transform a parsed OpenAPI spec into the operation model.
pub fn transform(spec: &OpenApiSpec) -> Result<ApiModel, TransformError> {
    // Phase 1: Resolve all $ref pointers
    let mut resolver = RefResolver::new(spec);
    let resolved = resolver.resolve_spec(spec)?;

    // Phase 2: Shared examples
    let examples = build_example_registry(&resolved);

    // Phase 3: Operations, in path then method order
    let mut operations = Vec::new();
    for (path, path_item) in &resolved.paths {
        collect_operations(path, path_item, &mut operations);
    }

    let info = ApiInfo {
        title: resolved.info.title.clone(),
        description: resolved.info.description.clone(),
        version: resolved.info.version.clone(),
    };

    let servers = resolved
        .servers
        .iter()
        .map(|s| ServerDescriptor {
            url: s.url.clone(),
            variables: s
                .variables
                .iter()
                .map(|(name, v)| {
                    (
                        name.clone(),
                        ServerVariableDescriptor {
                            default: v.default.clone(),
                            description: v.description.clone(),
                            enum_values: v.enum_values.clone(),
                        },
                    )
                })
                .collect(),
        })
        .collect();

    log::debug!(
        "transformed {} operations, {} shared examples",
        operations.len(),
        examples.len()
    );

    Ok(ApiModel {
        info,
        servers,
        operations,
        examples,
        auth: resolve_auth(&resolved),
    })
}

fn build_example_registry(spec: &OpenApiSpec) -> ExampleRegistry {
    let Some(ref components) = spec.components else {
        return ExampleRegistry::default();
    };

    let mut examples = IndexMap::new();
    for (name, example_or_ref) in &components.examples {
        let example = match example_or_ref {
            ExampleOrRef::Example(e) => Some(to_model_example(e)),
            // One level of aliasing between shared examples.
            ExampleOrRef::Ref { ref_path } => components
                .examples
                .get(example_name_from_ref(ref_path))
                .and_then(|target| match target {
                    ExampleOrRef::Example(e) => Some(to_model_example(e)),
                    ExampleOrRef::Ref { .. } => None,
                }),
        };
        match example {
            Some(example) => {
                examples.insert(name.clone(), example);
            }
            None => log::warn!("shared example '{name}' points at no example, skipping"),
        }
    }
    ExampleRegistry::new(examples)
}

fn to_model_example(example: &crate::parse::example::Example) -> Example {
    Example {
        summary: example.summary.clone(),
        description: example.description.clone(),
        value: example.value.clone(),
    }
}

fn collect_operations(path: &str, item: &PathItem, out: &mut Vec<OperationDescriptor>) {
    let path_params = resolve_parameters(&item.parameters);

    for (method, op) in item.operations() {
        out.push(build_operation(method, path, op, &path_params));
    }
}

fn build_operation(
    method: HttpMethod,
    path: &str,
    op: &Operation,
    path_params: &[ParameterDescriptor],
) -> OperationDescriptor {
    // Operation-level parameters override path-level ones with the same name and location.
    let op_params = resolve_parameters(&op.parameters);
    let mut parameters: Vec<ParameterDescriptor> = path_params
        .iter()
        .filter(|p| {
            !op_params
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    parameters.extend(op_params);

    let mut consumes = Vec::new();
    let body = match op.request_body {
        Some(RequestBodyOrRef::RequestBody(ref rb)) => {
            consumes.extend(rb.content.keys().cloned());
            select_media_type(&rb.content).map(|(media_type, mt)| BodyParameter {
                media_type: media_type.clone(),
                example: mt.example.clone(),
                examples: to_named_examples(&mt.examples),
                schema: mt.schema.as_ref().and_then(to_schema_descriptor),
            })
        }
        // Should already be resolved
        _ => None,
    };

    let mut produces: Vec<String> = Vec::new();
    let mut responses = Vec::new();
    for (code, resp) in &op.responses {
        let ResponseOrRef::Response(r) = resp else {
            log::warn!("unresolved response {code} on {} {path}", method);
            continue;
        };
        for media_type in r.content.keys() {
            if !produces.contains(media_type) {
                produces.push(media_type.clone());
            }
        }
        responses.push(ResponseDescriptor {
            code: code.clone(),
            description: r.description.clone(),
            content: r
                .content
                .iter()
                .map(|(media_type, mt)| (media_type.clone(), to_media_content(mt)))
                .collect(),
        });
    }

    OperationDescriptor {
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        method,
        path: path.to_string(),
        tags: op.tags.clone(),
        deprecated: op.deprecated,
        parameters,
        body,
        responses,
        consumes,
        produces,
    }
}

/// Prefer `application/json`, fall back to the first content type.
fn select_media_type(content: &IndexMap<String, MediaType>) -> Option<(&String, &MediaType)> {
    content
        .get_key_value(JSON_MEDIA_TYPE)
        .or_else(|| content.first())
}

fn to_media_content(mt: &MediaType) -> MediaContent {
    MediaContent {
        examples: to_named_examples(&mt.examples),
    }
}

fn to_named_examples(examples: &IndexMap<String, ExampleOrRef>) -> IndexMap<String, NamedExample> {
    examples
        .iter()
        .map(|(key, e)| {
            let named = match e {
                ExampleOrRef::Ref { ref_path } => NamedExample::Ref(ref_path.clone()),
                ExampleOrRef::Example(example) => NamedExample::Inline(to_model_example(example)),
            };
            (key.clone(), named)
        })
        .collect()
}

fn resolve_parameters(params: &[ParameterOrRef]) -> Vec<ParameterDescriptor> {
    params
        .iter()
        .filter_map(|p| match p {
            ParameterOrRef::Parameter(param) => {
                let location = match param.location {
                    paths::ParameterLocation::Path => ParameterLocation::Path,
                    paths::ParameterLocation::Query => ParameterLocation::Query,
                    paths::ParameterLocation::Header => ParameterLocation::Header,
                    paths::ParameterLocation::Cookie => ParameterLocation::Cookie,
                };
                let schema = match param.schema {
                    Some(SchemaOrRef::Schema(ref s)) => Some(&**s),
                    _ => None,
                };
                Some(ParameterDescriptor {
                    name: param.name.clone(),
                    location,
                    data_type: schema.map(data_type_of).unwrap_or_default(),
                    required: param.required,
                    description: param.description.clone(),
                    default_value: schema.and_then(|s| s.default_value.clone()),
                    example: param
                        .sample()
                        .or_else(|| schema.and_then(|s| s.example.as_ref()))
                        .cloned(),
                })
            }
            ParameterOrRef::Ref { .. } => None, // Should already be resolved
        })
        .collect()
}

fn data_type_of(schema: &Schema) -> DataType {
    match schema.schema_type.as_ref().and_then(|t| t.primary()) {
        Some(SchemaType::String) => DataType::String,
        Some(SchemaType::Number) => DataType::Number,
        Some(SchemaType::Integer) => DataType::Integer,
        Some(SchemaType::Boolean) => DataType::Boolean,
        Some(SchemaType::Array) => DataType::Array,
        Some(SchemaType::Object) => DataType::Object,
        Some(SchemaType::Null) | None => DataType::Unknown,
    }
}

/// Flatten a body schema to its top-level fields. Members of `allOf` contribute
/// their properties in declaration order, ahead of the schema's own.
fn to_schema_descriptor(schema_or_ref: &SchemaOrRef) -> Option<SchemaDescriptor> {
    let SchemaOrRef::Schema(schema) = schema_or_ref else {
        // Circular reference left in place by the resolver.
        return None;
    };
    let mut fields = Vec::new();
    collect_fields(schema, &mut fields);
    Some(SchemaDescriptor {
        fields,
        example: schema.example.clone(),
    })
}

fn collect_fields(schema: &Schema, out: &mut Vec<SchemaField>) {
    for member in &schema.all_of {
        if let SchemaOrRef::Schema(member) = member {
            collect_fields(member, out);
        }
    }
    for (name, prop) in &schema.properties {
        if out.iter().any(|f| &f.name == name) {
            continue;
        }
        let kind = match prop {
            SchemaOrRef::Schema(s) => field_kind_of(s),
            SchemaOrRef::Ref { .. } => FieldKind::Other,
        };
        out.push(SchemaField::new(name.clone(), kind));
    }
}

fn field_kind_of(schema: &Schema) -> FieldKind {
    match schema.schema_type.as_ref().and_then(|t| t.primary()) {
        Some(SchemaType::Number | SchemaType::Integer) => FieldKind::Number,
        Some(SchemaType::String) if schema.format.as_deref() == Some("date") => FieldKind::Date,
        Some(SchemaType::String) => FieldKind::String,
        Some(SchemaType::Boolean) => FieldKind::Boolean,
        _ => FieldKind::Other,
    }
}

fn resolve_auth(spec: &OpenApiSpec) -> Option<AuthScheme> {
    let (_, scheme) = spec.components.as_ref()?.security_schemes.first()?;
    let auth = match scheme.scheme_type {
        SecuritySchemeType::Http => match scheme.scheme.as_deref().map(str::to_ascii_lowercase) {
            Some(ref s) if s == "basic" => AuthScheme::Basic,
            Some(ref s) if s == "bearer" => AuthScheme::Bearer,
            _ => AuthScheme::Other,
        },
        SecuritySchemeType::ApiKey => AuthScheme::ApiKey {
            name: scheme.name.clone().unwrap_or_default(),
            location: scheme
                .location
                .unwrap_or(ApiKeyLocation::Header)
                .as_str()
                .to_string(),
        },
        SecuritySchemeType::Unsupported => AuthScheme::Other,
    };
    Some(auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(field_kind_of(&schema("type: integer")), FieldKind::Number);
        assert_eq!(field_kind_of(&schema("type: number")), FieldKind::Number);
        assert_eq!(
            field_kind_of(&schema("{type: string, format: date}")),
            FieldKind::Date
        );
        assert_eq!(
            field_kind_of(&schema("{type: string, format: date-time}")),
            FieldKind::String
        );
        assert_eq!(field_kind_of(&schema("type: boolean")), FieldKind::Boolean);
        assert_eq!(field_kind_of(&schema("type: array")), FieldKind::Other);
    }

    #[test]
    fn test_all_of_fields_merge_in_order() {
        let s = schema(
            r#"
allOf:
  - properties:
      id: {type: integer}
  - properties:
      name: {type: string}
properties:
  id: {type: string}
  born: {type: string, format: date}
"#,
        );
        let descriptor = to_schema_descriptor(&SchemaOrRef::Schema(Box::new(s))).unwrap();
        assert_eq!(
            descriptor.fields,
            vec![
                SchemaField::new("id", FieldKind::Number),
                SchemaField::new("name", FieldKind::String),
                SchemaField::new("born", FieldKind::Date),
            ]
        );
    }

    #[test]
    fn test_nullable_type_set() {
        assert_eq!(
            data_type_of(&schema("type: [\"null\", integer]")),
            DataType::Integer
        );
        assert_eq!(data_type_of(&schema("description: any")), DataType::Unknown);
    }
}
