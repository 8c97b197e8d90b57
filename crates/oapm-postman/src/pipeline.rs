use oapm_core::config::GeneratorOptions;
use oapm_core::model::{
    ApiModel, ExampleRegistry, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    ServerDescriptor, ServerVariableDescriptor, value_to_plain_string,
};

use crate::builder::{RequestBuilder, display_name};
use crate::grouping::OperationGroups;
use crate::items::{KeyValue, PathVariable, PostmanOperation, ResponseStatus};
use crate::status::status_text;
use crate::variables::{
    self, VariableDeclaration, VariableSet, VariableType, account_override, double_curly_braces,
    path_segments, path_to_postman, placeholder,
};

/// Everything one run produces, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// First server URL in placeholder form; empty when no server is declared.
    pub base_url: String,
    pub variables: VariableSet,
    pub groups: OperationGroups,
}

/// Accumulates variables and grouped operations over one generation run.
///
/// A run starts empty and is consumed by [`GenerationRun::finish`], so
/// nothing carries over between runs.
pub struct GenerationRun<'a> {
    options: &'a GeneratorOptions,
    builder: RequestBuilder<'a>,
    base_url: Option<String>,
    variables: VariableSet,
    groups: OperationGroups,
}

impl<'a> GenerationRun<'a> {
    pub fn new(options: &'a GeneratorOptions, examples: &'a ExampleRegistry) -> Self {
        Self {
            options,
            builder: RequestBuilder::new(examples, options.request_parameter_generation),
            base_url: None,
            variables: VariableSet::new(),
            groups: OperationGroups::new(options.folder_strategy),
        }
    }

    /// Register server variables; the first server becomes the base URL.
    pub fn process_servers(&mut self, servers: &[ServerDescriptor]) {
        for server in servers {
            if self.base_url.is_none() {
                self.base_url = Some(double_curly_braces(&server.url));
            }
            for (name, variable) in &server.variables {
                self.variables.insert(
                    VariableDeclaration::new(
                        name.as_str(),
                        VariableType::String,
                        variable.default.as_str(),
                    )
                    .with_description(server_variable_description(variable)),
                );
            }
        }
    }

    pub fn process_operation(&mut self, op: &OperationDescriptor) {
        let name = display_name(op);
        let path_variables = self.path_variables(op);

        let path = path_to_postman(&op.path);
        let segments = path_segments(&path);

        let mut headers = Vec::new();
        if let Some(content_type) = op.consumes.first() {
            headers.push(KeyValue::new("Content-Type", content_type.as_str()));
        }
        if let Some(accept) = op.produces.first() {
            headers.push(KeyValue::new("Accept", accept.as_str()));
        }
        headers.extend(op.parameters_in(ParameterLocation::Header).map(key_value));
        let query = op
            .parameters_in(ParameterLocation::Query)
            .map(key_value)
            .collect();

        let mut requests = self.builder.build(op, &name);
        variables::apply_named_variables(
            &mut requests,
            &self.options.postman_variables,
            &mut self.variables,
        );
        variables::apply_generated_variables(&mut requests, &self.options.generated_variables);

        let responses = op
            .responses
            .iter()
            .map(|r| ResponseStatus {
                code: r.code.clone(),
                status: status_text(Some(&r.code)),
            })
            .collect();

        log::debug!("{} {} → '{name}'", op.method, path);

        self.groups.insert(PostmanOperation {
            name,
            description: op.description.clone(),
            method: op.method,
            path,
            path_segments: segments,
            tags: op.tags.clone(),
            headers,
            query,
            path_variables,
            requests,
            responses,
        });
    }

    /// Path variables with their values. With `path_params_as_variables`
    /// each one also becomes a collection variable and points at it.
    fn path_variables(&mut self, op: &OperationDescriptor) -> Vec<PathVariable> {
        op.parameters_in(ParameterLocation::Path)
            .map(|param| {
                let value = if self.options.path_params_as_variables {
                    self.variables.insert(VariableDeclaration::new(
                        param.name.as_str(),
                        VariableType::from(param.data_type),
                        param
                            .default_value
                            .as_ref()
                            .or(param.example.as_ref())
                            .and_then(value_to_plain_string)
                            .unwrap_or_default(),
                    ));
                    placeholder(&param.name)
                } else {
                    param.sample_value().unwrap_or_default()
                };
                let value = account_override(&param.name)
                    .map(String::from)
                    .unwrap_or(value);
                PathVariable {
                    key: param.name.clone(),
                    value,
                    description: param.description.clone(),
                }
            })
            .collect()
    }

    pub fn finish(self) -> GenerationOutput {
        GenerationOutput {
            base_url: self.base_url.unwrap_or_default(),
            variables: self.variables,
            groups: self.groups,
        }
    }
}

/// The declared description, followed by the allowed values when the
/// variable is an enumeration.
fn server_variable_description(variable: &ServerVariableDescriptor) -> Option<String> {
    let allowed = (!variable.enum_values.is_empty())
        .then(|| format!("one of: {}", variable.enum_values.join(", ")));
    match (variable.description.as_deref(), allowed) {
        (Some(description), Some(allowed)) => Some(format!("{description} ({allowed})")),
        (Some(description), None) => Some(description.to_string()),
        (None, allowed) => allowed,
    }
}

fn key_value(param: &ParameterDescriptor) -> KeyValue {
    let value = param.sample_value().unwrap_or_default();
    KeyValue {
        key: param.name.clone(),
        disabled: !param.required && value.is_empty(),
        value,
        description: param.description.clone(),
    }
}

/// Run the whole model through a fresh [`GenerationRun`].
pub fn run(model: &ApiModel, options: &GeneratorOptions) -> GenerationOutput {
    let mut run = GenerationRun::new(options, &model.examples);
    run.process_servers(&model.servers);
    for op in &model.operations {
        run.process_operation(op);
    }
    run.finish()
}
