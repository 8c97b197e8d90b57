use std::collections::HashSet;

use indexmap::IndexMap;

use super::components::Components;
use super::media_type::MediaType;
use super::paths::{
    Operation, Parameter, ParameterOrRef, PathItem, RequestBody, RequestBodyOrRef, Response,
    ResponseOrRef,
};
use super::schema::{Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// An inline-or-`$ref` wrapper whose targets live in one components section.
trait Referable: Sized {
    type Target: Clone;
    const SECTION: &'static str;

    fn section(components: &Components) -> &IndexMap<String, Self>;
    fn split(&self) -> Result<&Self::Target, &str>;
}

impl Referable for ParameterOrRef {
    type Target = Parameter;
    const SECTION: &'static str = "parameters";

    fn section(components: &Components) -> &IndexMap<String, Self> {
        &components.parameters
    }

    fn split(&self) -> Result<&Parameter, &str> {
        match self {
            ParameterOrRef::Parameter(p) => Ok(p),
            ParameterOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

impl Referable for RequestBodyOrRef {
    type Target = RequestBody;
    const SECTION: &'static str = "requestBodies";

    fn section(components: &Components) -> &IndexMap<String, Self> {
        &components.request_bodies
    }

    fn split(&self) -> Result<&RequestBody, &str> {
        match self {
            RequestBodyOrRef::RequestBody(rb) => Ok(rb),
            RequestBodyOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

impl Referable for ResponseOrRef {
    type Target = Response;
    const SECTION: &'static str = "responses";

    fn section(components: &Components) -> &IndexMap<String, Self> {
        &components.responses
    }

    fn split(&self) -> Result<&Response, &str> {
        match self {
            ResponseOrRef::Response(r) => Ok(r),
            ResponseOrRef::Ref { ref_path } => Err(ref_path),
        }
    }
}

/// Inlines schema, parameter, request body and response `$ref` pointers.
/// Circular schema references are left in place.
///
/// Example references are kept as-is: they are looked up by name when request
/// items are built, and a dangling one simply yields no item.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
    visited: HashSet<String>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
            visited: HashSet::new(),
        }
    }

    /// Resolve every path, returning a copy with operation-level refs inlined.
    pub fn resolve_spec(&mut self, spec: &OpenApiSpec) -> Result<OpenApiSpec, ResolveError> {
        let mut resolved = spec.clone();

        for item in resolved.paths.values_mut() {
            self.resolve_path_item(item)?;
        }

        Ok(resolved)
    }

    fn resolve_path_item(&mut self, item: &mut PathItem) -> Result<(), ResolveError> {
        item.parameters = self.resolve_parameters(&item.parameters)?;

        for op in item.operations_mut() {
            self.resolve_operation(op)?;
        }
        Ok(())
    }

    fn resolve_operation(&mut self, op: &mut Operation) -> Result<(), ResolveError> {
        op.parameters = self.resolve_parameters(&op.parameters)?;

        if let Some(ref body) = op.request_body {
            let mut resolved = self.inline(body)?;
            self.resolve_media_types(&mut resolved.content)?;
            op.request_body = Some(RequestBodyOrRef::RequestBody(resolved));
        }

        for resp in op.responses.values_mut() {
            let mut resolved = self.inline(&*resp)?;
            self.resolve_media_types(&mut resolved.content)?;
            *resp = ResponseOrRef::Response(resolved);
        }
        Ok(())
    }

    fn resolve_parameters(
        &mut self,
        params: &[ParameterOrRef],
    ) -> Result<Vec<ParameterOrRef>, ResolveError> {
        params
            .iter()
            .map(|p| {
                let mut resolved = self.inline(p)?;
                if let Some(ref s) = resolved.schema {
                    resolved.schema = Some(self.resolve_schema_or_ref(s)?);
                }
                Ok(ParameterOrRef::Parameter(resolved))
            })
            .collect()
    }

    fn resolve_media_types(
        &mut self,
        content: &mut IndexMap<String, MediaType>,
    ) -> Result<(), ResolveError> {
        for mt in content.values_mut() {
            if let Some(ref s) = mt.schema {
                mt.schema = Some(self.resolve_schema_or_ref(s)?);
            }
        }
        Ok(())
    }

    pub fn resolve_schema_or_ref(
        &mut self,
        schema_or_ref: &SchemaOrRef,
    ) -> Result<SchemaOrRef, ResolveError> {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => {
                if self.visited.contains(ref_path) {
                    // Circular reference, left in place.
                    return Ok(schema_or_ref.clone());
                }
                self.visited.insert(ref_path.clone());
                let target = self.lookup_schema(ref_path)?;
                let result = self
                    .resolve_schema(&target)
                    .map(|s| SchemaOrRef::Schema(Box::new(s)));
                self.visited.remove(ref_path);
                result
            }
            SchemaOrRef::Schema(schema) => {
                let resolved = self.resolve_schema(schema)?;
                Ok(SchemaOrRef::Schema(Box::new(resolved)))
            }
        }
    }

    fn resolve_schema(&mut self, schema: &Schema) -> Result<Schema, ResolveError> {
        let mut resolved = schema.clone();

        for prop in resolved.properties.values_mut() {
            *prop = self.resolve_schema_or_ref(prop)?;
        }
        if let Some(ref items) = schema.items {
            resolved.items = Some(Box::new(self.resolve_schema_or_ref(items)?));
        }
        for list in [
            &mut resolved.all_of,
            &mut resolved.one_of,
            &mut resolved.any_of,
        ] {
            for member in list.iter_mut() {
                *member = self.resolve_schema_or_ref(member)?;
            }
        }
        Ok(resolved)
    }

    /// The inline value, or a copy of the component a `$ref` points at.
    fn inline<R: Referable>(&self, value: &R) -> Result<R::Target, ResolveError> {
        match value.split() {
            Ok(inline) => Ok(inline.clone()),
            Err(ref_path) => {
                let name = parse_ref_name(ref_path, R::SECTION)?;
                self.components
                    .and_then(|c| R::section(c).get(name))
                    .and_then(|target| target.split().ok())
                    .cloned()
                    .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
            }
        }
    }

    /// Follows at most one alias between schema components.
    fn lookup_schema(&self, ref_path: &str) -> Result<Schema, ResolveError> {
        let name = parse_ref_name(ref_path, "schemas")?;
        let schemas = self.components.map(|c| &c.schemas);
        let target = match schemas.and_then(|s| s.get(name)) {
            Some(SchemaOrRef::Ref { ref_path: alias }) => parse_ref_name(alias, "schemas")
                .ok()
                .and_then(|alias| schemas.and_then(|s| s.get(alias))),
            other => other,
        };
        match target {
            Some(SchemaOrRef::Schema(schema)) => Ok((**schema).clone()),
            _ => Err(ResolveError::RefTargetNotFound(ref_path.to_string())),
        }
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
