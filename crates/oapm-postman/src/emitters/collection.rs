use minijinja::{AutoEscape, Environment, Value, context};
use oapm_core::model::{ApiInfo, AuthScheme};
use serde_json::json;

use super::{BASE_URL_PLACEHOLDER, COLLECTION_SCHEMA};
use crate::error::PostmanError;
use crate::items::{KeyValue, PostmanOperation, RequestItem, ResponseItem};
use crate::pipeline::GenerationOutput;
use crate::status::status_code;
use crate::synthesizer::escape_text;

/// Escape free text for a JSON string literal.
fn escape_json(value: String) -> String {
    escape_text(&value)
}

/// Render the Postman v2.1 collection document.
pub fn emit_collection(
    info: &ApiInfo,
    auth: Option<&AuthScheme>,
    output: &GenerationOutput,
) -> Result<String, PostmanError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    // Bodies arrive pre-escaped; free text goes through `escape_json`.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("escape_json", escape_json);
    env.add_global("base_host", BASE_URL_PLACEHOLDER);
    env.add_template(
        "collection.json.j2",
        include_str!("../../templates/collection.json.j2"),
    )?;
    let tmpl = env.get_template("collection.json.j2")?;

    let folders: Vec<Value> = output
        .groups
        .buckets()
        .into_iter()
        .map(|(name, ops)| {
            context! {
                name => name,
                operations => ops.iter().map(build_operation).collect::<Vec<_>>(),
            }
        })
        .collect();

    let auth = auth.map(auth_json).transpose()?.flatten();
    let variables: Vec<_> = output.variables.iter().collect();

    let rendered = tmpl.render(context! {
        title => info.title.clone(),
        description => info.description.clone(),
        version => info.version.clone(),
        schema => COLLECTION_SCHEMA,
        folders => folders,
        auth => auth,
        base_url => output.base_url.clone(),
        variables => variables,
    })?;
    Ok(rendered)
}

fn build_operation(op: &PostmanOperation) -> Value {
    context! {
        path => op.path.clone(),
        description => op.description.clone(),
        raw_url => raw_url(op),
        path_segments => op.path_segments.clone(),
        headers => op.headers.iter().map(build_key_value).collect::<Vec<_>>(),
        query => op.query.iter().map(build_key_value).collect::<Vec<_>>(),
        path_variables => op
            .path_variables
            .iter()
            .map(|v| context! {
                key => v.key.clone(),
                value => v.value.clone(),
                description => v.description.clone(),
            })
            .collect::<Vec<_>>(),
        requests => op.requests.iter().map(build_request).collect::<Vec<_>>(),
    }
}

/// `{{baseUrl}}/users/:id?limit=10`; disabled query entries are left out.
fn raw_url(op: &PostmanOperation) -> String {
    let query: Vec<String> = op
        .query
        .iter()
        .filter(|q| !q.disabled)
        .map(|q| format!("{}={}", q.key, q.value))
        .collect();
    if query.is_empty() {
        format!("{BASE_URL_PLACEHOLDER}{}", op.path)
    } else {
        format!("{BASE_URL_PLACEHOLDER}{}?{}", op.path, query.join("&"))
    }
}

fn build_key_value(kv: &KeyValue) -> Value {
    context! {
        key => kv.key.clone(),
        value => kv.value.clone(),
        description => kv.description.clone(),
        disabled => kv.disabled,
    }
}

fn build_request(req: &RequestItem) -> Value {
    context! {
        name => req.name.clone(),
        method => req.method.as_str(),
        body => req.body.as_str(),
        responses => req.responses.iter().map(build_response).collect::<Vec<_>>(),
    }
}

fn build_response(resp: &ResponseItem) -> Value {
    context! {
        name => resp.name.clone(),
        status => resp.status,
        code_number => status_code(&resp.code),
        body => resp.body.as_str(),
    }
}

/// Collection-level auth block, with credentials left as placeholders.
fn auth_json(auth: &AuthScheme) -> Result<Option<String>, PostmanError> {
    let value = match auth {
        AuthScheme::Basic => json!({
            "type": "basic",
            "basic": [
                {"key": "username", "value": "{{username}}", "type": "string"},
                {"key": "password", "value": "{{password}}", "type": "string"},
            ],
        }),
        AuthScheme::Bearer => json!({
            "type": "bearer",
            "bearer": [
                {"key": "token", "value": "{{bearerToken}}", "type": "string"},
            ],
        }),
        AuthScheme::ApiKey { name, location } => json!({
            "type": "apikey",
            "apikey": [
                {"key": "key", "value": name, "type": "string"},
                {"key": "value", "value": "{{apiKey}}", "type": "string"},
                {"key": "in", "value": location, "type": "string"},
            ],
        }),
        AuthScheme::Other => return Ok(None),
    };
    Ok(Some(serde_json::to_string_pretty(&value)?))
}
