use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.oapm.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OapmConfig {
    pub input: String,
    pub output: String,
    pub generator: GeneratorOptions,
}

impl Default for OapmConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "postman".to_string(),
            generator: GeneratorOptions::default(),
        }
    }
}

/// Options recognized by the Postman generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub folder_strategy: FolderStrategy,
    pub path_params_as_variables: bool,
    pub output_file: String,
    /// User-declared variable names, matched against synthesized bodies.
    #[serde(deserialize_with = "deserialize_name_list")]
    pub postman_variables: Vec<String>,
    /// Names replaced by a generated token at request-execution time.
    #[serde(deserialize_with = "deserialize_name_list")]
    pub generated_variables: Vec<String>,
    pub request_parameter_generation: RequestParameterGeneration,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            folder_strategy: FolderStrategy::Tags,
            path_params_as_variables: false,
            output_file: "postman.json".to_string(),
            postman_variables: Vec::new(),
            generated_variables: Vec::new(),
            request_parameter_generation: RequestParameterGeneration::Example,
        }
    }
}

/// Whether operations are placed in per-tag folders or in one flat list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FolderStrategy {
    Paths,
    #[default]
    Tags,
}

impl From<&str> for FolderStrategy {
    /// Any value other than `tags` (case-insensitive) selects the flat list.
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("tags") {
            FolderStrategy::Tags
        } else {
            FolderStrategy::Paths
        }
    }
}

impl From<String> for FolderStrategy {
    fn from(value: String) -> Self {
        FolderStrategy::from(value.as_str())
    }
}

/// Where request bodies come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RequestParameterGeneration {
    #[default]
    Example,
    Schema,
}

impl From<&str> for RequestParameterGeneration {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("schema") {
            RequestParameterGeneration::Schema
        } else {
            RequestParameterGeneration::Example
        }
    }
}

impl From<String> for RequestParameterGeneration {
    fn from(value: String) -> Self {
        RequestParameterGeneration::from(value.as_str())
    }
}

/// Split a dash-separated list of names, trimming each and dropping empties.
///
/// `"VAR1-VAR2   -VAR3"` → `["VAR1", "VAR2", "VAR3"]`
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split('-')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameList {
    Dashed(String),
    List(Vec<String>),
}

fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NameList::deserialize(deserializer)? {
        NameList::Dashed(s) => parse_name_list(&s),
        NameList::List(names) => names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oapm.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OapmConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: OapmConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oapm configuration
input: openapi.yaml
output: postman

generator:
  folder_strategy: Tags              # Tags | Paths
  path_params_as_variables: false    # create collection variables for path parameters
  output_file: postman.json
  request_parameter_generation: Example   # Example | Schema
  # postman_variables: "MERCHANT_ACCOUNT-API_KEY"   # dash-separated names found in bodies
  # generated_variables: "REFERENCE"                # replaced by {{$guid}}
"#
}
