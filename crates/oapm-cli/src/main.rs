use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oapm_core::config::{
    self, CONFIG_FILE_NAME, FolderStrategy, GeneratorOptions, OapmConfig,
    RequestParameterGeneration,
};
use oapm_core::model::ApiModel;
use oapm_core::parse::{self, spec::OpenApiSpec};
use oapm_core::transform;
use oapm_core::{CodeGenerator, GeneratedFile};
use oapm_postman::PostmanGenerator;
use oapm_postman::pipeline::{self, GenerationOutput};

#[derive(Parser)]
#[command(
    name = "oapm",
    about = "Generate Postman collections from OpenAPI 3.x specs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Postman collection from an OpenAPI spec
    Generate(GenerateArgs),

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the requests and responses each operation would produce
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new oapm configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Flags override the values from `.oapm.yaml` one by one.
#[derive(Args)]
struct GenerateArgs {
    /// Path to the OpenAPI spec file (YAML or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Folder strategy: Tags or Paths
    #[arg(long)]
    folder_strategy: Option<String>,

    /// Create collection variables for path parameters
    #[arg(long)]
    path_params_as_variables: bool,

    /// Dash-separated names to turn into collection variables, e.g. "VAR1-VAR2"
    #[arg(long)]
    postman_variables: Option<String>,

    /// Dash-separated names to replace with a generated value
    #[arg(long)]
    generated_variables: Option<String>,

    /// Request body source: Example or Schema
    #[arg(long)]
    request_parameter_generation: Option<String>,

    /// Name of the collection file
    #[arg(long)]
    output_file: Option<String>,
}

impl GenerateArgs {
    fn apply(&self, cfg: &mut OapmConfig) {
        if let Some(ref input) = self.input {
            cfg.input = input.display().to_string();
        }
        if let Some(ref output) = self.output {
            cfg.output = output.display().to_string();
        }
        let options = &mut cfg.generator;
        if let Some(ref strategy) = self.folder_strategy {
            options.folder_strategy = FolderStrategy::from(strategy.as_str());
        }
        if self.path_params_as_variables {
            options.path_params_as_variables = true;
        }
        if let Some(ref names) = self.postman_variables {
            options.postman_variables = config::parse_name_list(names);
        }
        if let Some(ref names) = self.generated_variables {
            options.generated_variables = config::parse_name_list(names);
        }
        if let Some(ref generation) = self.request_parameter_generation {
            options.request_parameter_generation =
                RequestParameterGeneration::from(generation.as_str());
        }
        if let Some(ref file) = self.output_file {
            options.output_file = file.clone();
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oapm", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OapmConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Read and parse a spec; `.json` files are parsed as JSON, anything else as YAML.
fn read_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

fn load_model(path: &Path) -> Result<ApiModel> {
    let parsed = read_spec(path)?;
    let model = transform::transform(&parsed)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Ok(model)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    args.apply(&mut cfg);

    let input = PathBuf::from(&cfg.input);
    let model = load_model(&input)?;

    let output_dir = PathBuf::from(&cfg.output);
    eprintln!("Generating {} → {}", input.display(), output_dir.display());

    let files = PostmanGenerator
        .generate(&model, &cfg.generator)
        .map_err(|e| anyhow::anyhow!(e))?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &files)?;

    eprintln!(
        "Generated {} operations into {}",
        model.operations.len(),
        output_dir.join(&cfg.generator.output_file).display()
    );
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let parsed = read_spec(&input)?;

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
        eprintln!("  Examples: {}", components.examples.len());
    }

    // Also validate that every reference resolves
    let model = transform::transform(&parsed)?;
    eprintln!("  Operations: {}", model.operations.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let model = load_model(&input)?;
    let output = pipeline::run(&model, &cfg.generator);

    let summary = build_inspect_summary(&model, &output);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(model: &ApiModel, output: &GenerationOutput) -> serde_json::Value {
    let folders: Vec<serde_json::Value> = output
        .groups
        .buckets()
        .into_iter()
        .map(|(folder, ops)| {
            let operations: Vec<serde_json::Value> = ops
                .iter()
                .map(|op| {
                    let requests: Vec<serde_json::Value> = op
                        .requests
                        .iter()
                        .map(|req| {
                            serde_json::json!({
                                "id": req.id,
                                "name": req.name,
                                "has_body": !req.body.is_empty(),
                                "responses": req
                                    .responses
                                    .iter()
                                    .map(|r| serde_json::json!({
                                        "id": r.id,
                                        "code": r.code,
                                        "status": r.status,
                                    }))
                                    .collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    serde_json::json!({
                        "name": op.name,
                        "method": op.method.as_str(),
                        "path": op.path,
                        "requests": requests,
                        "responses": op
                            .responses
                            .iter()
                            .map(|r| format!("{} {}", r.code, r.status).trim_end().to_string())
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            serde_json::json!({
                "folder": folder,
                "operations": operations,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": model.info.title,
            "version": model.info.version,
        },
        "base_url": output.base_url,
        "variables": output.variables.iter().map(|v| &v.name).collect::<Vec<_>>(),
        "folders": folders,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "oapm",
            "generate",
            "-i",
            "api.json",
            "--folder-strategy",
            "paths",
            "--postman-variables",
            "A-B -C",
            "--request-parameter-generation",
            "schema",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let mut cfg = OapmConfig::default();
        cfg.generator.generated_variables = vec!["KEEP".to_string()];
        args.apply(&mut cfg);

        assert_eq!(cfg.input, "api.json");
        assert_eq!(cfg.output, "postman");
        assert_eq!(cfg.generator.folder_strategy, FolderStrategy::Paths);
        assert_eq!(cfg.generator.postman_variables, vec!["A", "B", "C"]);
        assert_eq!(cfg.generator.generated_variables, vec!["KEEP"]);
        assert_eq!(
            cfg.generator.request_parameter_generation,
            RequestParameterGeneration::Schema
        );
        assert!(!cfg.generator.path_params_as_variables);
        assert_eq!(cfg.generator, GeneratorOptions {
            folder_strategy: FolderStrategy::Paths,
            postman_variables: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            generated_variables: vec!["KEEP".to_string()],
            request_parameter_generation: RequestParameterGeneration::Schema,
            ..GeneratorOptions::default()
        });
    }
}
