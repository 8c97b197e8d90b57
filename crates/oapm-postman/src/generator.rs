use oapm_core::config::GeneratorOptions;
use oapm_core::model::ApiModel;
use oapm_core::{CodeGenerator, GeneratedFile};

use crate::emitters;
use crate::error::PostmanError;
use crate::pipeline;

/// Postman v2.1 collection generator.
pub struct PostmanGenerator;

impl CodeGenerator for PostmanGenerator {
    type Config = GeneratorOptions;
    type Error = PostmanError;

    fn generate(
        &self,
        model: &ApiModel,
        config: &GeneratorOptions,
    ) -> Result<Vec<GeneratedFile>, PostmanError> {
        let output = pipeline::run(model, config);
        log::info!(
            "{} operations, {} variables",
            output.groups.len(),
            output.variables.len()
        );

        let content =
            emitters::collection::emit_collection(&model.info, model.auth.as_ref(), &output)?;
        Ok(vec![GeneratedFile {
            path: config.output_file.clone(),
            content,
        }])
    }
}
