pub mod builder;
pub mod emitters;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod items;
pub mod pipeline;
pub mod status;
pub mod synthesizer;
pub mod variables;

pub use error::PostmanError;
pub use generator::PostmanGenerator;
pub use pipeline::{GenerationOutput, GenerationRun};
