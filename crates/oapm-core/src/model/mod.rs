pub mod examples;
pub mod operations;
pub mod types;

pub use examples::*;
pub use operations::*;
pub use types::*;
