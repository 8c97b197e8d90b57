use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostmanError {
    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("failed to serialize collection auth: {0}")]
    Auth(#[from] serde_json::Error),
}
