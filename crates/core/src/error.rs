#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required setting (usually the API credential) is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
