use thiserror::Error;

/// The error surfaced to the user. At most one is held at a time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Backend unavailable or schema list could not be loaded: {0}")]
    SchemasUnavailable(String),

    #[error("Failed to load modules: {0}")]
    ModulesUnavailable(String),

    #[error("Failed to load logs: {0}")]
    LogsUnavailable(String),

    /// The selected schema id is not in the current schema list
    #[error("Selected schema '{0}' is not in the schema list")]
    SchemaNotFound(String),
}
