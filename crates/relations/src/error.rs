//! Error types for the relationship system
//!
//! Every failure surfaces to the immediate caller; nothing here is retried or
//! swallowed.

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for model and relationship operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A parent's primary key is null where a constraint needs it
    #[error("Primary key of parent model '{model}' is undefined")]
    UndefinedParentKey { model: String },

    /// Related model creation against a parent without a usable key
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    /// The persistence collaborator failed to save a model
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Fetched related models cannot be grouped by their foreign key
    #[error("Malformed relation results: {0}")]
    MalformedResults(String),

    /// Relationship loading or configuration failed
    #[error("Relationship error: {0}")]
    Relationship(String),

    /// A query could not be built or evaluated
    #[error("Query error: {0}")]
    Query(String),

    /// Model validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Error types for relationship definitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelationshipError {
    /// Invalid relationship configuration
    #[error("Invalid relationship configuration: {0}")]
    InvalidConfiguration(String),
    /// Foreign key names a column the related model does not have
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },
}

impl From<RelationshipError> for ModelError {
    fn from(err: RelationshipError) -> Self {
        ModelError::Relationship(err.to_string())
    }
}
