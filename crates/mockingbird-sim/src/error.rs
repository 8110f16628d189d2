//! Simulation error types.

use thiserror::Error;

/// Engine-level errors. All are raised synchronously at the call that caused
/// them; nothing is retried internally.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate entity: {entity_type} '{key}' already exists")]
    DuplicateEntity { entity_type: String, key: String },

    #[error("Entity not found: {entity_type} '{key}'")]
    NotFound { entity_type: String, key: String },

    #[error("Schema mismatch in {table} table: missing fields {missing:?}, unexpected fields {unexpected:?}")]
    SchemaMismatch {
        table: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Unsupported action ({kind}, {subkind}) for aircraft '{callsign}'")]
    UnsupportedAction {
        kind: String,
        subkind: String,
        callsign: String,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Simulator task has stopped")]
    Stopped,
}

impl SimError {
    pub(crate) fn not_found(entity_type: &str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            key: key.into(),
        }
    }

    pub(crate) fn duplicate(entity_type: &str, key: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            entity_type: entity_type.to_string(),
            key: key.into(),
        }
    }

    /// Stable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::DuplicateEntity { .. } => "DUPLICATE_ENTITY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::UnsupportedAction { .. } => "UNSUPPORTED_ACTION",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Stopped => "SIMULATOR_STOPPED",
        }
    }

    /// Whether a caller can log this error and keep simulating.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnsupportedAction { .. })
    }
}

impl From<chrono::ParseError> for SimError {
    fn from(err: chrono::ParseError) -> Self {
        Self::InvalidArgument(format!("malformed time string: {err}"))
    }
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
