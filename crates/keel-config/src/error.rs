use std::io;
use thiserror::Error;

use crate::loader::SourceFormat;
use crate::value::{ConfValue, TypeTag};

/// A replacement value whose type cannot stand in for the original value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "type mismatch ({original_type} vs. {replacement_type}) with values ({original} vs. {replacement})"
)]
pub struct TypeMismatch {
    /// Type of the value being replaced.
    pub original_type: TypeTag,
    /// Type of the rejected replacement.
    pub replacement_type: TypeTag,
    /// The value being replaced.
    pub original: Box<ConfValue>,
    /// The rejected replacement.
    pub replacement: Box<ConfValue>,
}

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field was looked up that the record never declared.
    #[error("Unknown field '{field}'")]
    UnknownField {
        /// Name that was looked up.
        field: String,
    },

    /// An override value is structurally incompatible with its field.
    #[error("Type mismatch in field '{field}': {source}")]
    TypeMismatch {
        /// Field the override targeted.
        field: String,
        /// The rejected coercion.
        #[source]
        source: TypeMismatch,
    },

    /// Failed to read configuration file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// Path to the config file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse the declarative override file.
    #[error("Failed to parse {format} config file at {path}: {message}")]
    ParseError {
        /// Path to the config file that failed to parse.
        path: String,
        /// Markup the file was parsed as.
        format: SourceFormat,
        /// Parser diagnostic.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },

    /// A post-merge hook rejected the merged values.
    #[error("Post-merge hook for '{schema}' failed: {message}")]
    HookError {
        /// Schema whose hook failed.
        schema: String,
        /// Hook failure description.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
