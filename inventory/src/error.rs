//! Error handling for the CMHO Portal inventory core

use thiserror::Error;

/// Inventory domain error types
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl InventoryError {
    /// Shorthand for a field-scoped validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;
