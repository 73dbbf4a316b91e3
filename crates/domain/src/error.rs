//! Unified error types for the domain layer
//!
//! Every rejected session mutation maps onto one of these variants so the
//! engine can report a precise error kind back to the client that sent it.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., blank identity)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A user-typed session code does not fit the code format
    #[error("Invalid session code: {0}")]
    InvalidSessionCode(String),

    /// Caller is not the session owner (DM)
    #[error("Not authorized: only the session owner may {action}")]
    NotAuthorized { action: &'static str },

    /// Entity not found, or not of the expected kind
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
}

impl DomainError {
    /// Creates a validation error for malformed input values.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid session code error
    pub fn invalid_session_code(msg: impl Into<String>) -> Self {
        Self::InvalidSessionCode(msg.into())
    }

    /// Create a not-authorized error for an owner-only action
    pub fn not_authorized(action: &'static str) -> Self {
        Self::NotAuthorized { action }
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}
