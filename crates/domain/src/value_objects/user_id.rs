//! Browser identity

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Opaque, stable identity of one browser.
///
/// The engine receives it from the HTTP boundary; the domain only compares
/// identities for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from an identity string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the identity is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("user id cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
