//! Session codes - the short, human-typeable room identifier
//!
//! Codes are case-insensitive: every code is normalized to upper case with
//! surrounding whitespace removed before it is stored or looked up.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Symbols used for generated codes (no `I`, `O`, `0` or `1`).
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a generated code.
pub const GENERATED_CODE_LENGTH: usize = 5;

/// Maximum length for a user-typed code.
const MAX_CODE_LENGTH: usize = 16;

/// A validated, normalized session code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Parse a user-typed code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSessionCode` if the code is empty after
    /// trimming, longer than 16 characters, or contains anything other than
    /// ASCII letters and digits.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_session_code("code cannot be empty"));
        }
        if trimmed.len() > MAX_CODE_LENGTH {
            return Err(DomainError::invalid_session_code(format!(
                "code cannot exceed {} characters",
                MAX_CODE_LENGTH
            )));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::invalid_session_code(
                "code may only contain letters and digits",
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Generate a fresh code.
    ///
    /// `pick` receives the alphabet size and must return an index below it;
    /// callers inject their RNG here so generation stays deterministic in tests.
    pub fn generate(mut pick: impl FnMut(usize) -> usize) -> Self {
        let code = (0..GENERATED_CODE_LENGTH)
            .map(|_| {
                let idx = pick(CODE_ALPHABET.len()) % CODE_ALPHABET.len();
                CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionCode {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> String {
        code.0
    }
}
