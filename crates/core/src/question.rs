//! Question validation.
//!
//! Runs before any expensive work (budgeting, LLM call) is done.

use crate::error::QuestionError;
use serde::Serialize;

/// Maximum question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 500;

/// A question that passed validation. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Question(String);

impl Question {
    /// Validate a raw question string.
    ///
    /// Accepts 1..=500 characters. Blank input (empty or whitespace only) is
    /// rejected. The text is kept verbatim, surrounding whitespace included.
    pub fn validate(raw: impl Into<String>) -> Result<Self, QuestionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(QuestionError::Empty);
        }

        let length = raw.chars().count();
        if length > MAX_QUESTION_CHARS {
            return Err(QuestionError::TooLong {
                length,
                max: MAX_QUESTION_CHARS,
            });
        }

        Ok(Self(raw))
    }

    /// Validate a raw request payload, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, QuestionError> {
        let raw = std::str::from_utf8(bytes).map_err(|_| QuestionError::NotUtf8)?;
        Self::validate(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Question {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
