//! Error types for the schema crate.

use std::fmt;

/// Errors raised while reading or writing an overlay document.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The text is not a well-formed overlay document.
    #[error("malformed overlay: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// The document parsed but failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Every problem found by [`Overlay::validate`](crate::Overlay::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` if nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid overlay: {}", self.errors.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
