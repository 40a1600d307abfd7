//! Error types for the codec idioms.

use thiserror::Error;

/// Errors raised while encoding or decoding. All of them are terminal for
/// the call that produced them.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A custom encoding rule rejected its input
    #[error("Rule '{rule}' failed: {message}")]
    Rule { rule: String, message: String },

    /// Input member has no matching field and unknown members are rejected
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Two input members resolved to the same field
    #[error("Duplicate field: {0}")]
    DuplicateField(String),
}

impl CodecError {
    /// Creates a rule error.
    pub fn rule(rule: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.to_string(),
        }
    }
}
