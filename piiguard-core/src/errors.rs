//! errors.rs - Custom error types for the piiguard-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `piiguard-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PiiGuardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A span producer failed or panicked. The whole detection is aborted.
    #[error("Detection failed in producer '{producer}': {reason}")]
    DetectionFailure { producer: String, reason: String },

    /// Token generation or token store write failed during tokenize mode.
    #[error("Redaction failed: {0}")]
    RedactionFailure(String),

    #[error("Token '{0}' not found")]
    TokenNotFound(String),

    #[error("Token '{0}' has expired")]
    TokenExpired(String),

    #[error("Token store error: {0}")]
    StoreError(String),

    #[error("Failed to compile pattern '{0}': {1}")]
    PatternCompilation(String, regex::Error),

    #[error("Pattern '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Pattern '{0}' references unknown validator '{1}'")]
    UnknownValidator(String, String),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl PiiGuardError {
    /// True for the two store outcomes that detokenization treats as a skip.
    pub fn is_missing_token(&self) -> bool {
        matches!(self, PiiGuardError::TokenNotFound(_) | PiiGuardError::TokenExpired(_))
    }
}

