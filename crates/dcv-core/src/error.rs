//! # Error Types — Hard Failures
//!
//! These are caller-facing errors for conditions that are not consensus
//! rule violations: malformed constructor input, canonicalization failures,
//! unreadable configuration. They use `thiserror` and propagate with `?`.
//!
//! Consensus rule violations live in [`crate::consensus`] and are collected
//! in a [`crate::ValidationResult`] instead.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

/// Error parsing an identifier or other fixed-width byte string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded byte length was wrong.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },
}

/// Error loading or checking a [`crate::ValidationConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config document was not valid YAML/JSON for the config shape.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Values parsed but are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}
