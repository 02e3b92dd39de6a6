//! # Error Types
//!
//! Errors shared by every crate in the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation errors describe malformed caller input and are surfaced
//!   to the caller verbatim; they are never retried.
//! - Verification failures are NOT errors. They are reported as a
//!   structured result by the credential engine.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be represented as a JSON tree.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Malformed caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Wire name of the offending field.
        field: &'static str,
    },

    /// The caller tried to supply a claim the wallet owns.
    #[error("claims must not include \"{0}\"; it is managed by the wallet")]
    ReservedClaim(String),

    /// A timestamp field did not parse as ISO-8601.
    #[error("{field} must be an ISO-8601 timestamp, got {value:?}")]
    InvalidTimestamp {
        /// Wire name of the offending field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The validity window ends before it starts.
    #[error("validUntil ({until}) must not be earlier than validFrom ({from})")]
    InvertedValidity {
        /// Normalized `validFrom`.
        from: String,
        /// Normalized `validUntil`.
        until: String,
    },

    /// A wallet identifier outside the permitted alphabet or length.
    #[error("invalid wallet id {0:?}: expected 1-128 characters from [A-Za-z0-9_-]")]
    InvalidWalletId(String),

    /// A DID that does not have the `did:<method>:<id>` shape.
    #[error("invalid DID {0:?}: expected did:<method>:<identifier>")]
    InvalidDid(String),
}
