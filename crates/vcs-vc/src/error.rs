//! # Credential Error Types
//!
//! Verification failures are not represented here. They are routine
//! outcomes, reported as a [`VerificationResult`](crate::VerificationResult).

use std::path::PathBuf;

use thiserror::Error;
use vcs_core::{CanonicalizationError, ValidationError};
use vcs_crypto::CryptoError;

/// Errors from credential issuance and wallet operations.
#[derive(Error, Debug)]
pub enum VcError {
    /// Caller input was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No credential with this id exists in the wallet.
    #[error("Credential {0} not found")]
    NotFound(String),

    /// The wallet store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Signing the credential body failed.
    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// The credential body could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Errors from a [`WalletStore`](crate::WalletStore) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("wallet storage I/O at {}: {source}", path.display())]
    Io {
        /// Wallet file or directory.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A wallet file exists but does not hold a credential list.
    #[error("corrupt wallet file {}: {message}", path.display())]
    Corrupt {
        /// Wallet file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A credential could not be encoded for storage.
    #[error("wallet encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
