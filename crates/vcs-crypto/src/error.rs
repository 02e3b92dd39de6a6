//! # Cryptographic Error Types
//!
//! Structured errors for signing and for issuer key custody.

use std::path::PathBuf;

use thiserror::Error;
use vcs_core::{CanonicalizationError, ValidationError};

/// Errors from Ed25519 key handling and signing.
///
/// Verification never produces one of these at the public boundary;
/// [`crate::ed25519::verify()`] collapses every failure to `false`.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Input was not valid hexadecimal.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Private key bytes were the wrong length or did not match their
    /// embedded public half.
    #[error("invalid Ed25519 private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key bytes were the wrong length or not a curve point.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes were the wrong length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The signature did not verify.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// The data to sign could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}

/// Errors from issuer key custody.
#[derive(Error, Debug)]
pub enum CustodianError {
    /// Reading or writing the key record failed.
    #[error("key storage I/O at {}: {source}", path.display())]
    Storage {
        /// Location of the key record.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// No key record exists yet.
    #[error("no issuer key record at {0}")]
    NotFound(String),

    /// The stored record is not a usable key record.
    #[error("malformed key record: {0}")]
    Malformed(String),

    /// The configured or stored issuer DID is not a DID.
    #[error(transparent)]
    InvalidDid(#[from] ValidationError),

    /// The stored key hex does not form a consistent Ed25519 key pair.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
