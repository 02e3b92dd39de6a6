//! # Data Integrity Proofs
//!
//! The proof envelope attached to every issued credential. Only one suite
//! is supported: an Ed25519 signature over the JCS-canonical credential
//! body, identified as `ed25519-2020`.
//!
//! Proof fields are plain strings so that a proof read back from storage or
//! from a request reproduces exactly the text that was issued.

use serde::{Deserialize, Serialize};
use vcs_core::Timestamp;

/// `proof.type` of every issued proof.
pub const PROOF_TYPE: &str = "DataIntegrityProof";

/// `proof.proofPurpose` of every issued proof.
pub const PROOF_PURPOSE: &str = "assertionMethod";

/// `proof.cryptosuite` of every issued proof.
pub const CRYPTOSUITE: &str = "ed25519-2020";

/// A Data Integrity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Always [`PROOF_TYPE`] for issued proofs.
    #[serde(rename = "type")]
    pub proof_type: String,
    /// ISO-8601 creation time.
    pub created: String,
    /// Always [`PROOF_PURPOSE`] for issued proofs.
    pub proof_purpose: String,
    /// DID URL of the signing key (`<issuer DID>#key-1`).
    pub verification_method: String,
    /// Always [`CRYPTOSUITE`] for issued proofs.
    pub cryptosuite: String,
    /// 128-char hex Ed25519 signature.
    pub proof_value: String,
}

impl Proof {
    /// Build an `ed25519-2020` assertion proof.
    pub fn new(verification_method: String, proof_value: String, created: Timestamp) -> Self {
        Self {
            proof_type: PROOF_TYPE.to_string(),
            created: created.to_iso8601(),
            proof_purpose: PROOF_PURPOSE.to_string(),
            verification_method,
            cryptosuite: CRYPTOSUITE.to_string(),
            proof_value,
        }
    }
}
