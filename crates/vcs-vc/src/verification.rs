//! # Credential Verification Pipeline
//!
//! An ordered, short-circuiting sequence of checks over a raw JSON
//! document. The first failing check decides the reported reason; callers
//! and tooling match on the exact reason strings, so the order below is
//! part of the contract:
//!
//! 1. document absent or falsy: `Missing Credential`
//! 2. no `proof` object, or no non-empty string `proof.proofValue`:
//!    `Missing proof`
//! 3. `proof.type`: `Invalid proof type`
//! 4. `proof.proofPurpose`: `Invalid proof purpose`
//! 5. `proof.verificationMethod` against the issuer's own key reference:
//!    `Invalid verification method`
//! 6. `proof.created` parse: `Invalid proof created timestamp`
//! 7. `proof.cryptosuite`: `Unsupported cryptosuite`
//! 8. Ed25519 over the document with `proof` removed: `Invalid signature`
//!
//! The pipeline is total: every input yields a [`VerificationResult`].
//! Working on the raw document keeps any extra fields a presenter added
//! inside the signed payload, so they must match what was signed.

use serde::{Serialize, Serializer};
use serde_json::Value;
use vcs_core::Timestamp;
use vcs_crypto::KeyCustodian;

use crate::proof::{CRYPTOSUITE, PROOF_PURPOSE, PROOF_TYPE};

/// Why a credential failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// No document was presented.
    MissingCredential,
    /// No proof, or no proof value.
    MissingProof,
    /// `proof.type` is not `DataIntegrityProof`.
    InvalidProofType,
    /// `proof.proofPurpose` is not `assertionMethod`.
    InvalidProofPurpose,
    /// `proof.verificationMethod` is not this issuer's key.
    InvalidVerificationMethod,
    /// `proof.created` is not a timestamp.
    InvalidProofCreated,
    /// `proof.cryptosuite` is not `ed25519-2020`.
    UnsupportedCryptosuite,
    /// The signature does not cover the presented document.
    InvalidSignature,
    /// The stored credential could not be read.
    VerificationError,
}

impl FailureReason {
    /// The exact reason string reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Missing Credential",
            Self::MissingProof => "Missing proof",
            Self::InvalidProofType => "Invalid proof type",
            Self::InvalidProofPurpose => "Invalid proof purpose",
            Self::InvalidVerificationMethod => "Invalid verification method",
            Self::InvalidProofCreated => "Invalid proof created timestamp",
            Self::UnsupportedCryptosuite => "Unsupported cryptosuite",
            Self::InvalidSignature => "Invalid signature",
            Self::VerificationError => "Error during verification",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of verifying one credential.
///
/// Serializes as `{"valid":true}` or `{"valid":false,"reason":"..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// The first failing check, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl VerificationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A failing result.
    pub fn invalid(reason: FailureReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

impl From<Result<(), FailureReason>> for VerificationResult {
    fn from(outcome: Result<(), FailureReason>) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(reason) => Self::invalid(reason),
        }
    }
}

/// Run the pipeline against `candidate` using the issuer held by
/// `custodian`.
pub fn verify_document(candidate: Option<&Value>, custodian: &KeyCustodian) -> VerificationResult {
    check(candidate, custodian).into()
}

fn check(candidate: Option<&Value>, custodian: &KeyCustodian) -> Result<(), FailureReason> {
    let document = candidate
        .filter(|v| !is_falsy(v))
        .ok_or(FailureReason::MissingCredential)?;

    let proof = document
        .get("proof")
        .and_then(Value::as_object)
        .ok_or(FailureReason::MissingProof)?;
    let proof_value = proof
        .get("proofValue")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(FailureReason::MissingProof)?;

    let field = |name: &str| proof.get(name).and_then(Value::as_str);

    if field("type") != Some(PROOF_TYPE) {
        return Err(FailureReason::InvalidProofType);
    }
    if field("proofPurpose") != Some(PROOF_PURPOSE) {
        return Err(FailureReason::InvalidProofPurpose);
    }
    if field("verificationMethod") != Some(custodian.verification_method().as_str()) {
        return Err(FailureReason::InvalidVerificationMethod);
    }
    if field("created").and_then(|s| Timestamp::parse(s).ok()).is_none() {
        return Err(FailureReason::InvalidProofCreated);
    }
    if field("cryptosuite") != Some(CRYPTOSUITE) {
        return Err(FailureReason::UnsupportedCryptosuite);
    }

    let mut body = document.clone();
    if let Some(obj) = body.as_object_mut() {
        obj.remove("proof");
    }
    if !custodian.verify(Some(&body), proof_value) {
        return Err(FailureReason::InvalidSignature);
    }
    Ok(())
}

/// `null`, `false`, `0` and `""` count as no document at all.
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
