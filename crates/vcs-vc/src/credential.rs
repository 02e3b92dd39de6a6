//! # Verifiable Credential Structure
//!
//! Defines [`Credential`] following the W3C VC Data Model v2 shape used by
//! the service, the [`UnsignedCredential`] body that is actually signed, and
//! the [`IssueRequest`] accepted from callers.
//!
//! ## Security Invariants
//!
//! - The signed message is the JCS canonicalization of the credential with
//!   `proof` removed. [`Credential::body`] is that exact structure, and it is
//!   flattened into the credential on the wire.
//! - `credentialSubject.id` is derived from the wallet id. A caller-supplied
//!   `id` claim is rejected at validation rather than merged.
//! - Timestamps are stored in their normalized string form so the bytes
//!   signed at issuance are reproduced exactly on verification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use vcs_core::{Timestamp, ValidationError};

use crate::proof::Proof;

/// The only JSON-LD context emitted.
pub const CREDENTIALS_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";

/// First entry of every credential `type` array.
pub const VC_TYPE: &str = "VerifiableCredential";

/// Subject of a credential: the wallet DID plus arbitrary claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    /// Subject DID, `did:vc-server:wallet:<walletId>`.
    pub id: String,
    /// Caller-supplied claims, never containing `id`.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// Everything in a credential except its proof. This is the signed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedCredential {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// `urn:uuid:<v4>`.
    pub id: String,
    /// `["VerifiableCredential", <type tag>]`.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    /// Issuer DID.
    pub issuer: String,
    /// Start of validity, normalized ISO-8601.
    #[serde(rename = "validFrom")]
    pub valid_from: String,
    /// End of validity, normalized ISO-8601.
    #[serde(rename = "validUntil")]
    pub valid_until: String,
    /// The subject and its claims.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
}

impl UnsignedCredential {
    /// Assemble a fresh payload with a new `urn:uuid` id.
    pub fn new(
        issuer_did: &str,
        subject_did: String,
        type_tag: &str,
        claims: Map<String, Value>,
        window: ValidityWindow,
    ) -> Self {
        Self {
            context: vec![CREDENTIALS_V2_CONTEXT.to_string()],
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            credential_type: vec![VC_TYPE.to_string(), type_tag.to_string()],
            issuer: issuer_did.to_string(),
            valid_from: window.from.to_iso8601(),
            valid_until: window.until.to_iso8601(),
            credential_subject: CredentialSubject {
                id: subject_did,
                claims,
            },
        }
    }
}

/// A signed credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// The signed payload, flattened on the wire.
    #[serde(flatten)]
    pub body: UnsignedCredential,
    /// Signature envelope over `body`.
    pub proof: Proof,
}

impl Credential {
    /// The credential id.
    pub fn id(&self) -> &str {
        &self.body.id
    }

    /// The JSON document as it is stored and transmitted.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Parsed and ordered validity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    /// Inclusive start.
    pub from: Timestamp,
    /// End, never earlier than `from`.
    pub until: Timestamp,
}

/// A request to issue a credential into a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    /// Type tag appended after `VerifiableCredential`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Claims about the subject.
    pub claims: Map<String, Value>,
    /// ISO-8601 start of validity.
    pub valid_from: String,
    /// ISO-8601 end of validity.
    pub valid_until: String,
}

impl IssueRequest {
    /// Check the request and parse its validity window.
    ///
    /// # Errors
    ///
    /// - `type` is empty or blank.
    /// - `claims` contains the reserved key `id`.
    /// - `validFrom` or `validUntil` is not ISO-8601.
    /// - `validUntil` is earlier than `validFrom`.
    pub fn validate(&self) -> Result<ValidityWindow, ValidationError> {
        if self.credential_type.trim().is_empty() {
            return Err(ValidationError::Empty { field: "type" });
        }
        if self.claims.contains_key("id") {
            return Err(ValidationError::ReservedClaim("id".to_string()));
        }
        let from = parse_field("validFrom", &self.valid_from)?;
        let until = parse_field("validUntil", &self.valid_until)?;
        if until < from {
            return Err(ValidationError::InvertedValidity {
                from: from.to_iso8601(),
                until: until.to_iso8601(),
            });
        }
        Ok(ValidityWindow { from, until })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<Timestamp, ValidationError> {
    Timestamp::parse(value).map_err(|_| ValidationError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}
