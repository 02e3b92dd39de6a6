//! # Identity Newtypes
//!
//! Validated wrappers for the two identifier namespaces in the service:
//! wallet identifiers (opaque, chosen per client session) and DIDs (issuer
//! and subject identifiers embedded in credentials).
//!
//! Both are string-based and validated at construction, so a path built from
//! a `WalletId` can never escape the wallet directory.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// DID used for the issuer when no override is configured.
pub const DEFAULT_ISSUER_DID: &str = "did:vc-server:issuer";

/// Prefix of every credential subject DID; the wallet id follows it.
pub const SUBJECT_DID_PREFIX: &str = "did:vc-server:wallet:";

/// Longest wallet identifier accepted.
pub const MAX_WALLET_ID_LEN: usize = 128;

/// Implement `Deserialize` by routing through the validating constructor.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Identifier of a client wallet.
///
/// # Validation
///
/// 1 to 128 characters drawn from `[A-Za-z0-9_-]`. UUIDs generated by
/// [`WalletId::generate()`] always satisfy this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WalletId(String);

impl_validating_deserialize!(WalletId);

impl WalletId {
    /// Create a wallet id from a string, validating format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let well_formed = !s.is_empty()
            && s.len() <= MAX_WALLET_ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if well_formed {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidWalletId(s))
        }
    }

    /// A fresh random wallet id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Access the wallet id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID of the credential subject holding this wallet.
    pub fn subject_did(&self) -> String {
        format!("{SUBJECT_DID_PREFIX}{}", self.0)
    }
}

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for WalletId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// W3C Decentralized Identifier.
///
/// Format: `did:<method>:<method-specific-id>`. The method is lowercase
/// alphanumeric and may contain `-` (as in `did:vc-server:...`); the
/// method-specific id is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Did(String);

impl_validating_deserialize!(Did);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not match
    /// the `did:method:identifier` shape.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if Self::split(&s).is_some() {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidDid(s))
        }
    }

    fn split(s: &str) -> Option<(&str, &str)> {
        let rest = s.strip_prefix("did:")?;
        let (method, identifier) = rest.split_once(':')?;
        let method_ok = !method.is_empty()
            && method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        (method_ok && !identifier.is_empty()).then_some((method, identifier))
    }

    /// Access the DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method (between the first and second colons).
    pub fn method(&self) -> &str {
        Self::split(&self.0).map(|(m, _)| m).unwrap_or_default()
    }

    /// Everything after `did:<method>:`.
    pub fn method_specific_id(&self) -> &str {
        Self::split(&self.0).map(|(_, id)| id).unwrap_or_default()
    }

    /// The DID URL of this DID's first verification key.
    pub fn key_reference(&self) -> String {
        format!("{}#key-1", self.0)
    }
}

impl Default for Did {
    fn default() -> Self {
        Self(DEFAULT_ISSUER_DID.to_string())
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Did {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_id_accepts_uuid() {
        let id = WalletId::generate();
        assert_eq!(id.as_str().len(), 36);
        assert!(WalletId::new(id.as_str()).is_ok());
    }

    #[test]
    fn wallet_id_accepts_simple_names() {
        let longest = "x".repeat(MAX_WALLET_ID_LEN);
        for ok in ["w1", "alice_wallet", "A-B-C", longest.as_str()] {
            assert!(WalletId::new(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn wallet_id_rejects_path_tricks() {
        let too_long = "x".repeat(MAX_WALLET_ID_LEN + 1);
        for bad in ["", "../etc", "a/b", "a.json", "with space", "é", too_long.as_str()] {
            assert_eq!(
                WalletId::new(bad),
                Err(ValidationError::InvalidWalletId(bad.to_string()))
            );
        }
    }

    #[test]
    fn wallet_subject_did() {
        let id = WalletId::new("w1").unwrap();
        assert_eq!(id.subject_did(), "did:vc-server:wallet:w1");
    }

    #[test]
    fn wallet_id_deserialize_validates() {
        assert!(serde_json::from_str::<WalletId>(r#""ok-1""#).is_ok());
        assert!(serde_json::from_str::<WalletId>(r#""../x""#).is_err());
    }

    #[test]
    fn did_default_is_server_issuer() {
        let did = Did::default();
        assert_eq!(did.as_str(), DEFAULT_ISSUER_DID);
        assert_eq!(did.method(), "vc-server");
        assert_eq!(did.method_specific_id(), "issuer");
        assert!(Did::new(DEFAULT_ISSUER_DID).is_ok());
    }

    #[test]
    fn did_key_reference() {
        let did = Did::new("did:example:abc").unwrap();
        assert_eq!(did.key_reference(), "did:example:abc#key-1");
    }

    #[test]
    fn did_identifier_may_contain_colons() {
        let did = Did::new("did:vc-server:wallet:w1").unwrap();
        assert_eq!(did.method(), "vc-server");
        assert_eq!(did.method_specific_id(), "wallet:w1");
    }

    #[test]
    fn did_rejects_malformed() {
        for bad in ["", "did:", "did:web", "did::x", "did:Web:x", "did:web:", "urn:x:y"] {
            assert!(Did::new(bad).is_err(), "{bad} should be rejected");
        }
    }
}
