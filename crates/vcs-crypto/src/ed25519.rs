//! # Ed25519 Signing and Verification
//!
//! Key generation, detached signing, and detached verification for
//! credential proofs.
//!
//! ## Security Invariant
//!
//! - The signed message is always the UTF-8 bytes of a [`CanonicalBytes`]
//!   rendering. Both [`sign()`] and [`verify()`] canonicalize their input
//!   first, so a document re-serialized with a different key order still
//!   verifies.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize`, and its `Debug` output is redacted.
//! - [`verify()`] never fails loudly. Malformed hex, wrong lengths, invalid
//!   curve points and bad signatures all yield `false`.
//!
//! ## Key Encoding
//!
//! Public keys are 32 bytes, hex-encoded (64 chars). Private keys are the
//! 64-byte `seed || public` form, hex-encoded (128 chars). Signatures are
//! 64 bytes, hex-encoded (128 chars). Hex output is lowercase; hex input is
//! accepted in either case.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use vcs_core::CanonicalBytes;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;

/// An Ed25519 public key (32 bytes).
///
/// Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize`. The only way to get the private half out
/// is [`Ed25519KeyPair::private_key_hex()`], which returns a zeroizing
/// buffer.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

/// A freshly generated key pair in its hex storage encoding.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncodedKeyPair {
    /// 64 hex chars.
    pub public_key: String,
    /// 128 hex chars (`seed || public`).
    pub private_key: String,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render as lowercase hex (128 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse the 128-hex-char `seed || public` private key encoding.
    ///
    /// # Errors
    ///
    /// Fails if the input is not hex, does not decode to 64 bytes, or if
    /// the embedded public half does not match the seed.
    pub fn from_private_key_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(hex::decode(s)?);
        let mut arr = Zeroizing::new([0u8; 64]);
        if bytes.len() != arr.len() {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }
        arr.copy_from_slice(&bytes);
        let signing_key = ed25519_dalek::SigningKey::from_keypair_bytes(&arr)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The private key in its 128-hex-char storage encoding.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        Zeroizing::new(hex::encode(bytes.as_slice()))
    }

    /// Both halves in their hex storage encoding.
    pub fn encode(&self) -> EncodedKeyPair {
        EncodedKeyPair {
            public_key: self.public_key().to_hex(),
            private_key: self.private_key_hex().as_str().to_owned(),
        }
    }

    /// Sign canonical bytes.
    ///
    /// Ed25519 is deterministic: the same key and message always produce
    /// the same signature.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

impl std::fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Hex-level operations
// ---------------------------------------------------------------------------

/// Generate a fresh random key pair, hex-encoded for storage.
pub fn generate_key_pair() -> EncodedKeyPair {
    Ed25519KeyPair::generate().encode()
}

/// Canonicalize `data` and sign it with a hex-encoded private key.
///
/// Returns the 128-char lowercase hex signature.
pub fn sign(data: &impl Serialize, private_key_hex: &str) -> Result<String, CryptoError> {
    let key_pair = Ed25519KeyPair::from_private_key_hex(private_key_hex)?;
    let canonical = CanonicalBytes::new(data)?;
    Ok(key_pair.sign(&canonical).to_hex())
}

/// Canonicalize `data` and check a hex signature against a hex public key.
///
/// Total over its inputs: absent data, malformed hex, wrong lengths,
/// invalid curve points and failed verification all return `false`.
pub fn verify<T: Serialize + ?Sized>(
    data: Option<&T>,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    let Some(data) = data else {
        return false;
    };
    let checked = CanonicalBytes::new(&data)
        .map_err(CryptoError::from)
        .and_then(|canonical| {
            let signature = Ed25519Signature::from_hex(signature_hex)?;
            let public_key = Ed25519PublicKey::from_hex(public_key_hex)?;
            verify_with_public_key(&canonical, &signature, &public_key)
        });
    checked.is_ok()
}

/// Verify an Ed25519 signature over canonical bytes.
pub fn verify_canonical(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    verifying_key: &ed25519_dalek::VerifyingKey,
) -> Result<(), CryptoError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}

/// [`verify_canonical()`] taking an `Ed25519PublicKey`.
pub fn verify_with_public_key(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    verify_canonical(data, signature, &vk)
}

/// First four bytes as hex, for log lines and `Debug` output.
pub fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn signed(data: &Value) -> (EncodedKeyPair, String) {
        let kp = generate_key_pair();
        let sig = sign(data, &kp.private_key).unwrap();
        (kp, sig)
    }

    #[test]
    fn test_generate_key_pair_lengths() {
        let kp = generate_key_pair();
        assert_eq!(kp.public_key.len(), 64);
        assert_eq!(kp.private_key.len(), 128);
        assert!(kp.private_key.ends_with(&kp.public_key));
    }

    #[test]
    fn test_generate_key_pair_is_random() {
        let a = generate_key_pair();
        let b = generate_key_pair();
        assert_ne!(a.public_key, b.public_key);
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn test_sign_and_verify() {
        let data = json!({"message": "hello", "nonce": 42});
        let (kp, sig) = signed(&data);
        assert_eq!(sig.len(), 128);
        assert!(verify(Some(&data), &sig, &kp.public_key));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let data = json!({"a": [1, 2, {"b": null}]});
        let kp = generate_key_pair();
        let s1 = sign(&data, &kp.private_key).unwrap();
        let s2 = sign(&data, &kp.private_key).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_verify_ignores_key_order() {
        let data: Value = serde_json::from_str(r#"{"b":{"y":1,"x":2},"a":true}"#).unwrap();
        let reordered: Value = serde_json::from_str(r#"{"a":true,"b":{"x":2,"y":1}}"#).unwrap();
        let (kp, sig) = signed(&data);
        assert!(verify(Some(&reordered), &sig, &kp.public_key));
    }

    #[test]
    fn test_verify_rejects_nested_tamper() {
        let data = json!({"subject": {"address": {"zip": "75001"}}});
        let tampered = json!({"subject": {"address": {"zip": "75002"}}});
        let (kp, sig) = signed(&data);
        assert!(!verify(Some(&tampered), &sig, &kp.public_key));
    }

    #[test]
    fn test_verify_rejects_cross_key() {
        let data = json!({"test": true});
        let (_, sig) = signed(&data);
        let other = generate_key_pair();
        assert!(!verify(Some(&data), &sig, &other.public_key));
    }

    #[test]
    fn test_verify_none_data_is_false() {
        let data = json!({"x": 1});
        let (kp, sig) = signed(&data);
        assert!(!verify::<Value>(None, &sig, &kp.public_key));
    }

    #[test]
    fn test_verify_malformed_signatures() {
        let data = json!({"x": 1});
        let (kp, sig) = signed(&data);
        let pk = &kp.public_key;

        let truncated = &sig[..126];
        let extended = format!("{sig}00");
        let mut flipped = hex::decode(&sig).unwrap();
        flipped[10] ^= 0x01;
        let flipped = hex::encode(flipped);
        let zeros = "0".repeat(128);
        let effs = "f".repeat(128);
        let non_hex = "z".repeat(128);
        let odd = &sig[..127];

        for bad in [
            truncated,
            extended.as_str(),
            flipped.as_str(),
            zeros.as_str(),
            effs.as_str(),
            non_hex.as_str(),
            odd,
            "",
        ] {
            assert!(!verify(Some(&data), bad, pk), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_verify_malformed_public_keys() {
        let data = json!({"x": 1});
        let (kp, sig) = signed(&data);
        let short = &kp.public_key[..62];
        let not_hex = "g".repeat(64);
        for bad in [short, not_hex.as_str(), "", kp.private_key.as_str()] {
            assert!(!verify(Some(&data), &sig, bad));
        }
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let data = json!({"x": 1});
        let (kp, sig) = signed(&data);
        assert!(verify(
            Some(&data),
            &sig.to_uppercase(),
            &kp.public_key.to_uppercase()
        ));
    }

    #[test]
    fn test_sign_rejects_bad_private_keys() {
        let data = json!({"x": 1});
        let kp = generate_key_pair();
        assert!(matches!(
            sign(&data, &kp.private_key[..64]),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
        assert!(matches!(sign(&data, "xyz"), Err(CryptoError::HexDecode(_))));

        let other = generate_key_pair();
        let mismatched = format!("{}{}", &kp.private_key[..64], other.public_key);
        assert!(matches!(
            sign(&data, &mismatched),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_key_pair_roundtrips_through_hex() {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let restored = Ed25519KeyPair::from_private_key_hex(&kp.private_key_hex()).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn test_debug_is_redacted() {
        let kp = generate_key_pair();
        let dbg = format!("{kp:?}");
        assert!(!dbg.contains(&kp.private_key));
        assert!(dbg.contains("<redacted>"));
        assert_eq!(
            format!("{:?}", Ed25519KeyPair::generate()),
            "Ed25519KeyPair(<private>)"
        );
    }

    #[test]
    fn test_signature_serde_hex() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&CanonicalBytes::from_value(&json!({"a": 1})).unwrap());
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", sig.to_hex()));
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn test_signature_from_hex_wrong_length() {
        assert!(matches!(
            Ed25519Signature::from_hex(&"ab".repeat(32)),
            Err(CryptoError::InvalidSignatureLength(32))
        ));
    }
}
