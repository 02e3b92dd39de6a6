//! # Canonical Serialization: JCS Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for the
//! byte sequences that are signed and verified anywhere in the workspace.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. It can only be
//! built by [`CanonicalBytes::new()`] or [`CanonicalBytes::from_value()`],
//! both of which run RFC 8785 (JSON Canonicalization Scheme) serialization.
//! Signing and verification accept `&CanonicalBytes`, so a credential can
//! never be signed over a non-canonical rendering of itself.
//!
//! ## Rules
//!
//! 1. Object keys are sorted at every nesting level (UTF-16 code unit order,
//!    which coincides with plain lexicographic order for ASCII keys).
//! 2. Arrays keep their element order.
//! 3. No insignificant whitespace.
//! 4. Numbers use the ECMAScript shortest round-trip form, so `1.0` and `1`
//!    canonicalize identically and floats in claims are accepted.
//! 5. Strings use minimal JSON escaping; non-ASCII passes through as UTF-8.
//!
//! Two JSON-equal documents therefore always produce identical bytes, and
//! any change to a scalar anywhere in the tree changes the output.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and
///   `CanonicalBytes::from_value()`.
/// - The content is valid UTF-8 JSON text with sorted keys and compact
///   separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON (e.g. a map with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Canonicalize an already-parsed JSON tree.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        Ok(Self(serde_jcs::to_string(value)?))
    }

    /// The canonical text as bytes. This is the exact signed message.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical text of an optional JSON value.
///
/// Absence of a value yields the empty string. This function never fails:
/// a `serde_json::Value` tree always has string keys and finite numbers,
/// which is everything JCS needs.
pub fn canonicalize(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(v) => CanonicalBytes::from_value(v)
            .map(CanonicalBytes::into_string)
            .unwrap_or_default(),
    }
}
