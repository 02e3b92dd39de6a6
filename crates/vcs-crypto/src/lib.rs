//! # vcs-crypto: Signatures and Issuer Key Custody
//!
//! - [`ed25519`]: key generation, detached signing and total (never failing)
//!   verification over JCS-canonical bytes, with hex encodings for storage
//!   and transport.
//! - [`custodian`]: the single issuer identity, loaded from or created in a
//!   [`KeyStore`].
//!
//! ## Crate Policy
//!
//! - Signing input is `&CanonicalBytes` or a `Serialize` value that is
//!   canonicalized internally. Raw byte slices are never signed.
//! - Private key material is zeroized on drop and never logged.

pub mod custodian;
pub mod ed25519;
pub mod error;

pub use custodian::{FileKeyStore, KeyCustodian, KeyMaterial, KeyStore, MemoryKeyStore};
pub use ed25519::{
    generate_key_pair, sign, verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
    EncodedKeyPair,
};
pub use error::{CryptoError, CustodianError};
