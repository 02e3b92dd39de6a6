//! # vcs-vc: Verifiable Credentials
//!
//! - **Credential structure** ([`Credential`], [`UnsignedCredential`]) in the
//!   W3C VC Data Model v2 shape, with a Data Integrity [`Proof`].
//! - **Issuance and verification** ([`CredentialEngine`]) bound to the
//!   process-wide issuer from `vcs-crypto`.
//! - **Wallet storage** ([`WalletStore`]) with file and in-memory backends.
//!
//! ## Security Invariants
//!
//! - The signed payload is the canonical credential without `proof`.
//! - Verification is total and ordered; see [`verification`].

pub mod credential;
pub mod engine;
pub mod error;
pub mod proof;
pub mod verification;
pub mod wallet;

pub use credential::{
    Credential, CredentialSubject, IssueRequest, UnsignedCredential, ValidityWindow,
    CREDENTIALS_V2_CONTEXT, VC_TYPE,
};
pub use engine::{CredentialEngine, Deleted};
pub use error::{StorageError, VcError};
pub use proof::{Proof, CRYPTOSUITE, PROOF_PURPOSE, PROOF_TYPE};
pub use verification::{verify_document, FailureReason, VerificationResult};
pub use wallet::{FileWalletStore, MemoryWalletStore, WalletStore};
