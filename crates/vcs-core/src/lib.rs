//! # vcs-core: Foundational Types for the Credential Service
//!
//! Every other crate in the workspace depends on `vcs-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All signed material flows through
//!    `CanonicalBytes::new()` or `CanonicalBytes::from_value()`. Signing over
//!    raw `serde_json::to_vec()` output is not possible through the public API.
//!
//! 2. **Validated identifiers.** `WalletId` and `Did` are checked at
//!    construction and on deserialization.
//!
//! 3. **UTC-only timestamps.** `Timestamp` normalizes every accepted input to
//!    `YYYY-MM-DDTHH:MM:SS.mmmZ`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vcs-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod storage;
pub mod temporal;

pub use canonical::{canonicalize, CanonicalBytes};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{Did, WalletId, DEFAULT_ISSUER_DID, SUBJECT_DID_PREFIX};
pub use temporal::{ParseTimestampError, Timestamp};
