//! # Credential Engine
//!
//! The wallet-facing operations: issue, list, get, verify (by reference or
//! by value), and delete. The engine owns no state of its own; it combines
//! the process-wide [`KeyCustodian`] with a [`WalletStore`].
//!
//! Issuance signs an [`UnsignedCredential`] and only then attaches the
//! proof, so verification can reconstruct the signed payload by stripping
//! `proof` from a presented credential.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use vcs_core::{Timestamp, WalletId};
use vcs_crypto::KeyCustodian;

use crate::credential::{Credential, IssueRequest, UnsignedCredential};
use crate::error::{StorageError, VcError};
use crate::proof::Proof;
use crate::verification::{verify_document, FailureReason, VerificationResult};
use crate::wallet::WalletStore;

/// Confirmation returned by [`CredentialEngine::delete()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    /// Always `true`.
    pub deleted: bool,
    /// Id of the removed credential.
    pub id: String,
}

/// Issues, stores and verifies credentials for one issuer.
#[derive(Clone)]
pub struct CredentialEngine {
    custodian: Arc<KeyCustodian>,
    wallets: Arc<dyn WalletStore>,
}

impl CredentialEngine {
    /// Combine an issuer identity with a wallet store.
    pub fn new(custodian: Arc<KeyCustodian>, wallets: Arc<dyn WalletStore>) -> Self {
        Self { custodian, wallets }
    }

    /// The issuer identity.
    pub fn custodian(&self) -> &KeyCustodian {
        &self.custodian
    }

    /// Sign and store a new credential in `wallet`.
    ///
    /// # Errors
    ///
    /// `VcError::Validation` for a malformed request, `VcError::Storage`
    /// if the wallet cannot be written.
    pub fn issue(&self, wallet: &WalletId, request: &IssueRequest) -> Result<Credential, VcError> {
        let window = request.validate()?;
        let body = UnsignedCredential::new(
            self.custodian.issuer_did(),
            wallet.subject_did(),
            &request.credential_type,
            request.claims.clone(),
            window,
        );
        let proof_value = self.custodian.sign(&body)?;
        let proof = Proof::new(
            self.custodian.verification_method(),
            proof_value,
            Timestamp::now(),
        );
        let credential = Credential { body, proof };
        self.wallets.append(wallet, &credential)?;

        tracing::info!(
            wallet_id = %wallet,
            credential_id = %credential.id(),
            credential_type = %request.credential_type,
            "issued credential"
        );
        Ok(credential)
    }

    /// Every credential in `wallet`, in issuance order.
    pub fn list(&self, wallet: &WalletId) -> Result<Vec<Credential>, VcError> {
        Ok(self.wallets.load_all(wallet)?)
    }

    /// One credential by id.
    ///
    /// # Errors
    ///
    /// `VcError::NotFound` if the wallet holds no such credential.
    pub fn get(&self, wallet: &WalletId, id: &str) -> Result<Credential, VcError> {
        self.wallets
            .find_by_id(wallet, id)?
            .ok_or_else(|| VcError::NotFound(id.to_string()))
    }

    /// Verify a stored credential.
    ///
    /// A missing credential reports `Missing Credential`. A storage failure
    /// reports `Error during verification` and is logged, never returned.
    pub fn verify_by_id(&self, wallet: &WalletId, id: &str) -> VerificationResult {
        let stored = self
            .wallets
            .find_by_id(wallet, id)
            .and_then(|found| {
                found
                    .map(|c| c.to_value())
                    .transpose()
                    .map_err(StorageError::from)
            });
        match stored {
            Ok(document) => self.verify_credential(document.as_ref()),
            Err(e) => {
                tracing::error!(
                    wallet_id = %wallet,
                    credential_id = %id,
                    error = %e,
                    "failed to load credential for verification"
                );
                VerificationResult::invalid(FailureReason::VerificationError)
            }
        }
    }

    /// Verify a presented credential document.
    pub fn verify_credential(&self, candidate: Option<&Value>) -> VerificationResult {
        let result = verify_document(candidate, &self.custodian);
        if let Some(reason) = result.reason {
            tracing::debug!(%reason, "credential failed verification");
        }
        result
    }

    /// Verify a typed credential.
    pub fn verify(&self, credential: &Credential) -> VerificationResult {
        match credential.to_value() {
            Ok(document) => self.verify_credential(Some(&document)),
            Err(_) => VerificationResult::invalid(FailureReason::VerificationError),
        }
    }

    /// Remove a credential from `wallet`.
    ///
    /// # Errors
    ///
    /// `VcError::NotFound` if the wallet holds no such credential.
    pub fn delete(&self, wallet: &WalletId, id: &str) -> Result<Deleted, VcError> {
        if !self.wallets.remove_by_id(wallet, id)? {
            return Err(VcError::NotFound(id.to_string()));
        }
        tracing::info!(wallet_id = %wallet, credential_id = %id, "deleted credential");
        Ok(Deleted {
            deleted: true,
            id: id.to_string(),
        })
    }
}

impl std::fmt::Debug for CredentialEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEngine")
            .field("issuer_did", &self.custodian.issuer_did())
            .finish_non_exhaustive()
    }
}
