//! # vcs-cli: Credential Server Command-Line Interface
//!
//! Drives the same issuer keys and wallet files as the HTTP service,
//! without a running server.
//!
//! ## Subcommands
//!
//! - `keys`: load or create the issuer key pair and print its identity
//! - `issue`, `list`, `delete`: wallet operations
//! - `seed`: bulk-issue sample credentials into a wallet
//! - `verify`: verify a credential document from a file or stdin, using
//!   existing issuer keys only
//! - `canonicalize`: print the JCS form of a JSON document
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers write to a caller-supplied `Write` and return an exit code.
//! - Handlers delegate to `vcs-vc`; no credential logic lives here.

pub mod canonical;
pub mod credential;
pub mod keys;
pub mod seed;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use vcs_core::Did;
use vcs_crypto::{FileKeyStore, KeyCustodian};
use vcs_vc::{CredentialEngine, FileWalletStore};

/// Where the issuer keys and wallets live.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Holds `issuer-keys.json` and `wallets/`.
    pub data_dir: PathBuf,
    /// DID assigned if a key pair has to be generated.
    pub issuer_did: Did,
}

impl Workspace {
    /// Load or create the issuer identity.
    pub fn custodian(&self) -> Result<KeyCustodian> {
        let store = Arc::new(FileKeyStore::in_dir(&self.data_dir));
        KeyCustodian::initialize(store, self.issuer_did.clone()).with_context(|| {
            format!(
                "failed to initialize issuer keys in {}",
                self.data_dir.display()
            )
        })
    }

    /// Load the existing issuer identity. Never writes a key file.
    pub fn existing_custodian(&self) -> Result<KeyCustodian> {
        let store = Arc::new(FileKeyStore::in_dir(&self.data_dir));
        KeyCustodian::load(store).with_context(|| {
            format!(
                "no usable issuer keys in {}; run `vcs keys` or issue a credential first",
                self.data_dir.display()
            )
        })
    }

    /// A credential engine over the file-backed stores.
    pub fn engine(&self) -> Result<CredentialEngine> {
        Ok(self.engine_with(self.custodian()?))
    }

    /// A credential engine that only uses existing issuer keys.
    pub fn verifier(&self) -> Result<CredentialEngine> {
        Ok(self.engine_with(self.existing_custodian()?))
    }

    fn engine_with(&self, custodian: KeyCustodian) -> CredentialEngine {
        let wallets = Arc::new(FileWalletStore::in_data_dir(&self.data_dir));
        CredentialEngine::new(Arc::new(custodian), wallets)
    }
}

/// Read a JSON document from `path`, or from stdin when `path` is absent
/// or `-`.
pub fn read_json_input(path: Option<&Path>) -> Result<Value> {
    let (text, source) = match path {
        Some(p) if p != Path::new("-") => (
            std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?,
            p.display().to_string(),
        ),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            (buf, "stdin".to_string())
        }
    };
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON from {source}"))
}

/// Pretty-print `value` followed by a newline.
pub(crate) fn print_json(out: &mut dyn Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode output")?;
    writeln!(out)?;
    Ok(())
}
