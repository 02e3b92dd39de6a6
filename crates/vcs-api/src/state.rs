//! # Application State
//!
//! Configuration read once from the environment, and the shared state
//! handed to every route handler through the `State` extractor.
//!
//! The state holds one [`CredentialEngine`], which in turn owns the
//! process-wide issuer identity. Cloning the state is cheap.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use vcs_core::{Did, ValidationError};
use vcs_crypto::{CustodianError, FileKeyStore, KeyCustodian, MemoryKeyStore};
use vcs_vc::{CredentialEngine, FileWalletStore, MemoryWalletStore};

/// Listen port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3001;

/// Allowed browser origin when `CORS_ORIGIN` is unset.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Data directory when `VCS_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `PORT` is not a TCP port number.
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    /// `VCS_ISSUER_DID` is not a DID.
    #[error("VCS_ISSUER_DID is invalid: {0}")]
    InvalidIssuerDid(#[source] ValidationError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// The single browser origin allowed to call the API with credentials.
    pub cors_origin: String,
    /// Holds `issuer-keys.json` and the `wallets/` directory.
    pub data_dir: PathBuf,
    /// DID assigned when a new issuer key pair is generated.
    pub issuer_did: Did,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            issuer_did: Did::default(),
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `CORS_ORIGIN`, `VCS_DATA_DIR` and `VCS_ISSUER_DID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// Unset and empty variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        let issuer_did = match var("VCS_ISSUER_DID") {
            Some(raw) => Did::new(raw.trim()).map_err(ConfigError::InvalidIssuerDid)?,
            None => defaults.issuer_did,
        };

        Ok(Self {
            port,
            cors_origin: var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            data_dir: var("VCS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            issuer_did,
        })
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: CredentialEngine,
    pub config: AppConfig,
}

impl AppState {
    /// Wrap an existing engine.
    pub fn new(engine: CredentialEngine, config: AppConfig) -> Self {
        Self { engine, config }
    }

    /// File-backed state under `config.data_dir`: issuer keys are loaded
    /// or generated, wallets live in `<data_dir>/wallets`.
    ///
    /// # Errors
    ///
    /// Fails only if freshly generated keys cannot be persisted.
    pub fn open(config: AppConfig) -> Result<Self, CustodianError> {
        let keys = Arc::new(FileKeyStore::in_dir(&config.data_dir));
        let custodian = KeyCustodian::initialize(keys, config.issuer_did.clone())?;
        let wallets = Arc::new(FileWalletStore::in_data_dir(&config.data_dir));
        let engine = CredentialEngine::new(Arc::new(custodian), wallets);
        Ok(Self::new(engine, config))
    }

    /// State with an ephemeral issuer and in-memory wallets.
    pub fn in_memory(config: AppConfig) -> Result<Self, CustodianError> {
        let custodian = KeyCustodian::initialize(
            Arc::new(MemoryKeyStore::new()),
            config.issuer_did.clone(),
        )?;
        let engine = CredentialEngine::new(Arc::new(custodian), Arc::new(MemoryWalletStore::new()));
        Ok(Self::new(engine, config))
    }
}
