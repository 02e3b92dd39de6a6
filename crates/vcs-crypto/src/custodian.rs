//! # Issuer Key Custody
//!
//! Owns the single issuer identity of a running process: one DID and one
//! Ed25519 key pair. The custodian is constructed once at startup by
//! [`KeyCustodian::initialize()`] and then shared read-only (typically in an
//! `Arc`) by every request handler.
//!
//! ## Load-or-create
//!
//! `initialize` reads the persisted [`KeyMaterial`] from a [`KeyStore`]. If
//! the record is absent, unreadable, malformed, or holds hex that does not
//! form a consistent key pair, a fresh key pair is generated under the
//! default DID and persisted before `initialize` returns. A failure to
//! persist is fatal: the process must not serve with an identity it cannot
//! reproduce after restart.
//!
//! [`KeyCustodian::load()`] is the read-only path for tools that must only
//! ever use an existing identity: it never writes to the store.
//!
//! Concurrent `initialize` calls from several processes against the same
//! store are not arbitrated.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vcs_core::storage::write_atomically;
use vcs_core::Did;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ed25519::{self, Ed25519KeyPair};
use crate::error::{CryptoError, CustodianError};

/// File name of the key record inside the data directory.
pub const KEY_FILE_NAME: &str = "issuer-keys.json";

/// The persisted issuer identity record.
///
/// Serialized as `{"issuerDid", "publicKey", "privateKey"}` with hex keys.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterial {
    /// Issuer DID.
    pub issuer_did: String,
    /// 32-byte public key, hex.
    pub public_key: String,
    /// 64-byte `seed || public` private key, hex.
    pub private_key: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("issuer_did", &self.issuer_did)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

// ─── KeyStore ────────────────────────────────────────────────────────────

/// Persistence backend for the issuer key record.
///
/// Implementations must be `Send + Sync`; the custodian may be shared
/// across async tasks.
pub trait KeyStore: Send + Sync {
    /// Read the record. `Ok(None)` means no record exists yet.
    fn load(&self) -> Result<Option<KeyMaterial>, CustodianError>;

    /// Write the record, replacing any previous one.
    fn save(&self, material: &KeyMaterial) -> Result<(), CustodianError>;

    /// Human-readable location for diagnostics.
    fn describe(&self) -> String;
}

/// A key record stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/issuer-keys.json`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(KEY_FILE_NAME))
    }

    /// Path of the key file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, source: std::io::Error) -> CustodianError {
        CustodianError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<KeyMaterial>, CustodianError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_err(e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CustodianError::Malformed(e.to_string()))
    }

    fn save(&self, material: &KeyMaterial) -> Result<(), CustodianError> {
        let json = serde_json::to_string_pretty(material)
            .map_err(|e| CustodianError::Malformed(e.to_string()))?;
        write_atomically(&self.path, json.as_bytes()).map_err(|e| self.storage_err(e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory key store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    record: Mutex<Option<KeyMaterial>>,
}

impl MemoryKeyStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a record.
    pub fn with_record(material: KeyMaterial) -> Self {
        Self {
            record: Mutex::new(Some(material)),
        }
    }

    /// Snapshot of the current record.
    pub fn record(&self) -> Option<KeyMaterial> {
        self.record.lock().clone()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<KeyMaterial>, CustodianError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, material: &KeyMaterial) -> Result<(), CustodianError> {
        *self.record.lock() = Some(material.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// ─── KeyCustodian ────────────────────────────────────────────────────────

/// Holder of the issuer DID and key pair.
///
/// Signing and verification go through the hex-level operations in
/// [`crate::ed25519`] with the held key record.
pub struct KeyCustodian {
    issuer_did: Did,
    keys: KeyMaterial,
    store: Arc<dyn KeyStore>,
}

impl KeyCustodian {
    /// Load the issuer identity from `store`, or create and persist one.
    ///
    /// # Errors
    ///
    /// Returns an error only if a freshly generated record cannot be
    /// persisted. Unreadable or invalid stored records are replaced.
    pub fn initialize(store: Arc<dyn KeyStore>, default_did: Did) -> Result<Self, CustodianError> {
        match Self::load(store.clone()) {
            Ok(custodian) => Ok(custodian),
            Err(CustodianError::NotFound(_)) => Self::generate(store, default_did),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    store = %store.describe(),
                    "discarding unusable issuer key record"
                );
                Self::generate(store, default_did)
            }
        }
    }

    /// Load an existing issuer identity without ever writing to `store`.
    ///
    /// # Errors
    ///
    /// `CustodianError::NotFound` if the store holds no record, or the
    /// load or consistency error for a record that is unusable.
    pub fn load(store: Arc<dyn KeyStore>) -> Result<Self, CustodianError> {
        let material = store
            .load()?
            .ok_or_else(|| CustodianError::NotFound(store.describe()))?;
        let (issuer_did, keys) = Self::from_material(&material)?;
        let custodian = Self {
            issuer_did,
            keys,
            store,
        };
        tracing::info!(
            issuer_did = %custodian.issuer_did,
            public_key = %custodian.public_key_prefix(),
            store = %custodian.store.describe(),
            "loaded issuer keys"
        );
        Ok(custodian)
    }

    fn generate(store: Arc<dyn KeyStore>, issuer_did: Did) -> Result<Self, CustodianError> {
        let encoded = ed25519::generate_key_pair();
        let keys = KeyMaterial {
            issuer_did: issuer_did.to_string(),
            public_key: encoded.public_key.clone(),
            private_key: encoded.private_key.clone(),
        };
        let custodian = Self {
            issuer_did,
            keys,
            store,
        };
        custodian.persist()?;
        tracing::info!(
            issuer_did = %custodian.issuer_did,
            public_key = %custodian.public_key_prefix(),
            store = %custodian.store.describe(),
            "generated issuer keys"
        );
        Ok(custodian)
    }

    /// Validate a stored record and normalize its hex to lowercase.
    fn from_material(material: &KeyMaterial) -> Result<(Did, KeyMaterial), CustodianError> {
        let issuer_did = Did::new(material.issuer_did.as_str())?;
        let public_key = Ed25519KeyPair::from_private_key_hex(&material.private_key)?
            .public_key()
            .to_hex();
        if !public_key.eq_ignore_ascii_case(&material.public_key) {
            return Err(CryptoError::InvalidPublicKey(
                "stored public key does not match private key".to_string(),
            )
            .into());
        }
        let keys = KeyMaterial {
            issuer_did: issuer_did.to_string(),
            public_key,
            private_key: material.private_key.to_ascii_lowercase(),
        };
        Ok((issuer_did, keys))
    }

    fn public_key_prefix(&self) -> &str {
        self.keys.public_key.get(..8).unwrap_or_default()
    }

    /// The issuer DID.
    pub fn issuer_did(&self) -> &str {
        self.issuer_did.as_str()
    }

    /// The issuer DID as a typed value.
    pub fn did(&self) -> &Did {
        &self.issuer_did
    }

    /// The issuer public key, lowercase hex.
    pub fn public_key(&self) -> &str {
        &self.keys.public_key
    }

    /// `<issuer DID>#key-1`, the only verification method accepted.
    pub fn verification_method(&self) -> String {
        self.issuer_did.key_reference()
    }

    /// The persistable record for this identity.
    pub fn key_material(&self) -> KeyMaterial {
        self.keys.clone()
    }

    /// Canonicalize `data` and sign it with the issuer key.
    pub fn sign(&self, data: &impl Serialize) -> Result<String, CryptoError> {
        ed25519::sign(data, &self.keys.private_key)
    }

    /// Check a hex signature over `data` against the issuer public key.
    pub fn verify<T: Serialize + ?Sized>(&self, data: Option<&T>, signature_hex: &str) -> bool {
        ed25519::verify(data, signature_hex, &self.keys.public_key)
    }

    /// Write the current record to the store.
    pub fn persist(&self) -> Result<(), CustodianError> {
        self.store.save(&self.keys)
    }

    /// Whether the store still holds this identity's record.
    pub fn is_persisted(&self) -> bool {
        matches!(
            self.store.load(),
            Ok(Some(record)) if record.public_key.eq_ignore_ascii_case(&self.keys.public_key)
        )
    }
}

impl std::fmt::Debug for KeyCustodian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCustodian")
            .field("issuer_did", &self.issuer_did)
            .field("public_key", &self.keys.public_key)
            .field("store", &self.store.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory() -> Arc<MemoryKeyStore> {
        Arc::new(MemoryKeyStore::new())
    }

    #[test]
    fn initialize_generates_and_persists_when_empty() {
        let store = memory();
        let custodian = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        assert_eq!(custodian.issuer_did(), "did:vc-server:issuer");
        assert_eq!(custodian.public_key().len(), 64);

        let record = store.record().unwrap();
        assert_eq!(record.issuer_did, "did:vc-server:issuer");
        assert_eq!(record.public_key, custodian.public_key());
        assert_eq!(record.private_key.len(), 128);
    }

    #[test]
    fn initialize_reuses_stored_record() {
        let store = memory();
        let first = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        let second = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn stored_did_wins_over_default() {
        let store = memory();
        let custom = Did::new("did:example:custom").unwrap();
        let first = KeyCustodian::initialize(store.clone(), custom).unwrap();
        let second = KeyCustodian::initialize(store, Did::default()).unwrap();
        assert_eq!(second.issuer_did(), "did:example:custom");
        assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn inconsistent_record_is_replaced() {
        let a = ed25519::generate_key_pair();
        let b = ed25519::generate_key_pair();
        let store = Arc::new(MemoryKeyStore::with_record(KeyMaterial {
            issuer_did: "did:vc-server:issuer".into(),
            public_key: b.public_key.clone(),
            private_key: a.private_key.clone(),
        }));
        let custodian = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        assert_ne!(custodian.public_key(), b.public_key);
        assert_eq!(store.record().unwrap().public_key, custodian.public_key());
    }

    #[test]
    fn record_with_bad_did_is_replaced() {
        let kp = ed25519::generate_key_pair();
        let store = Arc::new(MemoryKeyStore::with_record(KeyMaterial {
            issuer_did: "not a did".into(),
            public_key: kp.public_key.clone(),
            private_key: kp.private_key.clone(),
        }));
        let custodian = KeyCustodian::initialize(store, Did::default()).unwrap();
        assert_eq!(custodian.issuer_did(), "did:vc-server:issuer");
        assert_ne!(custodian.public_key(), kp.public_key);
    }

    #[test]
    fn sign_and_verify_bound_to_identity() {
        let custodian = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        let data = json!({"name": "Alice"});
        let sig = custodian.sign(&data).unwrap();
        assert!(custodian.verify(Some(&data), &sig));
        assert!(!custodian.verify(Some(&json!({"name": "Bob"})), &sig));
        assert!(ed25519::verify(Some(&data), &sig, custodian.public_key()));
    }

    #[test]
    fn other_custodian_cannot_verify() {
        let a = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        let b = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        let data = json!({"n": 1});
        let sig = a.sign(&data).unwrap();
        assert!(!b.verify(Some(&data), &sig));
    }

    #[test]
    fn sign_matches_hex_level_signature() {
        let custodian = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        let data = json!({"b": [1, 2], "a": "x"});
        let expected = ed25519::sign(&data, &custodian.key_material().private_key).unwrap();
        assert_eq!(custodian.sign(&data).unwrap(), expected);
    }

    #[test]
    fn load_requires_existing_record() {
        let store = memory();
        let result = KeyCustodian::load(store.clone());
        assert!(matches!(result, Err(CustodianError::NotFound(_))));
        assert!(store.record().is_none());
    }

    #[test]
    fn load_reads_existing_record() {
        let store = memory();
        let created = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        let loaded = KeyCustodian::load(store).unwrap();
        assert_eq!(loaded.public_key(), created.public_key());
        assert_eq!(loaded.issuer_did(), created.issuer_did());
    }

    #[test]
    fn load_rejects_inconsistent_record_without_replacing_it() {
        let a = ed25519::generate_key_pair();
        let b = ed25519::generate_key_pair();
        let store = Arc::new(MemoryKeyStore::with_record(KeyMaterial {
            issuer_did: "did:vc-server:issuer".into(),
            public_key: b.public_key.clone(),
            private_key: a.private_key.clone(),
        }));
        assert!(matches!(
            KeyCustodian::load(store.clone()),
            Err(CustodianError::Crypto(_))
        ));
        assert_eq!(store.record().unwrap().public_key, b.public_key);
    }

    #[test]
    fn uppercase_record_is_normalized() {
        let kp = ed25519::generate_key_pair();
        let store = Arc::new(MemoryKeyStore::with_record(KeyMaterial {
            issuer_did: "did:vc-server:issuer".into(),
            public_key: kp.public_key.to_ascii_uppercase(),
            private_key: kp.private_key.to_ascii_uppercase(),
        }));
        let custodian = KeyCustodian::load(store).unwrap();
        assert_eq!(custodian.public_key(), kp.public_key);
        let data = json!({"n": 1});
        let sig = custodian.sign(&data).unwrap();
        assert!(ed25519::verify(Some(&data), &sig, &kp.public_key));
    }

    #[test]
    fn verification_method_has_key_fragment() {
        let custodian = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        assert_eq!(
            custodian.verification_method(),
            "did:vc-server:issuer#key-1"
        );
    }

    #[test]
    fn debug_output_hides_private_key() {
        let custodian = KeyCustodian::initialize(memory(), Did::default()).unwrap();
        let material = custodian.key_material();
        assert!(!format!("{custodian:?}").contains(&material.private_key));
        assert!(!format!("{material:?}").contains(&material.private_key));
    }

    // ── FileKeyStore ────────────────────────────────────────────────

    #[test]
    fn file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_creates_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = Arc::new(FileKeyStore::in_dir(&nested));
        let custodian = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();

        let path = nested.join(KEY_FILE_NAME);
        assert!(path.exists());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["issuerDid"], "did:vc-server:issuer");
        assert_eq!(on_disk["publicKey"], custodian.public_key());
        assert_eq!(on_disk["privateKey"].as_str().unwrap().len(), 128);

        let reloaded = KeyCustodian::initialize(store, Did::default()).unwrap();
        assert_eq!(reloaded.public_key(), custodian.public_key());
    }

    #[test]
    fn file_store_malformed_json_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEY_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = Arc::new(FileKeyStore::new(&path));
        assert!(matches!(store.load(), Err(CustodianError::Malformed(_))));

        let custodian = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        let record = store.load().unwrap().unwrap();
        assert_eq!(record.public_key, custodian.public_key());
    }

    #[test]
    fn file_store_wrong_shape_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEY_FILE_NAME);
        fs::write(&path, r#"{"issuerDid": "did:vc-server:issuer"}"#).unwrap();
        let store = Arc::new(FileKeyStore::new(&path));
        let custodian = KeyCustodian::initialize(store, Did::default()).unwrap();
        assert_eq!(custodian.public_key().len(), 64);
    }

    #[test]
    fn persist_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = Arc::new(FileKeyStore::in_dir(blocker.join("keys")));
        let result = KeyCustodian::initialize(store, Did::default());
        assert!(matches!(result, Err(CustodianError::Storage { .. })));
    }

    #[test]
    fn is_persisted_tracks_the_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKeyStore::in_dir(dir.path()));
        let custodian = KeyCustodian::initialize(store.clone(), Did::default()).unwrap();
        assert!(custodian.is_persisted());

        fs::remove_file(store.path()).unwrap();
        assert!(!custodian.is_persisted());

        custodian.persist().unwrap();
        assert!(custodian.is_persisted());
    }

    #[test]
    fn file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKeyStore::in_dir(dir.path()));
        KeyCustodian::initialize(store, Did::default()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![KEY_FILE_NAME.to_string()]);
    }
}
