//! # Wallet Credential Storage
//!
//! Each wallet holds an ordered list of issued credentials. A wallet that
//! has never been written is an empty list, not an error.
//!
//! [`FileWalletStore`] keeps one `<dir>/<walletId>.json` file per wallet:
//!
//! ```json
//! { "credentials": [ ... ] }
//! ```
//!
//! Writes go through a temp file and a rename. Read-modify-write sequences
//! are serialized within the process by a single mutex; concurrent writers
//! in other processes are not arbitrated and the last write wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use vcs_core::storage::write_atomically;
use vcs_core::WalletId;

use crate::credential::Credential;
use crate::error::StorageError;

/// Directory under the data directory holding wallet files.
pub const WALLETS_DIR_NAME: &str = "wallets";

/// Backend for per-wallet credential lists.
pub trait WalletStore: Send + Sync {
    /// All credentials in the wallet, in issuance order.
    fn load_all(&self, wallet: &WalletId) -> Result<Vec<Credential>, StorageError>;

    /// Add a credential at the end of the wallet.
    fn append(&self, wallet: &WalletId, credential: &Credential) -> Result<(), StorageError>;

    /// Remove the credential with `id`. Returns whether one was removed.
    fn remove_by_id(&self, wallet: &WalletId, id: &str) -> Result<bool, StorageError>;

    /// The credential with `id`, if present.
    fn find_by_id(&self, wallet: &WalletId, id: &str) -> Result<Option<Credential>, StorageError> {
        Ok(self
            .load_all(wallet)?
            .into_iter()
            .find(|c| c.id() == id))
    }
}

/// On-disk shape of a wallet file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WalletFile {
    #[serde(default)]
    credentials: Vec<Credential>,
}

// ─── FileWalletStore ─────────────────────────────────────────────────────

/// Wallets as JSON files in one directory.
#[derive(Debug)]
pub struct FileWalletStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWalletStore {
    /// Store wallets directly inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store wallets in `<data_dir>/wallets`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(WALLETS_DIR_NAME))
    }

    /// Path of one wallet's file. Safe because `WalletId` excludes path
    /// separators and dots.
    pub fn wallet_path(&self, wallet: &WalletId) -> PathBuf {
        self.dir.join(format!("{wallet}.json"))
    }

    fn read(&self, wallet: &WalletId) -> Result<WalletFile, StorageError> {
        let path = self.wallet_path(wallet);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(WalletFile::default())
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
            path,
            message: e.to_string(),
        })
    }

    fn write(&self, wallet: &WalletId, file: &WalletFile) -> Result<(), StorageError> {
        let path = self.wallet_path(wallet);
        let json = serde_json::to_string_pretty(file)?;
        write_atomically(&path, json.as_bytes()).map_err(|source| StorageError::Io { path, source })
    }
}

impl WalletStore for FileWalletStore {
    fn load_all(&self, wallet: &WalletId) -> Result<Vec<Credential>, StorageError> {
        Ok(self.read(wallet)?.credentials)
    }

    fn append(&self, wallet: &WalletId, credential: &Credential) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut file = self.read(wallet)?;
        file.credentials.push(credential.clone());
        self.write(wallet, &file)
    }

    fn remove_by_id(&self, wallet: &WalletId, id: &str) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock();
        let mut file = self.read(wallet)?;
        let before = file.credentials.len();
        file.credentials.retain(|c| c.id() != id);
        if file.credentials.len() == before {
            return Ok(false);
        }
        self.write(wallet, &file)?;
        Ok(true)
    }
}

// ─── MemoryWalletStore ───────────────────────────────────────────────────

/// Wallets held in process memory.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    wallets: RwLock<HashMap<WalletId, Vec<Credential>>>,
}

impl MemoryWalletStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn load_all(&self, wallet: &WalletId) -> Result<Vec<Credential>, StorageError> {
        Ok(self.wallets.read().get(wallet).cloned().unwrap_or_default())
    }

    fn append(&self, wallet: &WalletId, credential: &Credential) -> Result<(), StorageError> {
        self.wallets
            .write()
            .entry(wallet.clone())
            .or_default()
            .push(credential.clone());
        Ok(())
    }

    fn remove_by_id(&self, wallet: &WalletId, id: &str) -> Result<bool, StorageError> {
        let mut wallets = self.wallets.write();
        let Some(list) = wallets.get_mut(wallet) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|c| c.id() != id);
        Ok(list.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{UnsignedCredential, ValidityWindow};
    use crate::proof::Proof;
    use serde_json::Map;
    use vcs_core::Timestamp;

    fn credential(tag: &str) -> Credential {
        let t = Timestamp::parse("2024-01-01").unwrap();
        let body = UnsignedCredential::new(
            "did:vc-server:issuer",
            "did:vc-server:wallet:w1".into(),
            tag,
            Map::new(),
            ValidityWindow { from: t, until: t },
        );
        Credential {
            body,
            proof: Proof::new("did:vc-server:issuer#key-1".into(), "00".repeat(64), t),
        }
    }

    fn wallet(id: &str) -> WalletId {
        WalletId::new(id).unwrap()
    }

    fn exercise(store: &dyn WalletStore) {
        let w1 = wallet("w1");
        let w2 = wallet("w2");
        assert!(store.load_all(&w1).unwrap().is_empty());

        let a = credential("A");
        let b = credential("B");
        store.append(&w1, &a).unwrap();
        store.append(&w1, &b).unwrap();

        let listed = store.load_all(&w1).unwrap();
        assert_eq!(listed, vec![a.clone(), b.clone()]);
        assert!(store.load_all(&w2).unwrap().is_empty());

        assert_eq!(store.find_by_id(&w1, a.id()).unwrap(), Some(a.clone()));
        assert_eq!(store.find_by_id(&w2, a.id()).unwrap(), None);

        assert!(!store.remove_by_id(&w2, a.id()).unwrap());
        assert!(store.remove_by_id(&w1, a.id()).unwrap());
        assert!(!store.remove_by_id(&w1, a.id()).unwrap());
        assert_eq!(store.load_all(&w1).unwrap(), vec![b]);
    }

    #[test]
    fn memory_store_semantics() {
        exercise(&MemoryWalletStore::new());
    }

    #[test]
    fn file_store_semantics() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileWalletStore::in_data_dir(dir.path()));
    }

    #[test]
    fn file_store_reading_missing_wallet_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWalletStore::in_data_dir(dir.path());
        assert!(store.load_all(&wallet("ghost")).unwrap().is_empty());
        assert!(!dir.path().join(WALLETS_DIR_NAME).exists());
    }

    #[test]
    fn file_store_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWalletStore::in_data_dir(dir.path());
        let c = credential("A");
        store.append(&wallet("w1"), &c).unwrap();

        let path = dir.path().join("wallets").join("w1.json");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "pretty-printed");
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["credentials"][0]["id"], c.id());
        assert_eq!(v["credentials"][0]["proof"]["type"], "DataIntegrityProof");
    }

    #[test]
    fn file_store_tolerates_missing_credentials_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWalletStore::in_data_dir(dir.path());
        fs::create_dir_all(dir.path().join("wallets")).unwrap();
        fs::write(dir.path().join("wallets").join("w1.json"), "{}").unwrap();
        assert!(store.load_all(&wallet("w1")).unwrap().is_empty());
    }

    #[test]
    fn file_store_reports_corrupt_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWalletStore::in_data_dir(dir.path());
        fs::create_dir_all(dir.path().join("wallets")).unwrap();
        fs::write(dir.path().join("wallets").join("w1.json"), "not json").unwrap();
        assert!(matches!(
            store.load_all(&wallet("w1")),
            Err(StorageError::Corrupt { .. })
        ));
        assert!(store.append(&wallet("w1"), &credential("A")).is_err());
    }

    #[test]
    fn file_store_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileWalletStore::in_data_dir(dir.path()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.append(&wallet("w1"), &credential(&format!("T{i}"))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.load_all(&wallet("w1")).unwrap().len(), 8);
    }
}
