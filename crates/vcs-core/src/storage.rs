//! Filesystem helpers shared by the file-backed stores.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace `path` with `bytes` by writing a sibling `.tmp` file and
/// renaming it over the target. Readers never observe a half-written file.
///
/// Parent directories are created if missing.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x").join("y.json");
        write_atomically(&path, b"one").unwrap();
        write_atomically(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
        assert!(!dir.path().join("x").join("y.json.tmp").exists());
    }

    #[test]
    fn fails_under_a_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        assert!(write_atomically(&blocker.join("f.json"), b"{}").is_err());
    }
}
