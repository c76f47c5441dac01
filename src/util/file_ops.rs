// Key Storage
// Persists encoded key envelopes by identifier, on disk or in memory

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};

/// File extension of stored keys
pub const KEY_EXTENSION: &str = "key";

/// Storage for encoded keys, addressed by identifier ("public", "private",
/// or a correspondent's email address).
pub trait KeyStore {
    fn load(&self, identifier: &str) -> Result<Vec<u8>>;

    fn save(&self, identifier: &str, data: &[u8]) -> Result<()>;
}

/// Stores each key as `<root>/<identifier>.key`
#[derive(Clone, Debug)]
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the process working directory
    pub fn current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn path_for(&self, identifier: &str) -> Result<PathBuf> {
        validate_identifier(identifier)?;
        Ok(self.root.join(format!("{}.{}", identifier, KEY_EXTENSION)))
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self, identifier: &str) -> Result<Vec<u8>> {
        let path = self.path_for(identifier)?;
        log::debug!("loading key {:?} from {}", identifier, path.display());
        read_file(&path).map_err(|e| match e {
            Error::Io(io) if io.kind() == io::ErrorKind::NotFound => {
                Error::KeyNotFound(identifier.to_string())
            }
            other => other,
        })
    }

    fn save(&self, identifier: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(identifier)?;
        log::debug!("saving key {:?} to {}", identifier, path.display());
        write_file(&path, data)
    }
}

/// In-process store, mostly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self, identifier: &str) -> Result<Vec<u8>> {
        validate_identifier(identifier)?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(identifier.to_string()))
    }

    fn save(&self, identifier: &str, data: &[u8]) -> Result<()> {
        validate_identifier(identifier)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(identifier.to_string(), data.to_vec());
        Ok(())
    }
}

impl<S: KeyStore + ?Sized> KeyStore for &S {
    fn load(&self, identifier: &str) -> Result<Vec<u8>> {
        (**self).load(identifier)
    }

    fn save(&self, identifier: &str, data: &[u8]) -> Result<()> {
        (**self).save(identifier, data)
    }
}

/// Identifiers become file names, so they must not walk the file system
fn validate_identifier(identifier: &str) -> Result<()> {
    let invalid = identifier.is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(&['/', '\\', '\0'][..]);
    if invalid {
        return Err(Error::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

/// Read entire file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Write data to file, replacing previous contents
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rsa-messenger-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_store_roundtrip() {
        let root = temp_root("roundtrip");
        let store = FileKeyStore::new(&root);

        store.save("alice@example.com", b"{\"key\":\"\"}").unwrap();
        assert_eq!(store.load("alice@example.com").unwrap(), b"{\"key\":\"\"}");
        assert!(root.join("alice@example.com.key").exists());

        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_file_store_missing_key() {
        let root = temp_root("missing");
        let store = FileKeyStore::new(&root);
        assert!(matches!(store.load("nobody"), Err(Error::KeyNotFound(id)) if id == "nobody"));
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_identifiers_cannot_escape_root() {
        let store = FileKeyStore::new(std::env::temp_dir());
        for bad in ["", ".", "..", "../etc/passwd", "a\\b"] {
            assert!(matches!(store.path_for(bad), Err(Error::InvalidIdentifier(_))));
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyStore::new();
        assert!(matches!(store.load("public"), Err(Error::KeyNotFound(_))));
        store.save("public", b"one").unwrap();
        store.save("public", b"two").unwrap();
        assert_eq!(store.load("public").unwrap(), b"two");
    }
}
