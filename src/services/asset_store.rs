use std::fs;
use std::io;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::models::{AuthorProfile, SealError};
use crate::services::signature_vault::SignatureVault;
use crate::utils::atomic_file::{self, Publish};
use crate::utils::secret::SecretBytes;

const RECORD_SUFFIX: &str = ".sigasset.json";
const MAX_AUTHOR_ID_LEN: usize = 64;

/// On-disk record. Salt and ciphertext share one file so they are always
/// replaced and removed together.
#[derive(Debug, Serialize, Deserialize)]
struct AssetRecord {
    author_id: String,
    salt: String,
    ciphertext: String,
    #[serde(default)]
    profile: Option<AuthorProfile>,
}

/// File-backed store of encrypted signature images, one record per author.
pub struct SignatureAssetStore {
    dir: PathBuf,
    vault: SignatureVault,
}

impl SignatureAssetStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            dir: settings.signers_dir.clone(),
            vault: SignatureVault::new(settings),
        }
    }

    /// Encrypts `asset` under `password` and stores it for the profile's
    /// short name, replacing any previous upload.
    pub fn register(&self, profile: &AuthorProfile, asset: &[u8], password: &str) -> Result<(), SealError> {
        let author_id = profile.short_name.as_str();
        let path = self.record_path(author_id)?;
        let (salt, ciphertext) = self.vault.encrypt(asset, password)?;

        let record = AssetRecord {
            author_id: author_id.to_string(),
            salt: hex::encode(salt),
            ciphertext: STANDARD.encode(ciphertext),
            profile: Some(profile.clone()),
        };
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| SealError::Storage(format!("Failed to encode asset record: {}", e)))?;

        let replacing = path.exists();
        atomic_file::write_atomically(&path, &bytes, Publish::Replace).map_err(|e| {
            error!("Failed to store signature asset for {}: {}", author_id, e);
            SealError::Storage(format!("Failed to store signature asset: {}", e))
        })?;

        if replacing {
            info!("Replaced signature asset for {}", author_id);
        } else {
            info!("Registered signature asset for {}", author_id);
        }
        Ok(())
    }

    /// Decrypts the stored asset. Wrong passwords and corrupt records both
    /// yield `DecryptionFailed`.
    pub fn load(&self, author_id: &str, password: &str) -> Result<SecretBytes, SealError> {
        let record = self.read_record(author_id)?;

        let salt = hex::decode(&record.salt).map_err(|_| {
            warn!("Corrupt salt in asset record for {}", author_id);
            SealError::DecryptionFailed
        })?;
        let ciphertext = STANDARD.decode(&record.ciphertext).map_err(|_| {
            warn!("Corrupt ciphertext in asset record for {}", author_id);
            SealError::DecryptionFailed
        })?;

        self.vault.decrypt(&ciphertext, password, &salt).map_err(|e| {
            info!("Signature asset decryption failed for {}", author_id);
            e
        })
    }

    pub fn profile(&self, author_id: &str) -> Result<AuthorProfile, SealError> {
        self.read_record(author_id)?
            .profile
            .ok_or_else(|| SealError::UnknownAuthor(author_id.to_string()))
    }

    pub fn contains(&self, author_id: &str) -> bool {
        self.record_path(author_id).map(|p| p.exists()).unwrap_or(false)
    }

    /// Removes the author's record. Returns whether anything was deleted.
    pub fn delete(&self, author_id: &str) -> Result<bool, SealError> {
        let path = self.record_path(author_id)?;
        let removed = atomic_file::remove_if_exists(&path)
            .map_err(|e| SealError::Storage(format!("Failed to delete signature asset: {}", e)))?;
        if removed {
            info!("Deleted signature asset for {}", author_id);
        }
        Ok(removed)
    }

    /// Author ids with a stored asset, sorted.
    pub fn list(&self) -> Result<Vec<String>, SealError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SealError::Storage(format!("Failed to read signers directory: {}", e))),
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(RECORD_SUFFIX)
                    .filter(|id| validate_author_id(id).is_ok())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn read_record(&self, author_id: &str) -> Result<AssetRecord, SealError> {
        let path = self.record_path(author_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SealError::UnknownAuthor(author_id.to_string()))
            }
            Err(e) => return Err(SealError::Storage(format!("Failed to read signature asset: {}", e))),
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Unreadable asset record for {}: {}", author_id, e);
            SealError::DecryptionFailed
        })
    }

    fn record_path(&self, author_id: &str) -> Result<PathBuf, SealError> {
        validate_author_id(author_id)?;
        Ok(self.dir.join(format!("{}{}", author_id, RECORD_SUFFIX)))
    }
}

fn validate_author_id(author_id: &str) -> Result<(), SealError> {
    let valid = !author_id.is_empty()
        && author_id.len() <= MAX_AUTHOR_ID_LEN
        && author_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(SealError::InvalidAuthorId(author_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SignatureAssetStore) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            signers_dir: dir.path().join("signers"),
            ..Settings::default()
        };
        let store = SignatureAssetStore::new(&settings);
        (dir, store)
    }

    fn profile(short_name: &str) -> AuthorProfile {
        AuthorProfile::new("Jane Roe", short_name, "jane@example.org", "+1 555 0100", "Notary")
    }

    #[test]
    fn test_register_and_load() {
        let (_dir, store) = store();
        let image = vec![7u8; 200];

        store.register(&profile("jroe"), &image, "secret123").unwrap();

        assert!(store.contains("jroe"));
        assert_eq!(store.load("jroe", "secret123").unwrap().expose(), image.as_slice());
        assert_eq!(store.profile("jroe").unwrap().full_name, "Jane Roe");
    }

    #[test]
    fn test_wrong_password_is_decryption_failed() {
        let (_dir, store) = store();
        store.register(&profile("jroe"), b"image", "secret123").unwrap();
        assert!(matches!(store.load("jroe", "guess"), Err(SealError::DecryptionFailed)));
    }

    #[test]
    fn test_reupload_replaces_salt_and_ciphertext() {
        let (_dir, store) = store();
        store.register(&profile("jroe"), b"first", "pw-one").unwrap();
        store.register(&profile("jroe"), b"second", "pw-two").unwrap();

        assert!(matches!(store.load("jroe", "pw-one"), Err(SealError::DecryptionFailed)));
        assert_eq!(store.load("jroe", "pw-two").unwrap().expose(), b"second");
        assert_eq!(store.list().unwrap(), vec!["jroe".to_string()]);
    }

    #[test]
    fn test_delete_removes_record() {
        let (_dir, store) = store();
        store.register(&profile("jroe"), b"image", "pw").unwrap();

        assert!(store.delete("jroe").unwrap());
        assert!(!store.delete("jroe").unwrap());
        assert!(!store.contains("jroe"));
        assert!(matches!(store.load("jroe", "pw"), Err(SealError::UnknownAuthor(_))));
    }

    #[test]
    fn test_list_is_sorted_and_ignores_stray_files() {
        let (dir, store) = store();
        store.register(&profile("zed"), b"z", "pw").unwrap();
        store.register(&profile("amy"), b"a", "pw").unwrap();
        fs::write(dir.path().join("signers").join("notes.txt"), b"x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["amy".to_string(), "zed".to_string()]);
    }

    #[test]
    fn test_list_on_missing_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unsafe_author_ids() {
        let (_dir, store) = store();
        for id in ["", "../etc", "a/b", "with space", "x".repeat(65).as_str()] {
            assert!(
                matches!(store.register(&profile(id), b"i", "pw"), Err(SealError::InvalidAuthorId(_))),
                "id {:?}",
                id
            );
        }
    }

    #[test]
    fn test_corrupt_record_is_decryption_failed() {
        let (dir, store) = store();
        store.register(&profile("jroe"), b"image", "pw").unwrap();
        let path = dir.path().join("signers").join("jroe.sigasset.json");
        let mut record: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        record["ciphertext"] = serde_json::Value::String("!!!not base64".to_string());
        fs::write(&path, serde_json::to_vec(&record).unwrap()).unwrap();

        assert!(matches!(store.load("jroe", "pw"), Err(SealError::DecryptionFailed)));
    }
}
