use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use openssl::sign::Signer;

use crate::config::Settings;
use crate::models::seal::CREATION_DATE_FORMAT;
use crate::models::{AuthorMetadata, SealError, SealMetadata, SignedDocument};
use crate::services::fingerprint_engine;
use crate::services::key_manager::{KeyManager, PrivateKeyHandle};
use crate::utils::atomic_file::{self, Publish};
use crate::utils::secret::SecretString;

/// A signed artifact and where it was published.
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub path: PathBuf,
    pub document: SignedDocument,
}

pub struct DocumentSigner {
    key_manager: Arc<KeyManager>,
    output_dir: PathBuf,
}

impl DocumentSigner {
    pub fn new(settings: &Settings, key_manager: Arc<KeyManager>) -> Self {
        Self {
            key_manager,
            output_dir: settings.output_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fingerprints `document`, signs the fingerprint's hex string with
    /// RSA PKCS#1 v1.5 / SHA-256 and appends the seal after the untouched
    /// document bytes.
    pub fn sign(
        &self,
        document: &[u8],
        private_key: &PrivateKeyHandle<'_>,
        author: &AuthorMetadata,
    ) -> Result<SignedDocument, SealError> {
        let fingerprint = fingerprint_engine::fingerprint(document);
        let signature = sign_fingerprint(&fingerprint, private_key)?;
        let creation_date = Utc::now().format(CREATION_DATE_FORMAT).to_string();

        let seal = SealMetadata::new(hex::encode(signature), fingerprint, author, creation_date);
        let signed = SignedDocument::assemble(document, seal)?;

        info!(
            "Signed {} byte document for {} (fingerprint {})",
            document.len(),
            author.author,
            signed.fingerprint()
        );
        Ok(signed)
    }

    /// Unlocks the on-disk private key and signs inside the key manager's
    /// critical section, shared by every signer over the same key. The key
    /// handle is released before this returns.
    pub fn sign_with_passphrase(
        &self,
        document: &[u8],
        passphrase: &str,
        author: &AuthorMetadata,
    ) -> Result<SignedDocument, SealError> {
        self.key_manager
            .with_unlocked(passphrase, |private_key| self.sign(document, private_key, author))
    }

    /// Publishes the artifact under the output directory. Never overwrites
    /// an existing artifact; a published file is never edited in place.
    pub fn publish(&self, document: &SignedDocument, file_name: &str) -> Result<PathBuf, SealError> {
        let target = self.artifact_path(file_name)?;

        atomic_file::write_atomically(&target, document.as_bytes(), Publish::CreateNew).map_err(|e| {
            match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    warn!("Refusing to overwrite published artifact {}", target.display());
                    SealError::ArtifactExists(target.display().to_string())
                }
                _ => {
                    error!("Failed to publish {}: {}", target.display(), e);
                    SealError::Storage(format!("Failed to publish artifact: {}", e))
                }
            }
        })?;

        info!("Published artifact {}", target.display());
        Ok(target)
    }

    /// Signs and publishes in one go. Nothing is written unless signing
    /// fully succeeds.
    pub fn sign_and_publish(
        &self,
        document: &[u8],
        passphrase: &str,
        author: &AuthorMetadata,
        file_name: &str,
    ) -> Result<PublishedArtifact, SealError> {
        let target = self.artifact_path(file_name)?;
        if target.exists() {
            return Err(SealError::ArtifactExists(target.display().to_string()));
        }

        let signed = self.sign_with_passphrase(document, passphrase, author)?;
        let path = self.publish(&signed, file_name)?;
        Ok(PublishedArtifact { path, document: signed })
    }

    /// Runs [`DocumentSigner::sign_and_publish`] on the blocking pool.
    ///
    /// Dropping the returned future does not cancel the work: once started
    /// the task runs to atomic completion or rolls back on its own.
    pub async fn sign_and_publish_offloaded(
        self: Arc<Self>,
        document: Vec<u8>,
        passphrase: SecretString,
        author: AuthorMetadata,
        file_name: String,
    ) -> Result<PublishedArtifact, SealError> {
        tokio::task::spawn_blocking(move || {
            self.sign_and_publish(&document, &passphrase, &author, &file_name)
        })
        .await
        .map_err(|e| SealError::SigningError(format!("Signing task failed: {}", e)))?
    }

    fn artifact_path(&self, file_name: &str) -> Result<PathBuf, SealError> {
        let valid = !file_name.is_empty()
            && !file_name.starts_with('.')
            && !file_name.contains(|c: char| c == '/' || c == '\\');
        if !valid {
            return Err(SealError::Storage(format!("Invalid artifact file name: {:?}", file_name)));
        }
        Ok(self.output_dir.join(file_name))
    }
}

/// Output naming used by the document pipeline: `<stem>_<author>.<ext>`.
pub fn artifact_file_name(document_stem: &str, author_short_name: &str, extension: &str) -> String {
    format!("{}_{}.{}", document_stem, author_short_name, extension.trim_start_matches('.'))
}

fn sign_fingerprint(fingerprint: &str, private_key: &PrivateKeyHandle<'_>) -> Result<Vec<u8>, SealError> {
    let mut signer = Signer::new(MessageDigest::sha256(), private_key.key())
        .map_err(|e| SealError::SigningError(e.to_string()))?;
    signer
        .set_rsa_padding(Padding::PKCS1)
        .map_err(|e| SealError::SigningError(e.to_string()))?;
    signer
        .update(fingerprint.as_bytes())
        .map_err(|e| SealError::SigningError(e.to_string()))?;
    signer
        .sign_to_vec()
        .map_err(|e| SealError::SigningError(e.to_string()))
}
