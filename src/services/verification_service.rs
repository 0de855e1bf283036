use std::fs;

use chrono::Utc;
use log::{debug, info, warn};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, PKeyRef, Public};
use openssl::rsa::Padding;
use openssl::sign::Verifier;
use serde::Deserialize;

use crate::config::Settings;
use crate::models::verification::VerifiedSeal;
use crate::models::{AuthorMetadata, SealError, VerificationFailure, VerificationResult, SIGNATURE_ALGORITHM};
use crate::services::key_manager::parse_public_key;
use crate::utils::container::SealedArtifact;

/// Seal fields as declared in an untrusted artifact; anything may be
/// missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DeclaredSeal {
    signature: Option<String>,
    fingerprint: Option<String>,
    author: Option<String>,
    role: Option<String>,
    email: Option<String>,
    mobile_phone: Option<String>,
    signature_algorithm: Option<String>,
    creation_date: Option<String>,
}

/// Checks sealed artifacts against the public key. Holds no mutable state
/// and can be shared freely across request handlers.
pub struct VerificationService {
    public_key: PKey<Public>,
    public_key_pem: String,
}

impl VerificationService {
    pub fn from_pem(pem: &[u8]) -> Result<Self, SealError> {
        let public_key = parse_public_key(pem)?;
        let public_key_pem = String::from_utf8(pem.to_vec())
            .map_err(|e| SealError::KeyUnavailable(format!("Public key is not valid UTF-8: {}", e)))?;
        Ok(Self {
            public_key,
            public_key_pem,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SealError> {
        let pem = fs::read(&settings.public_key_path).map_err(|e| {
            SealError::KeyUnavailable(format!("{}: {}", settings.public_key_path.display(), e))
        })?;
        info!("Loaded verification key from {}", settings.public_key_path.display());
        Self::from_pem(&pem)
    }

    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn verify(&self, artifact: &[u8]) -> VerificationResult {
        verify(artifact, &self.public_key)
    }
}

/// Verifies the seal embedded in `artifact`.
///
/// The signature is checked over the *declared* fingerprint field. The
/// content preceding the seal is not re-hashed here, so edits to the
/// document body that leave the seal untouched are not detected by this
/// check alone.
pub fn verify(artifact: &[u8], public_key: &PKeyRef<Public>) -> VerificationResult {
    let trailer = match SealedArtifact::split(artifact).trailer {
        Some(trailer) => trailer,
        None => {
            info!("Verification failed: no seal found in {} byte artifact", artifact.len());
            return VerificationResult::failed(VerificationFailure::MissingSignature);
        }
    };

    let declared: DeclaredSeal = match serde_json::from_slice(trailer) {
        Ok(seal) => seal,
        Err(e) => {
            warn!("Verification failed: unreadable seal: {}", e);
            return VerificationResult::failed(VerificationFailure::MalformedSignature);
        }
    };

    let (signature_hex, fingerprint) = match (non_empty(&declared.signature), non_empty(&declared.fingerprint)) {
        (Some(sig), Some(fp)) => (sig, fp),
        _ => {
            info!("Verification failed: signature or fingerprint missing from seal");
            return VerificationResult::failed(VerificationFailure::MissingSignature);
        }
    };

    let signature = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Verification failed: signature is not valid hex: {}", e);
            return VerificationResult::failed(VerificationFailure::MalformedSignature);
        }
    };

    if !signature_matches(fingerprint, &signature, public_key) {
        warn!("Verification failed: signature mismatch for fingerprint {}", fingerprint);
        return VerificationResult::failed(VerificationFailure::SignatureMismatch);
    }

    debug!("Signature verified for fingerprint {}", fingerprint);
    VerificationResult::verified(VerifiedSeal {
        author: AuthorMetadata {
            author: or_default(declared.author, "Unknown"),
            role: or_default(declared.role, "Not Specified"),
            email: or_default(declared.email, "Not Provided"),
            mobile_phone: or_default(declared.mobile_phone, "Not Provided"),
        },
        signature_algorithm: or_default(declared.signature_algorithm, SIGNATURE_ALGORITHM),
        date: or_default(declared.creation_date, "Unknown"),
        fingerprint: fingerprint.to_string(),
        verified_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

fn signature_matches(fingerprint: &str, signature: &[u8], public_key: &PKeyRef<Public>) -> bool {
    let check = || -> Result<bool, openssl::error::ErrorStack> {
        let mut verifier = Verifier::new(MessageDigest::sha256(), public_key)?;
        verifier.set_rsa_padding(Padding::PKCS1)?;
        verifier.update(fingerprint.as_bytes())?;
        verifier.verify(signature)
    };
    // OpenSSL reports some malformed signatures (e.g. wrong length) as errors
    // rather than `false`; both mean the signature does not match.
    check().unwrap_or(false)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}
