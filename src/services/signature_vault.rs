use log::debug;
use openssl::hash::MessageDigest;
use openssl::pkcs5::pbkdf2_hmac;
use openssl::symm::{decrypt_aead, encrypt_aead, Cipher};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::models::SealError;
use crate::utils::secret::{DerivedKey, SecretBytes};

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

const ASSET_AAD: &[u8] = b"docseal:signature-asset:v1";

/// Password-based AEAD for signature images.
///
/// Each call to [`SignatureVault::encrypt`] draws a fresh salt, derives a
/// 256-bit key with PBKDF2-HMAC-SHA256 and seals the bytes with
/// AES-256-GCM. Ciphertext layout is `nonce || ciphertext || tag`.
#[derive(Debug, Clone)]
pub struct SignatureVault {
    iterations: u32,
}

impl SignatureVault {
    pub fn new(settings: &Settings) -> Self {
        Self::with_iterations(settings.kdf_iterations)
    }

    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn encrypt(&self, asset: &[u8], password: &str) -> Result<([u8; SALT_LEN], Vec<u8>), SealError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let key = self
            .derive_key(password, &salt)
            .map_err(|e| SealError::EncryptionFailed(e.to_string()))?;

        let mut tag = [0u8; TAG_LEN];
        let sealed = encrypt_aead(Cipher::aes_256_gcm(), &key[..], Some(&nonce), ASSET_AAD, asset, &mut tag)
            .map_err(|e| SealError::EncryptionFailed(e.to_string()))?;

        let mut ciphertext = Vec::with_capacity(NONCE_LEN + sealed.len() + TAG_LEN);
        ciphertext.extend_from_slice(&nonce);
        ciphertext.extend_from_slice(&sealed);
        ciphertext.extend_from_slice(&tag);

        debug!("Encrypted {} byte signature asset", asset.len());
        Ok((salt, ciphertext))
    }

    /// Wrong password, truncation and tampering all surface as
    /// `DecryptionFailed`; no bytes are returned unless the tag verifies.
    pub fn decrypt(&self, ciphertext: &[u8], password: &str, salt: &[u8]) -> Result<SecretBytes, SealError> {
        if salt.len() != SALT_LEN || ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(SealError::DecryptionFailed);
        }

        let (nonce, rest) = ciphertext.split_at(NONCE_LEN);
        let (sealed, tag) = rest.split_at(rest.len() - TAG_LEN);

        let key = self.derive_key(password, salt).map_err(|_| SealError::DecryptionFailed)?;
        let plain = decrypt_aead(Cipher::aes_256_gcm(), &key[..], Some(nonce), ASSET_AAD, sealed, tag)
            .map_err(|_| SealError::DecryptionFailed)?;

        Ok(SecretBytes::new(plain))
    }

    fn derive_key(&self, password: &str, salt: &[u8]) -> Result<DerivedKey, openssl::error::ErrorStack> {
        let mut key: DerivedKey = Zeroizing::new([0u8; 32]);
        pbkdf2_hmac(
            password.as_bytes(),
            salt,
            self.iterations as usize,
            MessageDigest::sha256(),
            &mut key[..],
        )?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_KDF_ITERATIONS;

    fn vault() -> SignatureVault {
        SignatureVault::with_iterations(MIN_KDF_ITERATIONS)
    }

    fn png_buffer(len: usize) -> Vec<u8> {
        let mut buf = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        buf.extend((0..len - buf.len()).map(|i| (i % 251) as u8));
        buf
    }

    #[test]
    fn test_round_trip_200_byte_png() {
        let asset = png_buffer(200);
        let (salt, ciphertext) = vault().encrypt(&asset, "secret123").unwrap();

        assert_eq!(salt.len(), 16);
        assert!(ciphertext.len() > 200);
        assert_eq!(ciphertext.len(), 200 + NONCE_LEN + TAG_LEN);

        let plain = vault().decrypt(&ciphertext, "secret123", &salt).unwrap();
        assert_eq!(plain.expose(), asset.as_slice());
    }

    #[test]
    fn test_wrong_password_is_decryption_failed() {
        let asset = png_buffer(200);
        let (salt, ciphertext) = vault().encrypt(&asset, "secret123").unwrap();

        for wrong in ["secret124", "", "SECRET123", "secret123 "] {
            let err = vault().decrypt(&ciphertext, wrong, &salt).unwrap_err();
            assert!(matches!(err, SealError::DecryptionFailed), "password {:?}", wrong);
        }
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let asset = png_buffer(64);
        let (salt_a, ct_a) = vault().encrypt(&asset, "pw").unwrap();
        let (salt_b, ct_b) = vault().encrypt(&asset, "pw").unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(ct_a, ct_b);
    }

    #[test]
    fn test_truncated_or_tampered_ciphertext_fails() {
        let asset = png_buffer(120);
        let (salt, ciphertext) = vault().encrypt(&asset, "pw").unwrap();

        let truncated = &ciphertext[..ciphertext.len() - 1];
        assert!(matches!(vault().decrypt(truncated, "pw", &salt), Err(SealError::DecryptionFailed)));

        assert!(matches!(vault().decrypt(&ciphertext[..10], "pw", &salt), Err(SealError::DecryptionFailed)));

        let mut flipped = ciphertext.clone();
        flipped[NONCE_LEN + 5] ^= 0x01;
        assert!(matches!(vault().decrypt(&flipped, "pw", &salt), Err(SealError::DecryptionFailed)));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let asset = png_buffer(50);
        let (mut salt, ciphertext) = vault().encrypt(&asset, "pw").unwrap();
        salt[0] ^= 0xff;
        assert!(matches!(vault().decrypt(&ciphertext, "pw", &salt), Err(SealError::DecryptionFailed)));
        assert!(matches!(vault().decrypt(&ciphertext, "pw", &salt[..8]), Err(SealError::DecryptionFailed)));
    }

    #[test]
    fn test_empty_asset_round_trips() {
        let (salt, ciphertext) = vault().encrypt(&[], "pw").unwrap();
        assert_eq!(ciphertext.len(), NONCE_LEN + TAG_LEN);
        assert!(vault().decrypt(&ciphertext, "pw", &salt).unwrap().is_empty());
    }
}
