use std::sync::{Arc, OnceLock};

use tempfile::TempDir;

use crate::config::Settings;
use crate::models::{AuthorMetadata, KeyPair};
use crate::services::{DocumentSigner, KeyManager};

pub const TEST_PASSPHRASE: &str = "correct horse battery staple";

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

/// One RSA keypair per test binary; generation is the slow part.
pub fn shared_keypair() -> &'static KeyPair {
    KEYPAIR.get_or_init(|| KeyManager::generate(TEST_PASSPHRASE).expect("generate test keypair"))
}

pub fn sample_author() -> AuthorMetadata {
    AuthorMetadata {
        author: "Jane Roe".to_string(),
        role: "Notary".to_string(),
        email: "jane@example.org".to_string(),
        mobile_phone: "+1 555 0100".to_string(),
    }
}

pub struct SigningEnv {
    _dir: TempDir,
    pub settings: Settings,
    pub key_manager: Arc<KeyManager>,
    pub signer: DocumentSigner,
}

/// Scratch key and output directories with the shared keypair on disk.
pub fn signing_env() -> SigningEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        public_key_path: dir.path().join("keys/public_key.pem"),
        private_key_path: dir.path().join("keys/private_key.pem"),
        signers_dir: dir.path().join("signers"),
        output_dir: dir.path().join("output"),
        ..Settings::default()
    };
    let key_manager = Arc::new(KeyManager::new(&settings));
    key_manager.save(shared_keypair(), false).expect("save test keypair");
    let signer = DocumentSigner::new(&settings, key_manager.clone());

    SigningEnv {
        _dir: dir,
        settings,
        key_manager,
        signer,
    }
}
