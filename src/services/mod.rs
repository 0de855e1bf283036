pub mod asset_store;
pub mod document_signer;
pub mod fingerprint_engine;
pub mod key_manager;
pub mod signature_vault;
pub mod verification_service;

pub use asset_store::SignatureAssetStore;
pub use document_signer::{DocumentSigner, PublishedArtifact};
pub use key_manager::{KeyManager, PrivateKeyHandle};
pub use signature_vault::SignatureVault;
pub use verification_service::VerificationService;
