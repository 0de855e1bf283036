//! Integrity core for generated documents: encrypted signature assets,
//! content fingerprints, RSA seals and independent verification.

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, Settings};
pub use models::{AuthorMetadata, AuthorProfile, SealError, SignedDocument, VerificationFailure, VerificationResult};
pub use services::{DocumentSigner, KeyManager, SignatureAssetStore, SignatureVault, VerificationService};
