use serde::{Deserialize, Serialize};
use std::fmt;

use super::AuthorMetadata;

/// Fixed vocabulary of verification failures shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationFailure {
    MissingSignature,
    MalformedSignature,
    SignatureMismatch,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::MissingSignature => write!(f, "missing-signature"),
            VerificationFailure::MalformedSignature => write!(f, "malformed-signature"),
            VerificationFailure::SignatureMismatch => write!(f, "signature-mismatch"),
        }
    }
}

/// Metadata recovered from a seal whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedSeal {
    #[serde(flatten)]
    pub author: AuthorMetadata,
    pub signature_algorithm: String,
    pub date: String,
    pub fingerprint: String,
    pub verified_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<VerifiedSeal>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<VerificationFailure>,
}

impl VerificationResult {
    pub fn verified(seal: VerifiedSeal) -> Self {
        Self {
            valid: true,
            metadata: Some(seal),
            reason: None,
        }
    }

    pub fn failed(reason: VerificationFailure) -> Self {
        Self {
            valid: false,
            metadata: None,
            reason: Some(reason),
        }
    }
}
