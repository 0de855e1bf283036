use serde::Serialize;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use thiserror::Error;

/// Failures of the signing side: key handling, signature asset vault and
/// artifact publication. Low-level causes are flattened into the message so
/// callers only ever see these variants.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("Invalid passphrase for private key")]
    InvalidPassphrase,

    #[error("Signature asset decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Signing failed: {0}")]
    SigningError(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Key material unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Artifact already exists: {0}")]
    ArtifactExists(String),

    #[error("Invalid author id: {0}")]
    InvalidAuthorId(String),

    #[error("Unknown author: {0}")]
    UnknownAuthor(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    EmptyUpload,
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::EmptyUpload => write!(f, "No file uploaded"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::EmptyUpload => {
                HttpResponse::BadRequest().json(ErrorResponse {
                    code: "EMPTY_UPLOAD".to_string(),
                    message: self.to_string(),
                    details: None,
                })
            }
            ApiError::InternalError(_) => {
                HttpResponse::InternalServerError().json(ErrorResponse {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Internal server error".to_string(),
                    details: None,
                })
            }
        }
    }
}
