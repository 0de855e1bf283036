pub mod author;
pub mod error;
pub mod key;
pub mod seal;
pub mod verification;

pub use author::{AuthorMetadata, AuthorProfile};
pub use error::{ApiError, ErrorResponse, SealError};
pub use key::KeyPair;
pub use seal::{SealMetadata, SignedDocument, SIGNATURE_ALGORITHM};
pub use verification::{VerificationFailure, VerificationResult};
