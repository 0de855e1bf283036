use serde::{Deserialize, Serialize};

use super::{AuthorMetadata, SealError};
use crate::utils::container;

/// Fixed identifier written into every seal.
pub const SIGNATURE_ALGORITHM: &str = "SHA-256";

/// Format of the `CreationDate` field, always rendered in UTC.
pub const CREATION_DATE_FORMAT: &str = "D:%Y%m%d%H%M%SZ";

/// Metadata record embedded in the artifact trailer.
///
/// Field names follow the embedded wire names (`Signature`, `Fingerprint`,
/// `Author`, `Role`, `Email`, `MobilePhone`, `SignatureAlgorithm`,
/// `CreationDate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SealMetadata {
    pub signature: String,
    pub fingerprint: String,
    pub author: String,
    pub role: String,
    pub email: String,
    pub mobile_phone: String,
    pub signature_algorithm: String,
    pub creation_date: String,
}

impl SealMetadata {
    pub fn new(
        signature: String,
        fingerprint: String,
        author: &AuthorMetadata,
        creation_date: String,
    ) -> Self {
        Self {
            signature,
            fingerprint,
            author: author.author.clone(),
            role: author.role.clone(),
            email: author.email.clone(),
            mobile_phone: author.mobile_phone.clone(),
            signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            creation_date,
        }
    }

    pub fn author_metadata(&self) -> AuthorMetadata {
        AuthorMetadata {
            author: self.author.clone(),
            role: self.role.clone(),
            email: self.email.clone(),
            mobile_phone: self.mobile_phone.clone(),
        }
    }
}

/// A signed artifact: the original document bytes followed by the seal
/// trailer. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct SignedDocument {
    artifact: Vec<u8>,
    content_len: usize,
    seal: SealMetadata,
}

impl SignedDocument {
    pub fn assemble(content: &[u8], seal: SealMetadata) -> Result<Self, SealError> {
        let trailer = serde_json::to_vec(&seal)
            .map_err(|e| SealError::SigningError(format!("Failed to encode seal: {}", e)))?;
        Ok(Self {
            artifact: container::append_seal(content, &trailer),
            content_len: content.len(),
            seal,
        })
    }

    /// The document bytes the fingerprint was computed over.
    pub fn content(&self) -> &[u8] {
        &self.artifact[..self.content_len]
    }

    pub fn fingerprint(&self) -> &str {
        &self.seal.fingerprint
    }

    pub fn signature(&self) -> &str {
        &self.seal.signature
    }

    pub fn algorithm(&self) -> &str {
        &self.seal.signature_algorithm
    }

    pub fn creation_date(&self) -> &str {
        &self.seal.creation_date
    }

    pub fn author(&self) -> AuthorMetadata {
        self.seal.author_metadata()
    }

    pub fn seal(&self) -> &SealMetadata {
        &self.seal
    }

    /// Full artifact bytes, ready to publish.
    pub fn as_bytes(&self) -> &[u8] {
        &self.artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_seal() -> SealMetadata {
        let author = AuthorMetadata {
            author: "Jane Roe".to_string(),
            role: "Notary".to_string(),
            email: "jane@example.org".to_string(),
            mobile_phone: "+1 555 0100".to_string(),
        };
        SealMetadata::new("ab".repeat(256), "cd".repeat(32), &author, "D:20260101120000Z".to_string())
    }

    #[test]
    fn test_seal_uses_embedded_field_names() {
        let value = serde_json::to_value(sample_seal()).unwrap();
        for field in [
            "Signature",
            "Fingerprint",
            "Author",
            "Role",
            "Email",
            "MobilePhone",
            "SignatureAlgorithm",
            "CreationDate",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["SignatureAlgorithm"], "SHA-256");
    }

    #[test]
    fn test_assemble_keeps_content_prefix_intact() {
        let content = b"%PDF-1.7\nbody\n%%EOF\n".to_vec();
        let doc = SignedDocument::assemble(&content, sample_seal()).unwrap();

        assert_eq!(doc.content(), content.as_slice());
        assert!(doc.as_bytes().starts_with(&content));
        assert!(doc.as_bytes().len() > content.len());
        assert_eq!(doc.author().author, "Jane Roe");
    }
}
