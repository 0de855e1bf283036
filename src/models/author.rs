use serde::{Deserialize, Serialize};

/// Author fields carried into every signed artifact.
///
/// The same record is written by the signer and returned by the verifier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct AuthorMetadata {
    pub author: String,
    pub role: String,
    pub email: String,
    pub mobile_phone: String,
}

/// Full author record as kept by the author registry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct AuthorProfile {
    pub full_name: String,
    pub short_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mobile_phone: String,
    pub role: String,
    #[serde(default)]
    pub extra_info: [String; 5],
}

impl AuthorProfile {
    pub fn new(
        full_name: impl Into<String>,
        short_name: impl Into<String>,
        email: impl Into<String>,
        mobile_phone: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            short_name: short_name.into(),
            email: email.into(),
            phone: String::new(),
            mobile_phone: mobile_phone.into(),
            role: role.into(),
            extra_info: Default::default(),
        }
    }

    /// Projection onto the fields that get signed into a document.
    pub fn metadata(&self) -> AuthorMetadata {
        AuthorMetadata {
            author: self.full_name.clone(),
            role: self.role.clone(),
            email: self.email.clone(),
            mobile_phone: self.mobile_phone.clone(),
        }
    }
}
