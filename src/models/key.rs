use serde::{Deserialize, Serialize};

/// PEM-encoded RSA keypair. The private half is only ever held in its
/// passphrase-encrypted PKCS#8 form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key_pem: String,
    pub encrypted_private_key_pem: String,
}
