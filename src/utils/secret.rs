use std::fmt;
use zeroize::Zeroizing;

/// 256-bit key derived from a password. Wiped when dropped.
pub type DerivedKey = Zeroizing<[u8; 32]>;

/// Passphrase or password held for the length of one call.
pub type SecretString = Zeroizing<String>;

/// Heap buffer holding decrypted secret material (signature images,
/// plaintext key bytes). The contents are zeroed on drop on every exit path.
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}
