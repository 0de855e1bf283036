use openssl::sha::sha256;

/// SHA-256 over the exact document bytes, as 64 lowercase hex characters.
///
/// Must be computed on the rendered bytes before any seal is appended.
pub fn fingerprint(document: &[u8]) -> String {
    hex::encode(sha256(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_fingerprint(value: &str) -> bool {
        value.len() == 64 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_shape_and_sensitivity() {
        let a = fingerprint(b"Invoice #1001\nTotal: 10.00\n");
        let b = fingerprint(b"Invoice #1001\nTotal: 10.01\n");
        assert!(is_fingerprint(&a));
        assert!(is_fingerprint(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_no_text_normalization() {
        assert_ne!(fingerprint(b"line\n"), fingerprint(b"line\r\n"));
        assert_ne!(fingerprint(b"doc"), fingerprint(b"doc "));
    }

    #[test]
    fn test_is_fingerprint_rejects_bad_values() {
        assert!(!is_fingerprint("ABC"));
        assert!(!is_fingerprint(&"A".repeat(64)));
        assert!(!is_fingerprint(&"g".repeat(64)));
        assert!(is_fingerprint(&"0".repeat(64)));
    }
}
