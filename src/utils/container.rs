//! Trailer layout for sealed artifacts.
//!
//! The seal is appended after the document bytes and never rewrites them:
//!
//! ```text
//! <document bytes>\n%%DOCSEAL-BEGIN\n<seal json>\n%%DOCSEAL-END\n
//! ```

pub const SEAL_BEGIN: &[u8] = b"\n%%DOCSEAL-BEGIN\n";
pub const SEAL_END: &[u8] = b"\n%%DOCSEAL-END\n";

/// Borrowed view of an artifact split at its last seal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealedArtifact<'a> {
    pub content: &'a [u8],
    pub trailer: Option<&'a [u8]>,
}

impl<'a> SealedArtifact<'a> {
    pub fn split(bytes: &'a [u8]) -> Self {
        match rfind(bytes, SEAL_BEGIN) {
            Some(pos) => {
                let rest = &bytes[pos + SEAL_BEGIN.len()..];
                let trailer = rest.strip_suffix(SEAL_END).unwrap_or(rest);
                Self {
                    content: &bytes[..pos],
                    trailer: Some(trailer),
                }
            }
            None => Self {
                content: bytes,
                trailer: None,
            },
        }
    }
}

pub fn append_seal(content: &[u8], trailer: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + SEAL_BEGIN.len() + trailer.len() + SEAL_END.len());
    out.extend_from_slice(content);
    out.extend_from_slice(SEAL_BEGIN);
    out.extend_from_slice(trailer);
    out.extend_from_slice(SEAL_END);
    out
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_recovers_content_and_trailer() {
        let artifact = append_seal(b"hello", br#"{"a":1}"#);
        let parts = SealedArtifact::split(&artifact);
        assert_eq!(parts.content, b"hello");
        assert_eq!(parts.trailer, Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn test_split_without_marker() {
        let parts = SealedArtifact::split(b"plain document");
        assert_eq!(parts.content, b"plain document");
        assert!(parts.trailer.is_none());
    }

    #[test]
    fn test_last_marker_wins() {
        let inner = append_seal(b"doc", b"first");
        let outer = append_seal(&inner, b"second");
        let parts = SealedArtifact::split(&outer);
        assert_eq!(parts.content, inner.as_slice());
        assert_eq!(parts.trailer, Some(&b"second"[..]));
    }

    #[test]
    fn test_truncated_trailer_keeps_remaining_bytes() {
        let mut artifact = append_seal(b"doc", b"{\"x\":true}");
        artifact.truncate(artifact.len() - SEAL_END.len() + 2);
        let parts = SealedArtifact::split(&artifact);
        assert_eq!(parts.content, b"doc");
        assert!(parts.trailer.unwrap().starts_with(b"{\"x\":true}"));
    }
}
