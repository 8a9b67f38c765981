//! Key digests.
//!
//! The store never looks at a key directly; it only ever sees the digest of
//! the key's bytes. Anything that maps bytes to a stable 128-bit value can be
//! plugged in here.

use md5::{Digest, Md5};

/// Length of a rendered digest: 128 bits as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 32;

/// Maps arbitrary bytes to a fixed-length lowercase hex string.
///
/// Implementations must be deterministic and must always return exactly
/// [`DIGEST_HEX_LEN`] characters from `[0-9a-f]`. There is no error path.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn DigestFunction>`.
pub trait DigestFunction: Send + Sync {
    fn hex_digest(&self, input: &[u8]) -> String;
}

impl<T: DigestFunction + ?Sized> DigestFunction for Box<T> {
    fn hex_digest(&self, input: &[u8]) -> String {
        self.as_ref().hex_digest(input)
    }
}

/// MD5, the digest used for record file names by default.
///
/// Kept for compatibility with existing store directories; it is used as a
/// naming function only, not for integrity or security.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Md5Digest;

impl DigestFunction for Md5Digest {
    fn hex_digest(&self, input: &[u8]) -> String {
        let mut hasher = Md5::new();
        hasher.update(input);
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_vectors() {
        let d = Md5Digest;
        assert_eq!(d.hex_digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(d.hex_digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(d.hex_digest(b"hello"), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn digest_is_deterministic() {
        let d = Md5Digest;
        assert_eq!(d.hex_digest(b"some/key?x"), d.hex_digest(b"some/key?x"));
        assert_ne!(d.hex_digest(b"a"), d.hex_digest(b"b"));
    }

    #[test]
    fn digest_shape() {
        let d = Md5Digest;
        for input in [&b""[..], b"k", b"\x00\xff\xfe", "ключ".as_bytes()] {
            let hex = d.hex_digest(input);
            assert_eq!(hex.len(), DIGEST_HEX_LEN);
            assert!(hex.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }

    #[test]
    fn boxed_digest_delegates() {
        let d: Box<dyn DigestFunction> = Box::new(Md5Digest);
        assert_eq!(d.hex_digest(b"abc"), Md5Digest.hex_digest(b"abc"));
    }
}
